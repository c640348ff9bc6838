use thiserror::Error;

/// Errors surfaced by the library.
///
/// Extraction itself never fails; only user-supplied names can be rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("unknown extraction group `{0}`")]
    UnknownGroup(String),
}
