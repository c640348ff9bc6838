use crate::ir::{Diagnostic, DiagnosticCategory, Severity};
use crate::patterns::MISSING_TEXTURE;

const WARNING_MARKER: &str = "WARNING |";
const ERROR_MARKER: &str = "ERROR |";

/// Keyword checks in priority order. The first keyword found in the
/// lowercased line decides the category.
const CATEGORY_KEYWORDS: &[(&str, DiagnosticCategory)] = &[
    ("texture", DiagnosticCategory::Texture),
    ("geometry", DiagnosticCategory::Geometry),
    ("shader", DiagnosticCategory::Shader),
    ("license", DiagnosticCategory::License),
];

impl DiagnosticCategory {
    pub fn infer(line: &str) -> Self {
        let lowered = line.to_lowercase();
        CATEGORY_KEYWORDS
            .iter()
            .find(|(keyword, _)| lowered.contains(keyword))
            .map_or(DiagnosticCategory::General, |&(_, category)| category)
    }
}

/// Classifies a line as a warning or error. The whole line is kept as the
/// message.
pub(crate) fn classify(line: &str) -> Option<Diagnostic> {
    let severity = if line.contains(WARNING_MARKER) {
        Severity::Warning
    } else if line.contains(ERROR_MARKER) {
        Severity::Error
    } else {
        return None;
    };

    Some(Diagnostic {
        severity,
        message: line.to_string(),
        category: DiagnosticCategory::infer(line),
    })
}

/// Name of the texture in a `texture "..." not found` warning.
pub(crate) fn missing_texture(line: &str) -> Option<&str> {
    if !line.contains("WARNING") {
        return None;
    }
    let lowered = line.to_lowercase();
    if !lowered.contains("texture") || !lowered.contains("not found") {
        return None;
    }
    MISSING_TEXTURE
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_warning() {
        let line = "00:00:02  512MB WARNING | [mtoa] texture not found on disk";
        let diagnostic = classify(line).unwrap();
        assert_eq!(diagnostic.severity, Severity::Warning);
        assert_eq!(diagnostic.category, DiagnosticCategory::Texture);
        assert_eq!(diagnostic.message, line);
    }

    #[test]
    fn test_classify_error() {
        let diagnostic = classify("00:00:02  512MB ERROR | license server unreachable").unwrap();
        assert_eq!(diagnostic.severity, Severity::Error);
        assert_eq!(diagnostic.category, DiagnosticCategory::License);
    }

    #[test]
    fn test_classify_ignores_plain_lines() {
        assert!(classify("00:00:02  512MB         | rendering image").is_none());
        assert!(classify("WARNING without the pipe marker").is_none());
    }

    #[test]
    fn test_category_priority_and_fallback() {
        assert_eq!(
            DiagnosticCategory::infer("Texture on GEOMETRY node"),
            DiagnosticCategory::Texture
        );
        assert_eq!(
            DiagnosticCategory::infer("shader on geometry node"),
            DiagnosticCategory::Geometry
        );
        assert_eq!(
            DiagnosticCategory::infer("[aiStandardSurface] Shader parameter clamped"),
            DiagnosticCategory::Shader
        );
        assert_eq!(
            DiagnosticCategory::infer("node has no outputs"),
            DiagnosticCategory::General
        );
    }

    #[test]
    fn test_missing_texture() {
        assert_eq!(
            missing_texture(r#"WARNING | texture "wood_diff.tx" not found"#),
            Some("wood_diff.tx")
        );
        assert_eq!(
            missing_texture(r#"[WARNING] Texture "bark.exr" was not found"#),
            Some("bark.exr")
        );
        assert_eq!(missing_texture(r#"| texture "wood_diff.tx" not found"#), None);
        assert_eq!(missing_texture(r#"WARNING | texture "wood_diff.tx" loaded"#), None);
    }
}
