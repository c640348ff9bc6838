//! # Arnold Log Parser
//!
//! Statistics extraction for Arnold renderer log files.
//!
//! ## Overview
//!
//! Arnold writes a long, loosely structured log for every rendered frame:
//! start-up banners, plugin loading, scene and sampling settings, progress
//! lines and a set of end-of-render reports (timings, memory, ray and shader
//! counts, texture cache). This crate turns that text into typed records.
//!
//! Extraction is best effort and never fails:
//!
//! - **Missing fields** keep a documented default (`NOT_FOUND` text, empty
//!   string or zero)
//! - **Malformed numbers and times** fall back to zero
//! - **Repeated reports** resolve to the last one in the log
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   new()    ┌────────────┐  render_info(), memory_stats(), ...
//! │  log text  │ ─────────► │ LogParser  │ ──────────────────────────────────► typed records
//! └────────────┘            └────────────┘
//!                                 │ summarize()
//!                                 ▼
//!                            LogSummary
//! ```
//!
//! Each extraction group is backed by a precompiled table of
//! `(field, regex)` pairs. A group scan walks the lines once and, for every
//! match, writes the converted capture into the field named by the pattern.
//!
//! ## Examples
//!
//! ```
//! use arnold_log::LogParser;
//!
//! let log = "\
//! 00:00:00   245MB         | rendering frame(s): 42
//! 00:00:01   300MB         | rendering image at 1920 x 1080, 3 AA samples
//! 00:00:09  2048MB         | render done in 0:08.500
//! ";
//! let parser = LogParser::new(log);
//!
//! let info = parser.render_info();
//! assert_eq!(info.frame_number, "42");
//! assert_eq!(info.resolution, "1920x1080");
//! assert_eq!(parser.sample_info().aa, "3");
//! assert_eq!(parser.render_duration().display, "8.50 seconds");
//! ```
//!
//! ### Exporting to JSON
//!
//! Every record implements `serde::Serialize`:
//!
//! ```no_run
//! use arnold_log::LogParser;
//! use std::fs;
//!
//! let log = fs::read_to_string("render.log")?;
//! let summary = LogParser::new(log).summarize();
//! println!("{}", serde_json::to_string_pretty(&summary)?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

/// Summary cache keyed on the raw log text.
pub mod cache;
/// Numeric and time conversions.
pub mod convert;
/// Names of the extraction groups.
pub mod group;
/// Typed statistics records.
pub mod ir;
/// The log parser.
pub mod parser;

mod diagnostics;
mod error;
mod patterns;
mod plugins;


pub use cache::SummaryCache;
pub use convert::{format_time, time_to_seconds};
pub use error::Error;
pub use group::Group;
pub use ir::{
    ColourSpace, Diagnostic, DiagnosticCategory, GeometryStats, LogSummary, MemoryStats,
    NOT_FOUND, PluginInfo, PluginLoadBlock, ProgressInfo, RayStats, RenderDuration, RenderInfo,
    RenderTime, SampleInfo, SceneCreation, SceneInfo, Severity, ShaderStats, TextureStats,
    WorkerInfo,
};
pub use parser::LogParser;

/// Version of the serialized record layout.
///
/// - MAJOR: renamed or removed fields
/// - MINOR: new groups or fields
/// - PATCH: extraction fixes with no layout change
pub const SCHEMA_VERSION: &str = "1.2.0";
