//! Formatters module - Render scan results and pair diffs for output.

pub mod json;
pub mod text;

use crate::config::OutputFormat;
use crate::diff::PairDiff;
use crate::scanner::ScanReport;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use json::JsonFormatter;
pub use text::TextFormatter;

/// Everything a diff run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Root directory that was scanned
    pub root: PathBuf,
    pub scan: ScanReport,
    /// Pair outcomes in enumeration order
    pub pairs: Vec<PairDiff>,
}

/// Trait for all formatters
pub trait Formatter {
    /// Format the result of a scan (groups, unresolved files, issues)
    fn format_scan(&self, root: &std::path::Path, scan: &ScanReport) -> Result<String>;

    /// Format a full diff run
    fn format_run(&self, run: &RunReport) -> Result<String>;
}

/// Formatter for a configured output format.
pub fn formatter_for(format: OutputFormat, show_payloads: bool) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter::new().show_payloads(show_payloads)),
        OutputFormat::Json => Box::new(JsonFormatter::new()),
    }
}
