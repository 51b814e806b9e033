//! JSON Formatter
//!
//! Serializes the full scan/run structures for other tools.

use super::{Formatter, RunReport};
use crate::scanner::ScanReport;
use anyhow::{Context, Result};
use serde_json::json;
use std::path::Path;

/// Pretty-printed JSON output.
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter for JsonFormatter {
    fn format_scan(&self, root: &Path, scan: &ScanReport) -> Result<String> {
        let value = json!({
            "root": root,
            "scan": scan,
        });
        serde_json::to_string_pretty(&value).context("Cannot serialize scan report")
    }

    fn format_run(&self, run: &RunReport) -> Result<String> {
        serde_json::to_string_pretty(run).context("Cannot serialize run report")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::{PairDiff, PairOutcome};
    use crate::scanner::StoreFile;
    use crate::store::StoreIdentity;
    use serde_json::Value;
    use std::path::PathBuf;

    fn copy(position: &str) -> StoreFile {
        StoreFile {
            path: PathBuf::from(format!("/data/{}-repositories/calls.sqlite", position)),
            source_path: PathBuf::from(format!("/data/{}-repositories/blob", position)),
            position: Some(position.to_string()),
        }
    }

    #[test]
    fn test_run_report_shape() -> Result<()> {
        let identity = StoreIdentity::new("calls").unwrap();
        let mut scan = ScanReport::default();
        scan.grouping.push(identity.clone(), copy("A"));
        scan.grouping.push(identity.clone(), copy("B"));

        let run = RunReport {
            root: PathBuf::from("/data"),
            scan,
            pairs: vec![PairDiff {
                identity,
                left: copy("A"),
                right: copy("B"),
                outcome: PairOutcome::Failed {
                    error: "boom".to_string(),
                },
            }],
        };

        let output = JsonFormatter::new().format_run(&run)?;
        let value: Value = serde_json::from_str(&output)?;

        assert_eq!(value["scan"]["grouping"]["calls"][1]["position"], "B");
        assert_eq!(value["pairs"][0]["outcome"]["status"], "failed");
        assert_eq!(value["pairs"][0]["outcome"]["error"], "boom");
        Ok(())
    }

    #[test]
    fn test_scan_report_keeps_unresolved_apart() -> Result<()> {
        let mut scan = ScanReport::default();
        scan.unresolved.push(crate::scanner::UnresolvedFile {
            path: PathBuf::from("/data/blob"),
            position: None,
        });

        let output = JsonFormatter::new().format_scan(Path::new("/data"), &scan)?;
        let value: Value = serde_json::from_str(&output)?;
        assert_eq!(value["scan"]["grouping"], serde_json::json!({}));
        assert_eq!(value["scan"]["unresolved"][0]["path"], "/data/blob");
        Ok(())
    }
}
