//! Text Formatter
//!
//! Colored terminal report: groups first, then one block per pair.

use super::{Formatter, RunReport};
use crate::diff::{DiffRecord, PairDiff, PairOutcome, SkipReason};
use crate::scanner::ScanReport;
use anyhow::Result;
use colored::Colorize;
use std::fmt::Write;
use std::path::Path;

/// Human-readable report.
pub struct TextFormatter {
    show_payloads: bool,
}

impl TextFormatter {
    pub fn new() -> Self {
        Self {
            show_payloads: true,
        }
    }

    pub fn show_payloads(mut self, show: bool) -> Self {
        self.show_payloads = show;
        self
    }

    fn write_scan(&self, out: &mut String, root: &Path, scan: &ScanReport) -> std::fmt::Result {
        writeln!(
            out,
            "{} {} files under {}",
            "Scanned".cyan(),
            scan.files_scanned,
            root.display()
        )?;
        writeln!(
            out,
            "  {} identities, {} copies, {} unresolved, {} issues",
            scan.grouping.len().to_string().green().bold(),
            scan.grouping.copy_count(),
            scan.unresolved.len(),
            scan.issues.len()
        )?;

        for (identity, copies) in scan.grouping.iter() {
            writeln!(out)?;
            writeln!(
                out,
                "{} {}",
                identity.as_str().white().bold(),
                format!("({} copies)", copies.len()).dimmed()
            )?;
            for copy in copies {
                writeln!(
                    out,
                    "  {:<16} {}",
                    copy.position_name().cyan(),
                    copy.source_path.display().to_string().dimmed()
                )?;
            }
        }

        if !scan.unresolved.is_empty() {
            writeln!(out)?;
            writeln!(out, "{}", "Unresolved stores (no usable identity):".yellow())?;
            for file in &scan.unresolved {
                writeln!(out, "  {}", file.path.display())?;
            }
        }

        if !scan.issues.is_empty() {
            writeln!(out)?;
            writeln!(out, "{}", "Skipped entries:".yellow())?;
            for issue in &scan.issues {
                writeln!(out, "  {}: {}", issue.path.display(), issue.message)?;
            }
        }
        Ok(())
    }

    fn write_pair(&self, out: &mut String, pair: &PairDiff) -> std::fmt::Result {
        let title = format!(
            "{}: {} vs {}",
            pair.identity,
            pair.left.position_name(),
            pair.right.position_name()
        );

        match &pair.outcome {
            PairOutcome::Compared { records } if records.is_empty() => {
                writeln!(out, "{} {}", title.bold(), "no drift".green())
            }
            PairOutcome::Compared { records } => {
                writeln!(
                    out,
                    "{} {}",
                    title.bold(),
                    format!("{} mismatched rows", records.len()).yellow()
                )?;
                for record in records {
                    self.write_record(out, pair, record)?;
                }
                Ok(())
            }
            PairOutcome::Failed { error } => {
                writeln!(out, "{} {}", title.bold(), format!("failed: {}", error).red())
            }
            PairOutcome::Skipped {
                reason: SkipReason::SamePosition,
            } => writeln!(out, "{} {}", title.bold(), "skipped (same position)".dimmed()),
            PairOutcome::Cancelled => writeln!(out, "{} {}", title.bold(), "cancelled".dimmed()),
        }
    }

    fn write_record(
        &self,
        out: &mut String,
        pair: &PairDiff,
        record: &DiffRecord,
    ) -> std::fmt::Result {
        writeln!(out, "  objectId {}", record.object_id.cyan())?;
        writeln!(out, "    hash              {} | {}", record.hash_left, record.hash_right)?;

        let l = &record.metrics_left;
        let r = &record.metrics_right;
        for (name, left, right) in [
            ("participants", l.participants, r.participants),
            ("locations", l.locations, r.locations),
            ("signalingEvents", l.signaling_events, r.signaling_events),
            ("callEvents", l.call_events, r.call_events),
        ] {
            let line = format!("    {:<17} {} | {}", name, count(left), count(right));
            if left != right {
                writeln!(out, "{}", line.yellow())?;
            } else {
                writeln!(out, "{}", line)?;
            }
        }

        if self.show_payloads {
            writeln!(out, "    --- {}", pair.left.position_name())?;
            writeln!(out, "{}", indent(&record.data_left, 4))?;
            writeln!(out, "    --- {}", pair.right.position_name())?;
            writeln!(out, "{}", indent(&record.data_right, 4))?;
        }
        Ok(())
    }
}

impl Default for TextFormatter {
    fn default() -> Self {
        Self::new()
    }
}

fn count(value: Option<usize>) -> String {
    value.map_or_else(|| "-".to_string(), |n| n.to_string())
}

fn indent(text: &str, width: usize) -> String {
    let pad = " ".repeat(width);
    text.lines()
        .map(|line| format!("{}{}", pad, line))
        .collect::<Vec<_>>()
        .join("\n")
}

impl Formatter for TextFormatter {
    fn format_scan(&self, root: &Path, scan: &ScanReport) -> Result<String> {
        let mut out = String::new();
        self.write_scan(&mut out, root, scan)?;
        Ok(out)
    }

    fn format_run(&self, run: &RunReport) -> Result<String> {
        let mut out = String::new();
        self.write_scan(&mut out, &run.root, &run.scan)?;
        writeln!(out)?;

        let mut drifted = 0;
        let mut failed = 0;
        let mut skipped = 0;
        let mut cancelled = 0;
        for pair in &run.pairs {
            match &pair.outcome {
                PairOutcome::Compared { records } if !records.is_empty() => drifted += 1,
                PairOutcome::Compared { .. } => {}
                PairOutcome::Failed { .. } => failed += 1,
                PairOutcome::Skipped { .. } => skipped += 1,
                PairOutcome::Cancelled => cancelled += 1,
            }
            self.write_pair(&mut out, pair)?;
        }

        writeln!(out)?;
        writeln!(
            out,
            "{} {} pairs: {} with drift, {} failed, {} skipped, {} cancelled",
            "Summary".bold(),
            run.pairs.len(),
            drifted,
            failed,
            skipped,
            cancelled
        )?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::PayloadMetrics;
    use crate::scanner::StoreFile;
    use crate::store::StoreIdentity;
    use std::path::PathBuf;

    fn copy(position: &str) -> StoreFile {
        StoreFile {
            path: PathBuf::from(format!("/data/{}/calls.sqlite", position)),
            source_path: PathBuf::from(format!("/data/{}/blob", position)),
            position: Some(position.to_string()),
        }
    }

    fn record() -> DiffRecord {
        DiffRecord {
            object_id: "01".to_string(),
            hash_left: "AA".to_string(),
            hash_right: "BB".to_string(),
            metrics_left: PayloadMetrics {
                participants: Some(2),
                ..PayloadMetrics::default()
            },
            metrics_right: PayloadMetrics {
                participants: Some(3),
                ..PayloadMetrics::default()
            },
            data_left: "{\n  \"participants\": [1, 2]\n}".to_string(),
            data_right: "{\n  \"participants\": [1, 2, 3]\n}".to_string(),
        }
    }

    fn run(outcome: PairOutcome) -> RunReport {
        let identity = StoreIdentity::new("calls").unwrap();
        let mut scan = ScanReport::default();
        scan.grouping.push(identity.clone(), copy("A"));
        scan.grouping.push(identity.clone(), copy("B"));
        RunReport {
            root: PathBuf::from("/data"),
            scan,
            pairs: vec![PairDiff {
                identity,
                left: copy("A"),
                right: copy("B"),
                outcome,
            }],
        }
    }

    #[test]
    fn test_run_lists_records_and_summary() -> Result<()> {
        let output = TextFormatter::new().format_run(&run(PairOutcome::Compared {
            records: vec![record()],
        }))?;

        assert!(output.contains("calls: A vs B"));
        assert!(output.contains("1 mismatched rows"));
        assert!(output.contains("participants"));
        assert!(output.contains("2 | 3"));
        assert!(output.contains("\"participants\": [1, 2, 3]"));
        assert!(output.contains("1 with drift"));
        Ok(())
    }

    #[test]
    fn test_payloads_can_be_hidden() -> Result<()> {
        let output = TextFormatter::new()
            .show_payloads(false)
            .format_run(&run(PairOutcome::Compared {
                records: vec![record()],
            }))?;
        assert!(output.contains("2 | 3"));
        assert!(!output.contains("[1, 2, 3]"));
        Ok(())
    }

    #[test]
    fn test_failures_are_reported() -> Result<()> {
        let output = TextFormatter::new().format_run(&run(PairOutcome::Failed {
            error: "no such table: snapshots".to_string(),
        }))?;
        assert!(output.contains("failed: no such table: snapshots"));
        assert!(output.contains("1 failed"));
        Ok(())
    }

    #[test]
    fn test_indent() {
        assert_eq!(indent("a\nb", 2), "  a\n  b");
        assert_eq!(count(None), "-");
        assert_eq!(count(Some(4)), "4");
    }
}
