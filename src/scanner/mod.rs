//! Scanner module - Walk a directory tree and group wrapped stores by identity.
//!
//! Each directory level carries a position label inherited from its parent.
//! An entry whose name matches the position marker replaces the label for
//! the entries that come after it in the same directory (and for their
//! subtrees). Earlier siblings keep the label they were visited with.
//!
//! Sibling subdirectories are scanned in parallel with rayon. Partial
//! results are merged in entry order, so the grouping is the same as a
//! sequential walk.

pub mod fs;
pub mod grouping;
pub mod position;

pub use fs::{DirEntry, FileSystem, OsFileSystem};
pub use grouping::{Grouping, StoreFile};
pub use position::PositionMarker;

use crate::store::{extract_identity, is_store_file};
use crate::utils::CancellationToken;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Default extension of the store path derived from an identity.
pub const DEFAULT_STORE_EXTENSION: &str = "sqlite";

/// Fatal scan errors. Everything else is recorded in the report.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Cannot read root directory {}: {source}", path.display())]
    Root {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Scan cancelled")]
    Cancelled,
}

/// Order in which the entries of one directory are visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryOrder {
    /// Sort entries by name (deterministic across platforms)
    #[default]
    Sorted,
    /// Keep the order the filesystem yields
    Filesystem,
}

/// Kind of non-fatal problem met during a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    UnreadableDirectory,
    UnreadableFile,
}

/// A skipped file or directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanIssue {
    pub path: PathBuf,
    pub kind: IssueKind,
    pub message: String,
}

/// A wrapped store whose header did not yield a usable identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnresolvedFile {
    pub path: PathBuf,
    pub position: Option<String>,
}

/// Result of a scan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanReport {
    /// Resolved copies grouped by identity
    pub grouping: Grouping,
    /// Wrapped stores with no usable identity, kept apart from the grouping
    pub unresolved: Vec<UnresolvedFile>,
    /// Skipped entries
    pub issues: Vec<ScanIssue>,
    /// Number of files read
    pub files_scanned: usize,
}

impl ScanReport {
    fn merge(&mut self, other: ScanReport) {
        self.grouping.merge(other.grouping);
        self.unresolved.extend(other.unresolved);
        self.issues.extend(other.issues);
        self.files_scanned += other.files_scanned;
    }
}

/// Directory walker producing a [`ScanReport`].
pub struct Scanner<F: FileSystem = OsFileSystem> {
    fs: F,
    marker: PositionMarker,
    entry_order: EntryOrder,
    store_extension: String,
    parallel: bool,
    cancel: CancellationToken,
}

impl Scanner<OsFileSystem> {
    /// Scanner over the real filesystem with default settings.
    pub fn new() -> Self {
        Self::with_fs(OsFileSystem)
    }
}

impl Default for Scanner<OsFileSystem> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: FileSystem> Scanner<F> {
    pub fn with_fs(fs: F) -> Self {
        Self {
            fs,
            marker: PositionMarker::default(),
            entry_order: EntryOrder::default(),
            store_extension: DEFAULT_STORE_EXTENSION.to_string(),
            parallel: true,
            cancel: CancellationToken::new(),
        }
    }

    pub fn marker(mut self, marker: PositionMarker) -> Self {
        self.marker = marker;
        self
    }

    pub fn entry_order(mut self, order: EntryOrder) -> Self {
        self.entry_order = order;
        self
    }

    pub fn store_extension(mut self, extension: impl Into<String>) -> Self {
        self.store_extension = extension.into();
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Walk `root` and group every wrapped store by identity.
    ///
    /// Fails only if the root itself cannot be listed or the scan is
    /// cancelled; a cancelled scan never returns a partial grouping.
    pub fn scan(&self, root: &Path) -> Result<ScanReport, ScanError> {
        info!("Scanning {}", root.display());

        let entries = self.fs.list_dir(root).map_err(|source| ScanError::Root {
            path: root.to_path_buf(),
            source,
        })?;
        let report = self.scan_entries(entries, None)?;

        info!(
            "Scanned {} files: {} identities, {} copies, {} unresolved, {} issues",
            report.files_scanned,
            report.grouping.len(),
            report.grouping.copy_count(),
            report.unresolved.len(),
            report.issues.len()
        );
        Ok(report)
    }

    fn scan_dir(&self, dir: &Path, inherited: Option<&str>) -> Result<ScanReport, ScanError> {
        match self.fs.list_dir(dir) {
            Ok(entries) => self.scan_entries(entries, inherited),
            Err(err) => {
                warn!("Skipping unreadable directory {}: {}", dir.display(), err);
                Ok(ScanReport {
                    issues: vec![ScanIssue {
                        path: dir.to_path_buf(),
                        kind: IssueKind::UnreadableDirectory,
                        message: err.to_string(),
                    }],
                    ..ScanReport::default()
                })
            }
        }
    }

    fn scan_entries(
        &self,
        mut entries: Vec<DirEntry>,
        inherited: Option<&str>,
    ) -> Result<ScanReport, ScanError> {
        if self.cancel.is_cancelled() {
            return Err(ScanError::Cancelled);
        }

        if self.entry_order == EntryOrder::Sorted {
            entries.sort_by(|a, b| a.name.cmp(&b.name));
        }

        // Labels depend on sibling order, so assign them before fanning out
        let mut label = inherited.map(str::to_string);
        let labeled: Vec<(DirEntry, Option<String>)> = entries
            .into_iter()
            .map(|entry| {
                if let Some(marked) = self.marker.label_for(&entry.name) {
                    debug!("Position '{}' from {}", marked, entry.path.display());
                    label = Some(marked);
                }
                (entry, label.clone())
            })
            .collect();

        let parts: Vec<ScanReport> = if self.parallel {
            labeled
                .par_iter()
                .map(|(entry, label)| self.visit(entry, label.as_deref()))
                .collect::<Result<Vec<_>, ScanError>>()?
        } else {
            labeled
                .iter()
                .map(|(entry, label)| self.visit(entry, label.as_deref()))
                .collect::<Result<Vec<_>, ScanError>>()?
        };

        let mut report = ScanReport::default();
        for part in parts {
            report.merge(part);
        }
        Ok(report)
    }

    fn visit(&self, entry: &DirEntry, label: Option<&str>) -> Result<ScanReport, ScanError> {
        if entry.is_dir {
            self.scan_dir(&entry.path, label)
        } else if entry.is_dir_link {
            debug!("Not following directory link {}", entry.path.display());
            Ok(ScanReport::default())
        } else {
            Ok(self.scan_file(entry, label))
        }
    }

    fn scan_file(&self, entry: &DirEntry, label: Option<&str>) -> ScanReport {
        let mut report = ScanReport {
            files_scanned: 1,
            ..ScanReport::default()
        };

        let buffer = match self.fs.read_file(&entry.path) {
            Ok(buffer) => buffer,
            Err(err) => {
                warn!("Skipping unreadable file {}: {}", entry.path.display(), err);
                report.issues.push(ScanIssue {
                    path: entry.path.clone(),
                    kind: IssueKind::UnreadableFile,
                    message: err.to_string(),
                });
                return report;
            }
        };

        if !is_store_file(&buffer) {
            return report;
        }

        let position = label.map(str::to_string);
        match extract_identity(&buffer) {
            Some(identity) => {
                debug!(
                    "Found store '{}' at {} (position: {:?})",
                    identity,
                    entry.path.display(),
                    position
                );
                let path = entry
                    .path
                    .with_file_name(format!("{}.{}", identity, self.store_extension));
                report.grouping.push(
                    identity,
                    StoreFile {
                        path,
                        source_path: entry.path.clone(),
                        position,
                    },
                );
            }
            None => {
                warn!(
                    "Wrapped store without a usable identity: {}",
                    entry.path.display()
                );
                report.unresolved.push(UnresolvedFile {
                    path: entry.path.clone(),
                    position,
                });
            }
        }
        report
    }
}
