//! Diff module - Compare copies of the same store across positions.
//!
//! For every identity group, all unordered pairs `(i, j)` with `i < j` are
//! enumerated. Each pair that spans two different positions gets its own
//! short-lived connection with both stores attached read-only, and the
//! `snapshots` rows sharing an `objectId` but differing in `data` become
//! [`DiffRecord`]s. A failing pair is recorded and the run moves on.

pub mod alias;
pub mod query;
pub mod record;
pub mod source;

pub use record::{DiffRecord, PayloadMetrics};
pub use source::StoreSource;

use crate::scanner::{Grouping, StoreFile};
use crate::store::StoreIdentity;
use crate::utils::CancellationToken;
use query::{compare_stores, AttachedStore};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Default number of pairs compared at once (each holds two store handles).
pub const DEFAULT_MAX_PARALLEL_PAIRS: usize = 4;

/// Default SQLite busy timeout.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Errors of a single pair comparison.
#[derive(Debug, Error)]
pub enum DiffError {
    #[error("Cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Not a wrapped store: {}", path.display())]
    NotWrapped { path: PathBuf },

    #[error("Store database not found: {}", path.display())]
    MissingStore { path: PathBuf },

    #[error("Cannot attach {}: {source}", path.display())]
    Attach {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Snapshot query failed: {source}")]
    Query {
        #[source]
        source: rusqlite::Error,
    },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Cannot start diff workers: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// Why a pair was enumerated but not compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Both copies carry the same position label
    SamePosition,
}

/// Result of comparing one pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PairOutcome {
    /// Mismatched shared rows (empty if the stores agree)
    Compared { records: Vec<DiffRecord> },
    /// Opening or querying a store failed
    Failed { error: String },
    Skipped { reason: SkipReason },
    /// The run was cancelled before this pair started
    Cancelled,
}

/// One enumerated pair of copies and its outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairDiff {
    pub identity: StoreIdentity,
    pub left: StoreFile,
    pub right: StoreFile,
    pub outcome: PairOutcome,
}

impl PairDiff {
    /// Mismatched records, empty unless the pair was compared.
    pub fn records(&self) -> &[DiffRecord] {
        match &self.outcome {
            PairOutcome::Compared { records } => records,
            _ => &[],
        }
    }
}

/// All unordered index pairs `(i, j)`, `i < j`, over `n` items.
pub fn unordered_pairs(n: usize) -> impl Iterator<Item = (usize, usize)> {
    (0..n).flat_map(move |i| (i + 1..n).map(move |j| (i, j)))
}

/// Number of pairs a grouping enumerates.
pub fn pair_count(grouping: &Grouping) -> usize {
    grouping
        .iter()
        .map(|(_, copies)| copies.len() * copies.len().saturating_sub(1) / 2)
        .sum()
}

/// Pairwise snapshot comparison.
#[derive(Debug, Clone)]
pub struct DiffEngine {
    max_parallel_pairs: usize,
    busy_timeout: Duration,
    unwrap_embedded: bool,
    cancel: CancellationToken,
}

impl Default for DiffEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DiffEngine {
    pub fn new() -> Self {
        Self {
            max_parallel_pairs: DEFAULT_MAX_PARALLEL_PAIRS,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            unwrap_embedded: true,
            cancel: CancellationToken::new(),
        }
    }

    pub fn max_parallel_pairs(mut self, max: usize) -> Self {
        self.max_parallel_pairs = max.max(1);
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    /// Whether to cut the embedded database out of the wrapped file when no
    /// plain database exists at the derived path.
    pub fn unwrap_embedded(mut self, unwrap: bool) -> Self {
        self.unwrap_embedded = unwrap;
        self
    }

    pub fn cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Compare every pair of one group, sequentially, in enumeration order.
    pub fn diff_group(&self, identity: &StoreIdentity, copies: &[StoreFile]) -> Vec<PairDiff> {
        unordered_pairs(copies.len())
            .map(|(i, j)| self.diff_pair(identity, &copies[i], &copies[j]))
            .collect()
    }

    /// Compare every pair of every group on a bounded worker pool.
    ///
    /// Results keep enumeration order (groups in discovery order, then
    /// `(i, j)` lexicographically). `on_pair` runs as each pair finishes.
    pub fn diff_all<P>(&self, grouping: &Grouping, on_pair: P) -> Result<Vec<PairDiff>, DiffError>
    where
        P: Fn(&PairDiff) + Sync,
    {
        let tasks: Vec<(&StoreIdentity, &StoreFile, &StoreFile)> = grouping
            .iter()
            .flat_map(|(identity, copies)| {
                unordered_pairs(copies.len()).map(move |(i, j)| (identity, &copies[i], &copies[j]))
            })
            .collect();

        info!(
            "Comparing {} pairs across {} identities ({} at a time)",
            tasks.len(),
            grouping.len(),
            self.max_parallel_pairs
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.max_parallel_pairs)
            .thread_name(|i| format!("snapdrift-diff-{}", i))
            .build()?;

        let results = pool.install(|| {
            tasks
                .par_iter()
                .map(|(identity, left, right)| {
                    let diff = self.diff_pair(identity, left, right);
                    on_pair(&diff);
                    diff
                })
                .collect()
        });
        Ok(results)
    }

    /// Compare two copies of the same store.
    pub fn diff_pair(
        &self,
        identity: &StoreIdentity,
        left: &StoreFile,
        right: &StoreFile,
    ) -> PairDiff {
        let outcome = if self.cancel.is_cancelled() {
            PairOutcome::Cancelled
        } else if left.position == right.position {
            debug!(
                "Skipping '{}' pair at the same position {}",
                identity,
                left.position_name()
            );
            PairOutcome::Skipped {
                reason: SkipReason::SamePosition,
            }
        } else {
            match self.compare(identity, left, right) {
                Ok(records) => {
                    debug!(
                        "'{}' {} vs {}: {} mismatched rows",
                        identity,
                        left.position_name(),
                        right.position_name(),
                        records.len()
                    );
                    PairOutcome::Compared { records }
                }
                Err(err) => {
                    warn!(
                        "'{}' {} vs {} failed: {}",
                        identity,
                        left.position_name(),
                        right.position_name(),
                        err
                    );
                    PairOutcome::Failed {
                        error: err.to_string(),
                    }
                }
            }
        };

        PairDiff {
            identity: identity.clone(),
            left: left.clone(),
            right: right.clone(),
            outcome,
        }
    }

    fn compare(
        &self,
        identity: &StoreIdentity,
        left: &StoreFile,
        right: &StoreFile,
    ) -> Result<Vec<DiffRecord>, DiffError> {
        let (left_alias, right_alias) = alias::pair_aliases(
            identity.as_str(),
            left.position.as_deref(),
            right.position.as_deref(),
        );
        // Sources (and any scratch copies) drop when this returns
        let left_source = StoreSource::locate(left, self.unwrap_embedded)?;
        let right_source = StoreSource::locate(right, self.unwrap_embedded)?;

        compare_stores(
            AttachedStore {
                alias: &left_alias,
                path: left_source.path(),
            },
            AttachedStore {
                alias: &right_alias,
                path: right_source.path(),
            },
            self.busy_timeout,
        )
    }
}
