//! snapdrift - Find drifting copies of wrapped snapshot stores.
//!
//! A wrapped store is a file whose first 4096 bytes are a custom header
//! followed by an SQLite database. The header's first 100 bytes name the
//! store. Copies of the same store are found under a directory tree,
//! labelled by the `<label>-repositories` directory they sit in, and every
//! pair of copies is compared on its `snapshots` table.

pub mod config;
pub mod diff;
pub mod formatters;
pub mod scanner;
pub mod store;
pub mod utils;

pub use config::Config;
pub use diff::{DiffEngine, DiffError, DiffRecord, PairDiff, PairOutcome};
pub use scanner::{Grouping, ScanError, ScanReport, Scanner, StoreFile};
pub use store::StoreIdentity;
pub use utils::CancellationToken;
