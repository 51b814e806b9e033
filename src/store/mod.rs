//! Store module - Recognize wrapped snapshot stores and read their identity.
//!
//! A wrapped store is a SQLite database preceded by a page-aligned prefix
//! block. The prefix carries a 100-byte metadata header whose text is the
//! store's logical name, padded with NUL bytes. The database itself starts
//! at [`EMBEDDED_OFFSET`].

pub mod format;
pub mod identity;

pub use format::{embedded_store, is_store_file, EMBEDDED_OFFSET, SQLITE_SIGNATURE};
pub use identity::{extract_identity, StoreIdentity, HEADER_LEN};
