//! Locate the SQLite database behind a discovered store copy.
//!
//! A copy is usable in two ways:
//! - a plain database already sits at the derived path (`<identity>.sqlite`
//!   next to the wrapped file)
//! - otherwise the embedded database is cut out of the wrapped file into a
//!   scratch file that is deleted when the handle drops

use super::DiffError;
use crate::scanner::StoreFile;
use crate::store::{embedded_store, SQLITE_SIGNATURE};
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// A database file ready to be attached.
#[derive(Debug)]
pub enum StoreSource {
    /// Plain database at the derived path
    Sibling(PathBuf),
    /// Embedded database copied out of the wrapped file
    Unwrapped(NamedTempFile),
}

impl StoreSource {
    pub fn path(&self) -> &Path {
        match self {
            StoreSource::Sibling(path) => path,
            StoreSource::Unwrapped(file) => file.path(),
        }
    }

    /// Resolve the database for a copy.
    pub fn locate(file: &StoreFile, unwrap_embedded: bool) -> Result<Self, DiffError> {
        if is_plain_database(&file.path) {
            debug!("Using database at {}", file.path.display());
            return Ok(StoreSource::Sibling(file.path.clone()));
        }
        if !unwrap_embedded {
            return Err(DiffError::MissingStore {
                path: file.path.clone(),
            });
        }

        let buffer = std::fs::read(&file.source_path).map_err(|source| DiffError::Io {
            path: file.source_path.clone(),
            source,
        })?;
        let inner = embedded_store(&buffer).ok_or_else(|| DiffError::NotWrapped {
            path: file.source_path.clone(),
        })?;

        let scratch_err = |source: std::io::Error| DiffError::Io {
            path: file.source_path.clone(),
            source,
        };
        let mut scratch = tempfile::Builder::new()
            .prefix("snapdrift-")
            .suffix(".sqlite")
            .tempfile()
            .map_err(scratch_err)?;
        scratch.write_all(inner).map_err(scratch_err)?;
        scratch.flush().map_err(scratch_err)?;

        debug!(
            "Unwrapped {} into {}",
            file.source_path.display(),
            scratch.path().display()
        );
        Ok(StoreSource::Unwrapped(scratch))
    }
}

/// Whether a path holds an unwrapped SQLite database.
fn is_plain_database(path: &Path) -> bool {
    let mut magic = [0u8; 16];
    File::open(path)
        .and_then(|mut f| f.read_exact(&mut magic))
        .is_ok_and(|_| &magic == SQLITE_SIGNATURE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::EMBEDDED_OFFSET;
    use anyhow::Result;
    use tempfile::TempDir;

    fn store_file(dir: &Path, source: &str) -> StoreFile {
        StoreFile {
            path: dir.join("calls.sqlite"),
            source_path: dir.join(source),
            position: Some("A".to_string()),
        }
    }

    #[test]
    fn test_prefers_plain_sibling() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let mut plain = SQLITE_SIGNATURE.to_vec();
        plain.extend_from_slice(&[0u8; 84]);
        std::fs::write(temp_dir.path().join("calls.sqlite"), &plain)?;

        let file = store_file(temp_dir.path(), "blob");
        let source = StoreSource::locate(&file, true)?;
        assert!(matches!(source, StoreSource::Sibling(_)));
        assert_eq!(source.path(), file.path);
        Ok(())
    }

    #[test]
    fn test_unwraps_embedded_database() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let mut wrapped = vec![0u8; EMBEDDED_OFFSET];
        wrapped.extend_from_slice(SQLITE_SIGNATURE);
        wrapped.extend_from_slice(b"rest-of-page");
        std::fs::write(temp_dir.path().join("blob"), &wrapped)?;

        let file = store_file(temp_dir.path(), "blob");
        let source = StoreSource::locate(&file, true)?;
        let scratch = source.path().to_path_buf();
        assert!(matches!(source, StoreSource::Unwrapped(_)));
        assert_eq!(std::fs::read(&scratch)?, wrapped[EMBEDDED_OFFSET..].to_vec());

        drop(source);
        assert!(!scratch.exists());
        Ok(())
    }

    #[test]
    fn test_wrapped_file_at_derived_path_is_unwrapped() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let mut wrapped = vec![0u8; EMBEDDED_OFFSET];
        wrapped.extend_from_slice(SQLITE_SIGNATURE);
        std::fs::write(temp_dir.path().join("calls.sqlite"), &wrapped)?;

        let file = store_file(temp_dir.path(), "calls.sqlite");
        let source = StoreSource::locate(&file, true)?;
        assert!(matches!(source, StoreSource::Unwrapped(_)));
        Ok(())
    }

    #[test]
    fn test_missing_store_without_unwrapping() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let file = store_file(temp_dir.path(), "blob");
        let err = StoreSource::locate(&file, false).unwrap_err();
        assert!(matches!(err, DiffError::MissingStore { .. }));
        Ok(())
    }
}
