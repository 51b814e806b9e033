//! Filesystem capability used by the scanner.
//!
//! The scanner only needs two primitives: list a directory and read a whole
//! file. Keeping them behind a trait lets tests drive traversal with an
//! in-memory tree and a fixed entry order.

use std::io;
use std::path::{Path, PathBuf};

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    /// File or directory name (last path component)
    pub name: String,
    /// Full path to the entry
    pub path: PathBuf,
    /// Whether the entry is a directory
    pub is_dir: bool,
    /// Symbolic link pointing at a directory; listed but never walked
    pub is_dir_link: bool,
}

/// Directory and file access for the scanner.
pub trait FileSystem: Sync {
    /// List entries of a directory, in the order the backend yields them.
    fn list_dir(&self, dir: &Path) -> io::Result<Vec<DirEntry>>;

    /// Read a file fully.
    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>>;
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn list_dir(&self, dir: &Path) -> io::Result<Vec<DirEntry>> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            // file_type() does not follow symlinks, so a linked directory is
            // never walked and a link cycle cannot repeat the same stores
            let file_type = entry.file_type()?;
            let path = entry.path();
            let is_dir_link = file_type.is_symlink() && path.is_dir();
            entries.push(DirEntry {
                name: entry.file_name().to_string_lossy().to_string(),
                path,
                is_dir: file_type.is_dir(),
                is_dir_link,
            });
        }
        Ok(entries)
    }

    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }
}
