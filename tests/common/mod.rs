//! Helpers for building wrapped stores on disk.

#![allow(dead_code)]

use anyhow::Result;
use rusqlite::{params, Connection};
use std::fs;
use std::path::Path;

/// Byte length of the custom header in front of the database.
pub const PREFIX_LEN: usize = 4096;

/// Build the 4096-byte header: a marker byte followed by the store name.
pub fn header(identity: &str) -> Vec<u8> {
    let mut prefix = vec![0u8; PREFIX_LEN];
    prefix[0] = 0x01;
    prefix[1..1 + identity.len()].copy_from_slice(identity.as_bytes());
    prefix
}

fn wrap(path: &Path, identity: &str, build: impl FnOnce(&Connection) -> Result<()>) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let scratch = tempfile::NamedTempFile::new()?;
    {
        let conn = Connection::open(scratch.path())?;
        build(&conn)?;
    }

    let mut bytes = header(identity);
    bytes.extend(fs::read(scratch.path())?);
    fs::write(path, bytes)?;
    Ok(())
}

/// Write a wrapped store with a `snapshots` table holding `(objectId, hash, data)` rows.
pub fn write_store(path: &Path, identity: &str, rows: &[(u8, u8, &str)]) -> Result<()> {
    wrap(path, identity, |conn| {
        conn.execute_batch(
            "CREATE TABLE snapshots (objectId BLOB PRIMARY KEY, objectHash BLOB, data TEXT)",
        )?;
        for (id, hash, data) in rows {
            conn.execute(
                "INSERT INTO snapshots (objectId, objectHash, data) VALUES (?1, ?2, ?3)",
                params![vec![*id], vec![*hash], data],
            )?;
        }
        Ok(())
    })
}

/// Write a wrapped store whose database has no `snapshots` table.
pub fn write_store_without_snapshots(path: &Path, identity: &str) -> Result<()> {
    wrap(path, identity, |conn| {
        conn.execute_batch("CREATE TABLE other (id INTEGER PRIMARY KEY)")?;
        Ok(())
    })
}
