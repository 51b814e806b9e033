//! Cross-store comparison of the `snapshots` relation.
//!
//! Both stores are attached read-only to a private in-memory connection and
//! joined on `objectId`. Only rows present on both sides with differing
//! `data` are returned; rows missing on one side are not reported.

use super::alias::quote_identifier;
use super::record::DiffRecord;
use super::DiffError;
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::time::Duration;

/// Schema of one attached store.
#[derive(Debug, Clone, Copy)]
pub struct AttachedStore<'a> {
    pub alias: &'a str,
    pub path: &'a Path,
}

fn compare_sql(left: &str, right: &str) -> String {
    format!(
        "SELECT S1.objectId, S1.objectHash, S2.objectHash, S1.data, S2.data
         FROM {left}.snapshots AS S1
         JOIN {right}.snapshots AS S2 ON S1.objectId = S2.objectId
         WHERE CAST(S1.data AS BLOB) IS NOT CAST(S2.data AS BLOB)
         ORDER BY S1.objectId",
        left = quote_identifier(left),
        right = quote_identifier(right),
    )
}

/// Build a `file:` URI that opens `path` read-only.
fn read_only_uri(path: &Path) -> String {
    let mut raw = path.to_string_lossy().replace('\\', "/");
    // Windows drive paths need a leading slash in URI form
    if raw.as_bytes().get(1) == Some(&b':') {
        raw.insert(0, '/');
    }
    let escaped = raw
        .replace('%', "%25")
        .replace('?', "%3f")
        .replace('#', "%23");
    format!("file:{}?mode=ro", escaped)
}

/// Attach both stores and collect every mismatched shared row.
///
/// The connection lives only for this call.
pub fn compare_stores(
    left: AttachedStore<'_>,
    right: AttachedStore<'_>,
    busy_timeout: Duration,
) -> Result<Vec<DiffRecord>, DiffError> {
    let conn = Connection::open_in_memory_with_flags(
        OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    conn.busy_timeout(busy_timeout)?;

    for store in [left, right] {
        let sql = format!("ATTACH DATABASE ?1 AS {}", quote_identifier(store.alias));
        conn.execute(&sql, [read_only_uri(store.path)])
            .map_err(|source| DiffError::Attach {
                path: store.path.to_path_buf(),
                source,
            })?;
    }
    conn.execute_batch("PRAGMA query_only = ON")?;

    let mut stmt = conn
        .prepare(&compare_sql(left.alias, right.alias))
        .map_err(|source| DiffError::Query { source })?;
    let records = stmt
        .query_map([], |row| {
            Ok(DiffRecord::new(
                row.get_ref(0)?,
                row.get_ref(1)?,
                row.get_ref(2)?,
                row.get_ref(3)?,
                row.get_ref(4)?,
            ))
        })
        .and_then(|rows| rows.collect::<Result<Vec<_>, _>>())
        .map_err(|source| DiffError::Query { source })?;

    Ok(records)
}
