//! Format detection for wrapped stores.

/// Offset of the embedded database inside a wrapped store.
///
/// Matches the SQLite default page size: the prefix block occupies exactly
/// one page, so the inner signature sits at the start of the second page
/// instead of at byte 0 where SQLite normally writes it.
pub const EMBEDDED_OFFSET: usize = 4096;

/// "SQLite format 3\0"
pub const SQLITE_SIGNATURE: &[u8; 16] = b"SQLite format 3\0";

/// Check whether a buffer is a wrapped store.
pub fn is_store_file(buffer: &[u8]) -> bool {
    buffer
        .get(EMBEDDED_OFFSET..EMBEDDED_OFFSET + SQLITE_SIGNATURE.len())
        .is_some_and(|magic| magic == SQLITE_SIGNATURE)
}

/// Slice out the embedded database of a wrapped store.
/// Returns None if the buffer is not a wrapped store.
pub fn embedded_store(buffer: &[u8]) -> Option<&[u8]> {
    if is_store_file(buffer) {
        Some(&buffer[EMBEDDED_OFFSET..])
    } else {
        None
    }
}
