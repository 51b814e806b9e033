//! Identity extraction from the wrapped store header.
//!
//! Header layout (first [`HEADER_LEN`] bytes of the file):
//! - 1 marker byte (length/type prefix, ignored)
//! - the store name as UTF-8 text
//! - NUL padding up to 100 bytes
//!
//! The identity, not the filename, decides which copies belong together.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Size of the metadata header at the start of a wrapped store.
pub const HEADER_LEN: usize = 100;

/// Logical name of a store, recovered from file content.
/// Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreIdentity(String);

impl StoreIdentity {
    /// Validate a recovered name. Empty names and names containing control
    /// or replacement characters are rejected.
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        let plausible = !name.is_empty()
            && !name
                .chars()
                .any(|c| c.is_control() || c == char::REPLACEMENT_CHARACTER);
        plausible.then_some(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoreIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for StoreIdentity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Recover the store identity from the header region.
///
/// Returns None when the buffer is shorter than the header or the header
/// does not decode to a plausible name. Callers must keep such files apart
/// from resolved ones.
///
/// The header is trimmed before the marker character is dropped. A marker
/// byte that is itself whitespace (0x09, 0x0A, 0x0D, 0x20) is therefore
/// trimmed away, and the first character of the name is dropped in its
/// place. This order is intended and matches how existing stores resolve.
pub fn extract_identity(buffer: &[u8]) -> Option<StoreIdentity> {
    let header = buffer.get(..HEADER_LEN)?;
    let text = String::from_utf8_lossy(header);

    // Drop the marker prefix, then the NUL padding
    let mut chars = text.trim().chars();
    chars.next()?;
    let name: String = chars.filter(|&c| c != '\0').collect();

    StoreIdentity::new(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(marker: u8, name: &str) -> Vec<u8> {
        let mut buffer = vec![0u8; HEADER_LEN];
        buffer[0] = marker;
        buffer[1..1 + name.len()].copy_from_slice(name.as_bytes());
        buffer
    }

    #[test]
    fn test_extracts_padded_name() {
        let buffer = header(0x01, "MyStore");
        assert_eq!(extract_identity(&buffer).unwrap().as_str(), "MyStore");
    }

    #[test]
    fn test_marker_value_is_ignored() {
        let buffer = header(b'\x07', "call-history");
        assert_eq!(extract_identity(&buffer).unwrap().as_str(), "call-history");

        // A non-UTF-8 marker still counts as a single prefix
        let buffer = header(0xC8, "call-history");
        assert_eq!(extract_identity(&buffer).unwrap().as_str(), "call-history");
    }

    #[test]
    fn test_surrounding_whitespace_is_trimmed_before_marker() {
        let mut buffer = vec![b' '; HEADER_LEN];
        buffer[2] = 0x01;
        buffer[3..8].copy_from_slice(b"Store");
        // Trailing padding is spaces here, NULs are absent
        assert_eq!(extract_identity(&buffer).unwrap().as_str(), "Store");
    }

    #[test]
    fn test_whitespace_marker_is_trimmed_first() {
        let buffer = header(b' ', "xStore");
        assert_eq!(extract_identity(&buffer).unwrap().as_str(), "Store");
    }

    #[test]
    fn test_interior_nuls_are_removed() {
        let mut buffer = header(0x01, "My");
        buffer[4..9].copy_from_slice(b"Store");
        assert_eq!(extract_identity(&buffer).unwrap().as_str(), "MyStore");
    }

    #[test]
    fn test_short_header_is_unresolved() {
        let buffer = header(0x01, "MyStore");
        assert!(extract_identity(&buffer[..HEADER_LEN - 1]).is_none());
    }

    #[test]
    fn test_empty_header_is_unresolved() {
        assert!(extract_identity(&[0u8; HEADER_LEN]).is_none());
        assert!(extract_identity(&header(0x01, "")).is_none());
    }

    #[test]
    fn test_implausible_text_is_unresolved() {
        let buffer = header(0x01, "bad\x02name");
        assert!(extract_identity(&buffer).is_none());

        let mut buffer = header(0x01, "name");
        buffer[6] = 0xFF;
        assert!(extract_identity(&buffer).is_none());
    }

    #[test]
    fn test_identity_rejects_empty_name() {
        assert!(StoreIdentity::new("").is_none());
        assert_eq!(StoreIdentity::new("x").unwrap().to_string(), "x");
    }
}
