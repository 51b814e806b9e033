//! Identity-keyed groups of discovered store copies.

use crate::store::StoreIdentity;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One discovered on-disk copy of a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreFile {
    /// Store path: the found file's directory joined with `<identity>.<ext>`
    pub path: PathBuf,
    /// The wrapped file that was actually found
    pub source_path: PathBuf,
    /// Position label active when the file was discovered
    pub position: Option<String>,
}

impl StoreFile {
    /// Position label for display.
    pub fn position_name(&self) -> &str {
        self.position.as_deref().unwrap_or("<none>")
    }
}

/// Mapping from identity to copies.
///
/// Identities keep first-discovery order; copies keep discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grouping {
    groups: IndexMap<StoreIdentity, Vec<StoreFile>>,
}

impl Grouping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a copy to its identity's group, creating the group if absent.
    pub fn push(&mut self, identity: StoreIdentity, file: StoreFile) {
        self.groups.entry(identity).or_default().push(file);
    }

    /// Append every copy of `other` after the copies already present.
    pub fn merge(&mut self, other: Grouping) {
        for (identity, files) in other.groups {
            self.groups.entry(identity).or_default().extend(files);
        }
    }

    pub fn get(&self, identity: &StoreIdentity) -> Option<&[StoreFile]> {
        self.groups.get(identity).map(Vec::as_slice)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StoreIdentity, &[StoreFile])> {
        self.groups
            .iter()
            .map(|(identity, files)| (identity, files.as_slice()))
    }

    /// Number of distinct identities.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of copies across all groups.
    pub fn copy_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }
}

impl<'a> IntoIterator for &'a Grouping {
    type Item = (&'a StoreIdentity, &'a Vec<StoreFile>);
    type IntoIter = indexmap::map::Iter<'a, StoreIdentity, Vec<StoreFile>>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(name: &str) -> StoreIdentity {
        StoreIdentity::new(name).unwrap()
    }

    fn copy(path: &str, position: &str) -> StoreFile {
        StoreFile {
            path: PathBuf::from(path),
            source_path: PathBuf::from(path),
            position: Some(position.to_string()),
        }
    }

    #[test]
    fn test_push_keeps_discovery_order() {
        let mut grouping = Grouping::new();
        grouping.push(identity("calls"), copy("/a/calls.sqlite", "A"));
        grouping.push(identity("users"), copy("/a/users.sqlite", "A"));
        grouping.push(identity("calls"), copy("/b/calls.sqlite", "B"));

        let keys: Vec<_> = grouping.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(keys, vec!["calls", "users"]);

        let calls = grouping.get(&identity("calls")).unwrap();
        assert_eq!(calls[0].position.as_deref(), Some("A"));
        assert_eq!(calls[1].position.as_deref(), Some("B"));
        assert_eq!(grouping.copy_count(), 3);
    }

    #[test]
    fn test_merge_appends_after_existing() {
        let mut left = Grouping::new();
        left.push(identity("calls"), copy("/a/calls.sqlite", "A"));

        let mut right = Grouping::new();
        right.push(identity("users"), copy("/b/users.sqlite", "B"));
        right.push(identity("calls"), copy("/b/calls.sqlite", "B"));

        left.merge(right);

        let keys: Vec<_> = left.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(keys, vec!["calls", "users"]);
        let positions: Vec<_> = left
            .get(&identity("calls"))
            .unwrap()
            .iter()
            .map(StoreFile::position_name)
            .collect();
        assert_eq!(positions, vec!["A", "B"]);
    }
}
