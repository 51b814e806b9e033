//! Position labels from the `<label>-repositories` directory convention.

use serde::{Deserialize, Serialize};

/// Default substring that marks an entry as a position marker.
pub const DEFAULT_MARKER: &str = "repositories";

/// Default suffix that separates the label from the rest of the name.
pub const DEFAULT_SUFFIX: &str = "-repositories";

/// Recognizes position markers in entry names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionMarker {
    /// Entry names containing this substring are markers
    pub marker: String,
    /// The label is the text before the first occurrence of this suffix
    pub suffix: String,
}

impl Default for PositionMarker {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_string(),
            suffix: DEFAULT_SUFFIX.to_string(),
        }
    }
}

impl PositionMarker {
    pub fn new(marker: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            suffix: suffix.into(),
        }
    }

    /// Label implied by an entry name, or None if the name is not a marker.
    ///
    /// A marker without the suffix (e.g. `repositories-old`) yields the
    /// whole name, trimmed.
    pub fn label_for(&self, name: &str) -> Option<String> {
        if self.marker.is_empty() || !name.contains(&self.marker) {
            return None;
        }
        let label = match name.find(&self.suffix) {
            Some(idx) if !self.suffix.is_empty() => &name[..idx],
            _ => name,
        };
        Some(label.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_before_suffix() {
        let marker = PositionMarker::default();
        assert_eq!(marker.label_for("A-repositories").as_deref(), Some("A"));
        assert_eq!(
            marker.label_for(" Position 2 -repositories").as_deref(),
            Some("Position 2")
        );
    }

    #[test]
    fn test_text_after_suffix_is_ignored() {
        let marker = PositionMarker::default();
        assert_eq!(
            marker.label_for("staging-repositories-2024").as_deref(),
            Some("staging")
        );
    }

    #[test]
    fn test_marker_without_suffix_uses_whole_name() {
        let marker = PositionMarker::default();
        assert_eq!(
            marker.label_for("repositories_backup ").as_deref(),
            Some("repositories_backup")
        );
    }

    #[test]
    fn test_non_marker_names() {
        let marker = PositionMarker::default();
        assert_eq!(marker.label_for("stores"), None);
        assert_eq!(marker.label_for("Repositories"), None);
    }

    #[test]
    fn test_custom_marker() {
        let marker = PositionMarker::new("sites", "-sites");
        assert_eq!(marker.label_for("eu-west-sites").as_deref(), Some("eu-west"));
        assert_eq!(marker.label_for("A-repositories"), None);
    }
}
