//! Core record types for indexed inventory and query results.
//!
//! These are the typed replacements for the loose key/value metadata the
//! index persists: malformed records are rejected at the deserialization
//! boundary instead of at use sites.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Metadata for a single indexed catalog image.
///
/// One `InventoryItem` exists per indexed image; item *i* describes row *i*
/// of the embedding matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    /// Display identifier, derived from the file's base name without extension.
    pub name: String,
    /// Absolute, resolved filesystem location of the source image.
    pub path: PathBuf,
}

impl InventoryItem {
    /// Creates an item from a source image path.
    ///
    /// The name is the file stem; the path is stored as given (callers
    /// resolve it to an absolute path before construction).
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { name, path }
    }

    /// Returns the source path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Display for InventoryItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.path.display())
    }
}

/// A single ranked similarity hit returned by a query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchResult {
    /// 1-based rank within the result set.
    pub rank: usize,
    /// Display name of the matched inventory item.
    pub name: String,
    /// Cosine similarity between query and item, in [-1, 1].
    pub similarity: f32,
    /// Filesystem location of the matched item's image.
    pub path: PathBuf,
}

impl fmt::Display for MatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} ({:.2}%) -> {}",
            self.rank,
            self.name,
            self.similarity * 100.0,
            self.path.display()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_from_path_uses_file_stem() {
        let item = InventoryItem::from_path("/inventory/sneaker-red.jpg");
        assert_eq!(item.name, "sneaker-red");
        assert_eq!(item.path, PathBuf::from("/inventory/sneaker-red.jpg"));
    }

    #[test]
    fn item_from_extensionless_path() {
        let item = InventoryItem::from_path("/inventory/sample");
        assert_eq!(item.name, "sample");
    }

    #[test]
    fn item_serde_round_trip() {
        let item = InventoryItem::from_path("/inventory/boot.png");
        let json = serde_json::to_string(&item).unwrap();
        let back: InventoryItem = serde_json::from_str(&json).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn malformed_item_rejected_at_deserialization() {
        let err = serde_json::from_str::<InventoryItem>(r#"{"name": "boot"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn match_result_display() {
        let result = MatchResult {
            rank: 1,
            name: "boot".to_string(),
            similarity: 0.9731,
            path: PathBuf::from("/inventory/boot.png"),
        };
        let rendered = result.to_string();
        assert!(rendered.starts_with("#1 boot (97.31%)"));
        assert!(rendered.ends_with("/inventory/boot.png"));
    }
}
