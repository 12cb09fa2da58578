//! Catalog index documents persisted as `api.json` at each level of the
//! publish tree.
//!
//! The hierarchy has four levels: root (letter buckets), letter (binary
//! names), binary (metadata and versions), version (architecture map). Field
//! names here are the wire format; consumers fetch these documents directly.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::PublishedVariant;

/// Wire-format version stamped into the root and letter documents.
pub const API_VERSION: &str = "1.0";

/// Root catalog: the sorted set of letter buckets with published content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RootIndex {
    /// Wire-format version, always [`API_VERSION`].
    pub version: String,
    /// Sorted first-letter bucket names.
    pub directories: Vec<String>,
}

impl RootIndex {
    /// Build a root index over sorted letter bucket names.
    pub fn new(directories: Vec<String>) -> Self {
        Self {
            version: API_VERSION.to_string(),
            directories,
        }
    }
}

/// Letter catalog: the sorted, deduplicated binary names in one bucket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LetterIndex {
    /// Wire-format version, always [`API_VERSION`].
    pub version: String,
    /// Sorted, deduplicated binary names beginning with this letter.
    pub binaries: Vec<String>,
}

impl LetterIndex {
    /// Build a letter index over sorted binary names.
    pub fn new(binaries: Vec<String>) -> Self {
        Self {
            version: API_VERSION.to_string(),
            binaries,
        }
    }
}

/// Binary catalog: descriptive metadata plus the known versions of one name.
///
/// Metadata comes from the first descriptor encountered for the name in
/// canonical input order; later descriptors for the same name only contribute
/// their version.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BinaryIndex {
    /// Binary name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// Project homepage URL.
    pub homepage: String,
    /// Source repository URL.
    pub repository: String,
    /// License identifier.
    pub license: String,
    /// Free-form tags.
    pub tags: Vec<String>,
    /// Sorted, deduplicated version strings.
    pub versions: Vec<String>,
}

/// Version catalog: the architecture map of one exact release.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VersionIndex {
    /// Binary name.
    pub name: String,
    /// Release version.
    pub version: String,
    /// Architecture identifier to published variant.
    pub architectures: BTreeMap<String, PublishedVariant>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_index_wire_shape() {
        let root = RootIndex::new(vec!["g".to_string(), "j".to_string()]);
        let json = serde_json::to_value(&root).unwrap();
        assert_eq!(json["version"], "1.0");
        assert_eq!(json["directories"][0], "g");
        assert_eq!(json["directories"][1], "j");
    }

    #[test]
    fn version_index_round_trips() {
        let mut architectures = BTreeMap::new();
        architectures.insert(
            "linux-amd64".to_string(),
            PublishedVariant {
                url: "/j/jq/1.6/linux-amd64/jq".to_string(),
                size: 3953824,
                sha256: None,
            },
        );
        let index = VersionIndex {
            name: "jq".to_string(),
            version: "1.6".to_string(),
            architectures,
        };
        let json = serde_json::to_string(&index).unwrap();
        let back: VersionIndex = serde_json::from_str(&json).unwrap();
        assert_eq!(back, index);
    }
}
