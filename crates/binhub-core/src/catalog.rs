//! Catalog aggregation and persistence.
//!
//! Folds the ordered list of processed descriptors into the four-level
//! discovery hierarchy (root, letter, binary, version) and writes an
//! `api.json` at each level of the publish tree. Grouping never re-sorts the
//! descriptors themselves: "first encountered" means first in the canonical
//! input order established by descriptor discovery.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use binhub_schema::{BinaryIndex, LetterIndex, ProcessedDescriptor, RootIndex, VersionIndex};

use crate::paths::API_FILENAME;

/// The aggregated four-level catalog, ready to persist.
#[derive(Debug)]
pub struct Catalog {
    /// Root document listing the letter buckets.
    pub root: RootIndex,
    /// Letter bucket to its per-letter catalog.
    pub letters: BTreeMap<String, LetterCatalog>,
}

/// One letter bucket: its index document and the binaries beneath it.
#[derive(Debug)]
pub struct LetterCatalog {
    /// The letter's index document.
    pub index: LetterIndex,
    /// Binary name to its per-binary catalog.
    pub binaries: BTreeMap<String, BinaryCatalog>,
}

/// One binary: its index document and the versions beneath it.
#[derive(Debug)]
pub struct BinaryCatalog {
    /// The binary's index document.
    pub index: BinaryIndex,
    /// Version string to its version document.
    pub versions: BTreeMap<String, VersionIndex>,
}

/// Builds a [`Catalog`] from processed descriptors.
#[derive(Debug, Default)]
pub struct Aggregator {
    skip_empty: bool,
}

impl Aggregator {
    /// Aggregator with the default policy: descriptors whose variants all
    /// failed still appear in the catalog, with zero versions' worth of
    /// architectures. That mirrors the behavior consumers already see.
    pub fn new() -> Self {
        Self::default()
    }

    /// Exclude descriptors with no published variants from the catalog.
    pub fn skip_empty(mut self, skip: bool) -> Self {
        self.skip_empty = skip;
        self
    }

    /// Fold descriptors, in their given order, into the catalog hierarchy.
    ///
    /// Descriptive metadata for a binary name comes from the first
    /// descriptor carrying that name; later descriptors for the same name
    /// only contribute their version. When the same (name, version) pair
    /// appears twice, the later occurrence wins the version document.
    pub fn aggregate(&self, descriptors: &[ProcessedDescriptor]) -> Catalog {
        let mut groups: BTreeMap<String, Vec<&ProcessedDescriptor>> = BTreeMap::new();
        for descriptor in descriptors {
            if self.skip_empty && descriptor.architectures.is_empty() {
                continue;
            }
            groups
                .entry(descriptor.name.first_letter())
                .or_default()
                .push(descriptor);
        }

        let root = RootIndex::new(groups.keys().cloned().collect());

        let letters = groups
            .into_iter()
            .map(|(letter, group)| {
                let names: BTreeSet<&str> = group.iter().map(|d| d.name.as_str()).collect();
                let index = LetterIndex::new(names.into_iter().map(String::from).collect());

                let mut binaries: BTreeMap<String, BinaryCatalog> = BTreeMap::new();
                for descriptor in group {
                    let binary = binaries
                        .entry(descriptor.name.as_str().to_string())
                        .or_insert_with(|| BinaryCatalog {
                            index: BinaryIndex {
                                name: descriptor.name.as_str().to_string(),
                                description: descriptor.description.clone(),
                                homepage: descriptor.homepage.clone(),
                                repository: descriptor.repository.clone(),
                                license: descriptor.license.clone(),
                                tags: descriptor.tags.clone(),
                                versions: Vec::new(),
                            },
                            versions: BTreeMap::new(),
                        });

                    binary.versions.insert(
                        descriptor.version.as_str().to_string(),
                        VersionIndex {
                            name: descriptor.name.as_str().to_string(),
                            version: descriptor.version.as_str().to_string(),
                            architectures: descriptor.architectures.clone(),
                        },
                    );
                }

                // The version-document keys are exactly the distinct
                // versions, already sorted.
                for binary in binaries.values_mut() {
                    binary.index.versions = binary.versions.keys().cloned().collect();
                }

                (letter, LetterCatalog { index, binaries })
            })
            .collect();

        Catalog { root, letters }
    }
}

fn write_api<T: Serialize>(dir: &Path, document: &T) -> Result<()> {
    let path = dir.join(API_FILENAME);
    let json = serde_json::to_string_pretty(document)
        .with_context(|| format!("failed to encode {}", path.display()))?;
    std::fs::write(&path, json).with_context(|| format!("failed to write {}", path.display()))
}

/// Write the catalog's `api.json` documents at all four tree depths.
///
/// Directory creation is idempotent; binary publication has usually created
/// most of the tree already.
///
/// # Errors
///
/// Any filesystem failure here is fatal to the run and is returned as-is.
pub fn persist(catalog: &Catalog, output_root: &Path) -> Result<()> {
    std::fs::create_dir_all(output_root)
        .with_context(|| format!("failed to create {}", output_root.display()))?;
    write_api(output_root, &catalog.root)?;

    for (letter, letter_catalog) in &catalog.letters {
        let letter_dir = output_root.join(letter);
        std::fs::create_dir_all(&letter_dir)
            .with_context(|| format!("failed to create {}", letter_dir.display()))?;
        write_api(&letter_dir, &letter_catalog.index)?;

        for (name, binary_catalog) in &letter_catalog.binaries {
            let binary_dir = letter_dir.join(name);
            std::fs::create_dir_all(&binary_dir)
                .with_context(|| format!("failed to create {}", binary_dir.display()))?;
            write_api(&binary_dir, &binary_catalog.index)?;

            for (version, version_index) in &binary_catalog.versions {
                let version_dir = binary_dir.join(version);
                std::fs::create_dir_all(&version_dir)
                    .with_context(|| format!("failed to create {}", version_dir.display()))?;
                write_api(&version_dir, version_index)?;
            }
        }
    }

    Ok(())
}
