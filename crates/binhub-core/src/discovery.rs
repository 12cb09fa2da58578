//! Descriptor discovery and parsing.
//!
//! Descriptors live one subdirectory level below the descriptors root
//! (`binaries/j/jq.yaml`). The sorted file list returned here defines the
//! canonical input order that catalog aggregation's "first encountered" rule
//! depends on; callers must not reorder it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

use binhub_schema::ReleaseDescriptor;

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
}

/// Collect every descriptor file under `descriptors_dir`, sorted
/// lexicographically by path.
///
/// Only files directly inside first-level subdirectories are considered;
/// `.git` is skipped.
///
/// # Errors
///
/// Returns an error if the directory tree cannot be read.
pub fn find_descriptor_files(descriptors_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let walker = WalkDir::new(descriptors_dir)
        .min_depth(2)
        .max_depth(2)
        .into_iter()
        .filter_entry(|entry| entry.file_name() != ".git");

    for entry in walker {
        let entry =
            entry.with_context(|| format!("failed to walk {}", descriptors_dir.display()))?;
        if entry.file_type().is_file() && is_yaml(entry.path()) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}

/// Load and parse one descriptor file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid descriptor;
/// the caller reports it and excludes that descriptor from the run.
pub fn load_descriptor(path: &Path) -> Result<ReleaseDescriptor> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let descriptor: ReleaseDescriptor = serde_yaml::from_str(&content)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(descriptor)
}
