//! Deterministic layout of the publish tree.
//!
//! Every published binary lives at
//! `<output_root>/<first_letter>/<name>/<version>/<arch>/<filename>`, and the
//! public URL path mirrors the filesystem path exactly. These functions are
//! pure: the same inputs always produce the same paths across runs.

use std::path::{Path, PathBuf};

use binhub_schema::{BinaryName, Version};

/// Filename of the catalog document written at each level of the tree.
pub const API_FILENAME: &str = "api.json";

/// Filename the published binary gets for one architecture.
///
/// Windows targets get an `.exe` suffix; everything else is the bare name.
pub fn binary_filename(name: &BinaryName, arch: &str) -> String {
    if arch.starts_with("windows") {
        format!("{name}.exe")
    } else {
        name.as_str().to_string()
    }
}

/// Public URL path of one published variant, rooted at the publish tree.
pub fn public_path(name: &BinaryName, version: &Version, arch: &str) -> String {
    format!(
        "/{}/{name}/{version}/{arch}/{}",
        name.first_letter(),
        binary_filename(name, arch)
    )
}

/// Filesystem directory one variant is published into.
pub fn variant_dir(
    output_root: &Path,
    name: &BinaryName,
    version: &Version,
    arch: &str,
) -> PathBuf {
    output_root
        .join(name.first_letter())
        .join(name)
        .join(version)
        .join(arch)
}
