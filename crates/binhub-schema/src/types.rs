use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeMap;

use crate::hash::Sha256Digest;

/// Error returned when a string is not usable as a path segment.
///
/// Binary names and versions become directory names in the publish tree and
/// segments of public URLs, so they are validated once at parse time and
/// trusted everywhere else.
#[derive(thiserror::Error, Debug)]
pub enum SegmentError {
    /// The value is empty.
    #[error("value must not be empty")]
    Empty,

    /// The value contains a character or component that could alter path
    /// resolution (separators, `..`, leading dot, control characters).
    #[error("value is not a safe path segment: {0:?}")]
    Unsafe(String),
}

fn validate_segment(s: &str) -> Result<(), SegmentError> {
    if s.is_empty() {
        return Err(SegmentError::Empty);
    }
    // Covers "." and ".." as well as hidden files.
    if s.starts_with('.') {
        return Err(SegmentError::Unsafe(s.to_string()));
    }
    if s.chars()
        .any(|c| c == '/' || c == '\\' || c.is_whitespace() || c.is_control())
    {
        return Err(SegmentError::Unsafe(s.to_string()));
    }
    Ok(())
}

/// The name of a published binary, kept verbatim from the descriptor.
///
/// Unlike a display string, a `BinaryName` is guaranteed to be a safe
/// filesystem and URL path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct BinaryName(String);

impl BinaryName {
    /// Create a new binary name, validating path-segment safety.
    ///
    /// # Errors
    ///
    /// Returns a [`SegmentError`] if the name is empty or contains path
    /// separators, whitespace, control characters, or leading dots.
    pub fn new(name: impl Into<String>) -> Result<Self, SegmentError> {
        let name = name.into();
        validate_segment(&name)?;
        Ok(Self(name))
    }

    /// Return the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The lowercase first character of the name, used as the letter bucket
    /// in the publish tree (`/j/jq/...`).
    pub fn first_letter(&self) -> String {
        self.0
            .chars()
            .next()
            .map(|c| c.to_lowercase().to_string())
            .unwrap_or_default()
    }
}

impl<'de> Deserialize<'de> for BinaryName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for BinaryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for BinaryName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl AsRef<std::path::Path> for BinaryName {
    fn as_ref(&self) -> &std::path::Path {
        std::path::Path::new(&self.0)
    }
}

impl Borrow<str> for BinaryName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// An opaque release version string.
///
/// Versions are never parsed; they order lexicographically, which is also the
/// sort order used for the `versions` list in the catalog. Like
/// [`BinaryName`], a `Version` is validated to be a safe path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Version(String);

impl Version {
    /// Create a new version, validating path-segment safety.
    ///
    /// # Errors
    ///
    /// Returns a [`SegmentError`] if the version is empty or contains path
    /// separators, whitespace, control characters, or leading dots.
    pub fn new(v: impl Into<String>) -> Result<Self, SegmentError> {
        let v = v.into();
        validate_segment(&v)?;
        Ok(Self(v))
    }

    /// Return the version string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Version {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl AsRef<std::path::Path> for Version {
    fn as_ref(&self) -> &std::path::Path {
        std::path::Path::new(&self.0)
    }
}

/// Archive container of a downloadable artifact.
///
/// Unknown strings are rejected at descriptor parse time; the extraction
/// pipeline only ever sees these closed variants.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveFormat {
    /// Standalone executable with no archive wrapper.
    Raw,
    /// Zip archive (`.zip`).
    Zip,
    /// Uncompressed tar archive (`.tar`).
    Tar,
    /// Gzip-compressed tar archive (`.tar.gz` / `.tgz`).
    #[serde(rename = "tar.gz", alias = "tgz")]
    TarGz,
    /// XZ-compressed tar archive (`.tar.xz`).
    #[serde(rename = "tar.xz")]
    TarXz,
}

impl ArchiveFormat {
    /// Whether artifacts of this format need an extraction step.
    pub fn is_archive(self) -> bool {
        !matches!(self, Self::Raw)
    }
}

impl std::fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Raw => "raw",
            Self::Zip => "zip",
            Self::Tar => "tar",
            Self::TarGz => "tar.gz",
            Self::TarXz => "tar.xz",
        };
        write!(f, "{s}")
    }
}

/// One architecture-specific download target within a descriptor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VariantSpec {
    /// HTTP(S) location of the release artifact.
    pub url: String,

    /// Archive container of the artifact.
    #[serde(rename = "type")]
    pub format: ArchiveFormat,

    /// Path of the desired entry inside the unpacked archive, relative to
    /// the archive root. Required for every format except `raw`.
    #[serde(rename = "binary_path_in_archive", default)]
    pub path_in_archive: Option<String>,

    /// Expected SHA256 digest of the downloaded artifact. Absence means
    /// "skip verification".
    #[serde(rename = "sha256", default)]
    pub checksum: Option<Sha256Digest>,
}

/// One binary release as declared by a descriptor file.
///
/// The variant mapping is a `BTreeMap` so iteration over architectures is
/// deterministic (sorted by architecture key), which keeps the publish run
/// reproducible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseDescriptor {
    /// Binary name, also used as a path segment in the publish tree.
    pub name: BinaryName,
    /// Human-readable description, passed through verbatim.
    pub description: String,
    /// Project homepage URL, passed through verbatim.
    pub homepage: String,
    /// Source repository URL, passed through verbatim.
    pub repository: String,
    /// License identifier, passed through verbatim.
    pub license: String,
    /// Release version, used as a path segment and aggregation key.
    pub version: Version,
    /// Architecture identifier (kept verbatim) to download spec.
    #[serde(rename = "architectures")]
    pub variants: BTreeMap<String, VariantSpec>,
    /// Free-form tags, passed through verbatim.
    pub tags: Vec<String>,
}

impl ReleaseDescriptor {
    /// Convert into a [`ProcessedDescriptor`] carrying the published
    /// variants that survived fetching.
    pub fn into_processed(
        self,
        architectures: BTreeMap<String, PublishedVariant>,
    ) -> ProcessedDescriptor {
        ProcessedDescriptor {
            name: self.name,
            description: self.description,
            homepage: self.homepage,
            repository: self.repository,
            license: self.license,
            version: self.version,
            tags: self.tags,
            architectures,
        }
    }
}

/// Output of successfully fetching one variant.
///
/// `sha256` serializes as `null` when no checksum was declared, matching the
/// published catalog format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublishedVariant {
    /// Public path of the published binary
    /// (`/<letter>/<name>/<version>/<arch>/<filename>`).
    pub url: String,
    /// Exact byte length of the published file.
    pub size: u64,
    /// The declared (and, if declared, verified) checksum.
    pub sha256: Option<Sha256Digest>,
}

/// A descriptor after its variants have been fetched.
///
/// Variants that failed to download, verify, or extract are absent from
/// `architectures`; the descriptor itself survives even when the mapping is
/// empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedDescriptor {
    /// Binary name.
    pub name: BinaryName,
    /// Human-readable description.
    pub description: String,
    /// Project homepage URL.
    pub homepage: String,
    /// Source repository URL.
    pub repository: String,
    /// License identifier.
    pub license: String,
    /// Release version.
    pub version: Version,
    /// Free-form tags.
    pub tags: Vec<String>,
    /// Architecture identifier to published variant, successes only.
    pub architectures: BTreeMap<String, PublishedVariant>,
}
