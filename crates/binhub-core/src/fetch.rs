//! Download, verify, and publish a single release variant.
//!
//! Handles artifact downloads with streaming SHA256 verification. The
//! response body is streamed to a scoped temporary file which is cleaned up
//! on every exit path; nothing is written under the output root until the
//! declared checksum (if any) has been verified.

use std::path::Path;

use futures::StreamExt;
use reqwest::Client;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::io::AsyncWriteExt;

use binhub_schema::{ArchiveFormat, BinaryName, PublishedVariant, VariantSpec, Version};

use crate::extract::{self, ExtractError};
use crate::paths;

/// Errors from fetching one variant.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The HTTP request failed or returned a non-success status.
    #[error("download failed: {0}")]
    Download(#[from] reqwest::Error),

    /// The downloaded bytes do not match the declared checksum.
    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// The digest declared by the descriptor.
        expected: String,
        /// The digest computed over the downloaded bytes.
        actual: String,
    },

    /// An archive format was declared without a `binary_path_in_archive`.
    #[error("{format} artifacts require binary_path_in_archive")]
    MissingArchivePath {
        /// The archive format that was declared.
        format: ArchiveFormat,
    },

    /// The archive could not be unpacked or the entry was missing.
    #[error(transparent)]
    Extract(#[from] ExtractError),

    /// Filesystem failure while staging or publishing the binary.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Download one variant, verify it, and publish the binary into the tree.
///
/// On success the binary sits at its deterministic path under `output_root`
/// with mode 0755 and the returned [`PublishedVariant`] describes it. On any
/// failure the destination path is left untouched; the partially downloaded
/// temp file is always removed.
///
/// # Errors
///
/// Returns a [`FetchError`] naming the step that failed; see the variants.
pub async fn fetch_variant(
    client: &Client,
    output_root: &Path,
    name: &BinaryName,
    version: &Version,
    arch: &str,
    spec: &VariantSpec,
) -> Result<PublishedVariant, FetchError> {
    let response = client
        .get(&spec.url)
        .header(reqwest::header::USER_AGENT, crate::USER_AGENT)
        .send()
        .await?
        .error_for_status()?;

    // Stream the body into a scoped temp file, hashing as chunks arrive.
    let tmp = tempfile::NamedTempFile::new()?;
    let mut file = tokio::fs::File::create(tmp.path()).await?;
    let mut stream = response.bytes_stream();
    let mut hasher = Sha256::new();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        hasher.update(&chunk);
    }
    file.flush().await?;
    drop(file);

    // Checksum gate: must pass before anything lands under the output root.
    if let Some(expected) = &spec.checksum {
        let actual = hex::encode(hasher.finalize());
        if !expected.matches(&actual) {
            return Err(FetchError::ChecksumMismatch {
                expected: expected.to_string(),
                actual,
            });
        }
    }

    let dest_dir = paths::variant_dir(output_root, name, version, arch);
    tokio::fs::create_dir_all(&dest_dir).await?;
    let dest = dest_dir.join(paths::binary_filename(name, arch));

    if spec.format.is_archive() {
        let entry_path =
            spec.path_in_archive
                .clone()
                .ok_or(FetchError::MissingArchivePath {
                    format: spec.format,
                })?;
        let archive = tmp.path().to_path_buf();
        let format = spec.format;
        let bytes =
            tokio::task::spawn_blocking(move || extract::extract_entry(&archive, format, &entry_path))
                .await
                .map_err(std::io::Error::other)??;
        tokio::fs::write(&dest, bytes).await?;
    } else {
        tokio::fs::copy(tmp.path(), &dest).await?;
    }

    // Executable bit goes on only after the full payload is in place.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = tokio::fs::metadata(&dest).await?.permissions();
        perms.set_mode(0o755);
        tokio::fs::set_permissions(&dest, perms).await?;
    }

    let size = tokio::fs::metadata(&dest).await?.len();

    Ok(PublishedVariant {
        url: paths::public_path(name, version, arch),
        size,
        sha256: spec.checksum.clone(),
    })
}
