//! Archive extraction for downloaded release artifacts.
//!
//! The whole archive is unpacked into a scoped temporary directory and the
//! requested entry is read from there; the temporary directory is removed on
//! every exit path, success or failure. Entry paths are rejected before
//! unpacking if they could escape the extraction root (absolute paths or
//! `..` segments), since archives arrive from arbitrary URLs.

use std::fs::File;
use std::io::Read;
use std::path::{Component, Path};

use binhub_schema::ArchiveFormat;
use thiserror::Error;

/// Errors from locating an entry inside a release archive.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// The format has no archive container to extract from.
    #[error("unsupported archive format: {0}")]
    UnsupportedFormat(ArchiveFormat),

    /// The requested entry path is absolute or contains `..` segments.
    #[error("entry path escapes the archive root: {0:?}")]
    UnsafeEntryPath(String),

    /// The archive unpacked cleanly but the requested entry was not in it.
    #[error("entry {0:?} not found in archive")]
    EntryNotFound(String),

    /// The zip container could not be decoded.
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Filesystem or decompression failure while unpacking.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Whether `path` stays inside the directory it is resolved against.
fn is_safe_entry_path(path: &str) -> bool {
    let path = Path::new(path);
    !path.is_absolute()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

fn tar_decompression_stream(
    format: ArchiveFormat,
    file: File,
) -> Result<Box<dyn Read>, ExtractError> {
    match format {
        ArchiveFormat::Tar => Ok(Box::new(file)),
        ArchiveFormat::TarGz => Ok(Box::new(flate2::read::GzDecoder::new(file))),
        ArchiveFormat::TarXz => Ok(Box::new(xz2::read::XzDecoder::new(file))),
        ArchiveFormat::Raw | ArchiveFormat::Zip => Err(ExtractError::UnsupportedFormat(format)),
    }
}

/// Unpack `archive` and return the bytes of the entry at `entry_path`.
///
/// `entry_path` is interpreted relative to the archive root. The returned
/// bytes carry no permissions; setting the published file executable is the
/// caller's job.
///
/// # Errors
///
/// Returns [`ExtractError::UnsafeEntryPath`] for absolute or `..` paths,
/// [`ExtractError::UnsupportedFormat`] when `format` is `raw`,
/// [`ExtractError::EntryNotFound`] when the entry does not exist after
/// unpacking, and I/O or container errors from the unpacking itself.
pub fn extract_entry(
    archive: &Path,
    format: ArchiveFormat,
    entry_path: &str,
) -> Result<Vec<u8>, ExtractError> {
    if !is_safe_entry_path(entry_path) {
        return Err(ExtractError::UnsafeEntryPath(entry_path.to_string()));
    }

    // Scoped unpack root; removed when `tmp` drops, on every return path.
    let tmp = tempfile::tempdir()?;

    match format {
        ArchiveFormat::Raw => return Err(ExtractError::UnsupportedFormat(format)),
        ArchiveFormat::Zip => {
            let file = File::open(archive)?;
            let mut zip = zip::ZipArchive::new(file)?;
            zip.extract(tmp.path())?;
        }
        ArchiveFormat::Tar | ArchiveFormat::TarGz | ArchiveFormat::TarXz => {
            let file = File::open(archive)?;
            let stream = tar_decompression_stream(format, file)?;
            tar::Archive::new(stream).unpack(tmp.path())?;
        }
    }

    let entry = tmp.path().join(entry_path);
    if !entry.is_file() {
        return Err(ExtractError::EntryNotFound(entry_path.to_string()));
    }
    Ok(std::fs::read(entry)?)
}
