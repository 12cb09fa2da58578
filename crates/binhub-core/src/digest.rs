//! SHA256 digesting of artifact files.
//!
//! Streams over the input in bounded chunks so large downloads are never
//! materialized in memory just to be hashed.

use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};

/// Compute the SHA256 digest of everything in `reader`, returned as
/// lowercase hex.
///
/// # Errors
///
/// Returns any I/O error from the underlying reader.
pub fn digest_reader<R: Read>(mut reader: R) -> std::io::Result<String> {
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];
    loop {
        let count = reader.read(&mut buffer)?;
        if count == 0 {
            break;
        }
        hasher.update(&buffer[..count]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Compute the SHA256 digest of a file, returned as lowercase hex.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be opened or read.
pub fn digest_file(path: &Path) -> std::io::Result<String> {
    let file = std::fs::File::open(path)?;
    digest_reader(file)
}
