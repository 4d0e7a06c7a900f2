//! SHA-256 checksum utilities
//!
//! Backup journals record the checksum of every sidecar so a restore can
//! refuse to copy back a sidecar that was edited or truncated.

use sha2::{Digest, Sha256};

use crate::{NormalizedPath, Result, io};

/// Prefix for all checksums produced by this module
const PREFIX: &str = "sha256:";

/// Compute the SHA-256 checksum of raw bytes in the form `"sha256:<hex>"`.
pub fn compute_checksum(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{}{:x}", PREFIX, hasher.finalize())
}

/// Compute the SHA-256 checksum of a file's contents.
pub fn compute_file_checksum(path: &NormalizedPath) -> Result<String> {
    let content = io::read_bytes(path)?;
    Ok(compute_checksum(&content))
}
