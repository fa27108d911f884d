//! Content and path hashing
//!
//! Two digests with different jobs: the *full* hash covers a source file's
//! bytes plus its size and modification time, and is only ever a staleness
//! short-circuit; the *path* hash names the cache file and depends on the
//! path string alone, so loading the index never has to stat any source
//! file.

use std::fs;
use std::io;
use std::path::Path;
use std::time::UNIX_EPOCH;

use sha2::{Digest, Sha256};

/// Digest of file contents + size + mtime, folded to 64 bits.
pub fn hash_file(path: &Path) -> io::Result<u64> {
    let contents = fs::read(path)?;
    let metadata = fs::metadata(path)?;
    let mtime = metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let mut hasher = Sha256::new();
    hasher.update(&contents);
    hasher.update(metadata.len().to_le_bytes());
    hasher.update(mtime.to_le_bytes());
    let digest = hasher.finalize();

    let mut folded = [0u8; 8];
    folded.copy_from_slice(&digest[..8]);
    Ok(u64::from_le_bytes(folded))
}

/// Hex digest of a path string, used for deterministic cache file names.
pub fn hash_path_name(source_path: &str) -> String {
    let digest = Sha256::digest(source_path.as_bytes());
    hex::encode(&digest[..8])
}
