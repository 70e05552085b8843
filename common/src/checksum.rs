//! Content checksums for single files.
//!
//! Files are streamed through SHA-1 in fixed-size chunks, so large package
//! members never need to fit in memory.

use crate::sha1_digest::Sha1Digest;
use log::trace;
use sha1::{Digest, Sha1};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Read buffer size used while hashing.
const CHUNK_SIZE: usize = 8192;

/// Errors arising while hashing a single file.
#[derive(Debug, Error)]
pub enum ChecksumError {
    /// The file could not be opened or read.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        /// The file that failed.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The path names a directory rather than a file.
    #[error("{} is a directory", .path.display())]
    IsDirectory {
        /// The offending path.
        path: PathBuf,
    },
}

/// Compute the SHA-1 digest of the file at `path`.
///
/// # Errors
///
/// Returns [`ChecksumError::IsDirectory`] when `path` is a directory and
/// [`ChecksumError::Io`] when it is missing or unreadable.
///
/// # Examples
///
/// ```
/// use treecode_common::checksum::sha1_file;
///
/// let dir = tempfile::tempdir().expect("temp dir");
/// let path = dir.path().join("empty");
/// std::fs::write(&path, b"").expect("write");
/// let digest = sha1_file(&path).expect("hash");
/// assert_eq!(digest.as_str(), "da39a3ee5e6b4b0d3255bfef95601890afd80709");
/// ```
pub fn sha1_file(path: &Path) -> Result<Sha1Digest, ChecksumError> {
    let io_err = |source| ChecksumError::Io {
        path: path.to_path_buf(),
        source,
    };
    if fs::metadata(path).map_err(io_err)?.is_dir() {
        return Err(ChecksumError::IsDirectory {
            path: path.to_path_buf(),
        });
    }

    let mut file = fs::File::open(path).map_err(io_err)?;
    let mut hasher = Sha1::new();
    let mut buffer = [0u8; CHUNK_SIZE];
    loop {
        let bytes_read = file.read(&mut buffer).map_err(io_err)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(buffer.get(..bytes_read).unwrap_or_default());
    }
    let digest = Sha1Digest::from_hasher(hasher);
    trace!("sha1 {digest} {}", path.display());
    Ok(digest)
}

/// Compute the SHA-1 digest of an in-memory buffer.
#[must_use]
pub fn sha1_bytes(bytes: &[u8]) -> Sha1Digest {
    Sha1Digest::of_bytes(bytes)
}
