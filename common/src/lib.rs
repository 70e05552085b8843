//! Shared digest infrastructure for treecode: the validated SHA-1 digest
//! newtype, the single-file checksum engine, and root-relative path
//! rendering.

pub mod checksum;
pub mod error;
pub mod relative;
pub mod sha1_digest;

pub use checksum::{ChecksumError, sha1_bytes, sha1_file};
pub use error::DigestError;
pub use relative::render_relative;
pub use sha1_digest::{DIGEST_HEX_LEN, Sha1Digest};
