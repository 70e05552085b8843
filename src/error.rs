//! Crate-level error type.

use thiserror::Error;
use treecode_common::{ChecksumError, DigestError};
use treecode_extract::ScopeError;

use crate::config::ConfigError;
use crate::verification::VerifyError;
use crate::walk::WalkError;

/// Any failure surfaced by treecode.
#[derive(Debug, Error)]
pub enum TreecodeError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A digest string was malformed.
    #[error(transparent)]
    Digest(#[from] DigestError),

    /// A single file could not be hashed.
    #[error(transparent)]
    Checksum(#[from] ChecksumError),

    /// The tree could not be traversed.
    #[error(transparent)]
    Walk(#[from] WalkError),

    /// Verification codes could not be computed.
    #[error(transparent)]
    Verify(#[from] VerifyError),

    /// The archive could not be extracted or its scratch space managed.
    #[error(transparent)]
    Scope(#[from] ScopeError),
}

/// Result alias used across the crate.
pub type Result<T, E = TreecodeError> = std::result::Result<T, E>;
