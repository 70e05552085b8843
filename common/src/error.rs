//! Error types for digest values.
//!
//! Each variant names the rejected input and the constraint it broke.

use thiserror::Error;

/// Errors arising from invalid digest strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DigestError {
    /// A SHA-1 digest is not a valid 40-character lowercase hex string.
    #[error("invalid SHA-1 digest \"{value}\": {reason}")]
    InvalidSha1Digest {
        /// The rejected digest string.
        value: String,
        /// Description of the validation failure.
        reason: String,
    },
}

/// Result type alias using [`DigestError`].
pub type Result<T> = std::result::Result<T, DigestError>;
