//! SHA-1 digest newtype for file and tree fingerprints.
//!
//! Validates that the value is a 40-character lowercase hexadecimal string.
//! Values are ordered by their hex text, which is the order the verification
//! code aggregation sorts by.

use super::error::{DigestError, Result};
use sha1::{Digest, Sha1};
use std::fmt;

/// Expected length of a hex-encoded SHA-1 digest.
pub const DIGEST_HEX_LEN: usize = 40;

/// A validated hex-encoded SHA-1 digest string.
///
/// # Examples
///
/// ```
/// use treecode_common::Sha1Digest;
///
/// let digest = Sha1Digest::of_bytes(b"");
/// assert_eq!(digest.as_str(), "da39a3ee5e6b4b0d3255bfef95601890afd80709");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Sha1Digest(String);

impl Sha1Digest {
    /// Hash an in-memory buffer.
    #[must_use]
    pub fn of_bytes(bytes: &[u8]) -> Self {
        Self::from_hasher(Sha1::new_with_prefix(bytes))
    }

    /// Finalise a running hasher into a digest.
    #[must_use]
    pub(crate) fn from_hasher(hasher: Sha1) -> Self {
        // Lower-hex formatting of the output array is always 40 lowercase chars.
        Self(format!("{:x}", hasher.finalize()))
    }

    /// Return the digest as a hex string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper and return the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<&str> for Sha1Digest {
    type Error = DigestError;

    fn try_from(value: &str) -> Result<Self> {
        validate_sha1(value)?;
        Ok(Self(value.to_owned()))
    }
}

impl TryFrom<String> for Sha1Digest {
    type Error = DigestError;

    fn try_from(value: String) -> Result<Self> {
        validate_sha1(&value)?;
        Ok(Self(value))
    }
}

impl AsRef<str> for Sha1Digest {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Sha1Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn validate_sha1(value: &str) -> Result<()> {
    let invalid = |reason: String| DigestError::InvalidSha1Digest {
        value: value.to_owned(),
        reason,
    };
    if value.len() != DIGEST_HEX_LEN {
        return Err(invalid(format!(
            "expected {DIGEST_HEX_LEN} hex characters, got {}",
            value.len()
        )));
    }
    if let Some(bad) = value.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(invalid(format!("non-hex character '{bad}'")));
    }
    if value.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(invalid("digest must be lowercase".to_owned()));
    }
    Ok(())
}
