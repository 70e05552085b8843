//! Deterministic SPDX package verification codes.
//!
//! treecode unpacks a package archive into a private temporary directory,
//! hashes every regular file, and reduces the hashes to the two SPDX
//! verification codes: one over file content and one over file paths. The
//! temporary directory is removed on every exit path.
//!
//! ```no_run
//! use std::path::Path;
//! use treecode::{Config, ExcludedDigests, verify_archive};
//!
//! let report = verify_archive(
//!     Path::new("zlib-1.3.1.tar.gz"),
//!     &ExcludedDigests::new(),
//!     &Config::default(),
//! )?;
//! println!("{} {}", report.name, report.content_code);
//! # Ok::<(), treecode::TreecodeError>(())
//! ```

pub mod config;
pub mod error;
pub mod filetype;
pub mod pipeline;
pub mod verification;
pub mod walk;

pub use config::{Config, ConfigError};
pub use error::{Result, TreecodeError};
pub use filetype::{DescribeFile, SpdxFileType, classify_file};
pub use pipeline::{ArchiveReport, verify_archive};
pub use treecode_common::{Sha1Digest, sha1_bytes, sha1_file};
pub use treecode_extract::{package_friendly_name, with_extracted};
pub use verification::{
    ExcludedDigests, FileDigest, FileDigestSink, VerificationCodes, VerifyError, content_code,
    verification_codes,
};
pub use walk::{WalkError, WalkOptions, walk};
