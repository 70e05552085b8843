//! Archive in, verification codes out.
//!
//! [`verify_archive`] unpacks a package into a scoped temporary directory,
//! computes its verification codes, and returns a report that only refers to
//! paths relative to the package root. The temporary directory is gone by the
//! time the report is handed back.

use std::collections::BTreeMap;
use std::path::Path;

use log::debug;
use treecode_common::{Sha1Digest, render_relative};
use treecode_extract::{ArchiveKind, package_friendly_name, with_extracted};

use crate::config::Config;
use crate::error::{Result, TreecodeError};
use crate::verification::{ExcludedDigests, verification_codes};

/// Verification results for one package archive.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ArchiveReport {
    /// Package name derived from the archive's file name.
    pub name: String,
    /// Detected archive format.
    pub kind: ArchiveKind,
    /// Member names as declared in the archive, in archive order.
    pub entries: Vec<String>,
    /// Content verification code.
    pub content_code: Sha1Digest,
    /// Path verification code.
    pub path_code: Sha1Digest,
    /// Digest of every regular file, keyed by `./`-relative path.
    pub files: BTreeMap<String, Sha1Digest>,
}

/// Extract `archive`, compute its verification codes, and clean up.
///
/// # Errors
///
/// Returns [`TreecodeError::Scope`] when the archive is not recognised,
/// cannot be extracted, or its temporary directory cannot be managed, and
/// [`TreecodeError::Verify`] when the unpacked tree cannot be hashed.
pub fn verify_archive(
    archive: &Path,
    excluded: &ExcludedDigests,
    config: &Config,
) -> Result<ArchiveReport> {
    let name = archive
        .file_name()
        .map(|file_name| package_friendly_name(&file_name.to_string_lossy()))
        .unwrap_or_default();
    let walk_options = config.walk_options();

    let report = with_extracted(archive, &config.extract_options(), |extracted| {
        let codes = verification_codes(extracted.root(), excluded, &walk_options)?;
        let files = codes
            .digests()
            .iter()
            .filter_map(|(path, digest)| {
                render_relative(codes.root(), path).map(|rendered| (rendered, digest.clone()))
            })
            .collect();
        Ok::<_, TreecodeError>(ArchiveReport {
            name,
            kind: extracted.kind(),
            entries: extracted.entries().to_vec(),
            content_code: codes.content_code().clone(),
            path_code: codes.path_code().clone(),
            files,
        })
    })?;

    debug!(
        "{} ({}): {} files, content {}, path {}",
        report.name,
        report.kind,
        report.files.len(),
        report.content_code,
        report.path_code
    );
    Ok(report)
}
