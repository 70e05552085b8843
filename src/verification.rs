//! SPDX package verification codes over an unpacked tree.
//!
//! Two codes are derived from a directory:
//!
//! - the content code, a SHA-1 over the sorted digests of every regular file
//!   whose digest is not excluded;
//! - the path code, a SHA-1 over the sorted SHA-1s of each included file's
//!   root-relative path rendered as `./dir/file`.
//!
//! Both are pure functions of their inputs: the walk is sorted before use,
//! so filesystem iteration order never leaks into the result.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;
use thiserror::Error;
use treecode_common::{ChecksumError, Sha1Digest, render_relative, sha1_bytes, sha1_file};

use crate::walk::{WalkError, WalkOptions, walk};

/// Per-file digests keyed by absolute path.
pub type DigestMap = BTreeMap<PathBuf, Sha1Digest>;

/// Errors arising while computing verification codes.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// The root could not be resolved.
    #[error("failed to resolve {}: {source}", .path.display())]
    Root {
        /// The root as supplied by the caller.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The root resolved to something other than a directory.
    #[error("{} is not a directory", .path.display())]
    RootNotDirectory {
        /// The resolved root.
        path: PathBuf,
    },

    /// The walk produced a path that cannot be rendered relative to the root.
    #[error("{} is not beneath the verification root", .path.display())]
    OutsideRoot {
        /// The stray path.
        path: PathBuf,
    },

    /// The tree could not be traversed.
    #[error(transparent)]
    Walk(#[from] WalkError),

    /// A file could not be hashed.
    #[error(transparent)]
    Checksum(#[from] ChecksumError),
}

/// Content digests left out of both verification codes.
///
/// Exclusion is by content: every file whose digest is listed is skipped,
/// whatever its path.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ExcludedDigests(BTreeSet<Sha1Digest>);

impl ExcludedDigests {
    /// An empty exclusion set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a digest; returns `false` if it was already present.
    pub fn insert(&mut self, digest: Sha1Digest) -> bool {
        self.0.insert(digest)
    }

    /// Whether `digest` is excluded.
    #[must_use]
    pub fn contains(&self, digest: &Sha1Digest) -> bool {
        self.0.contains(digest)
    }

    /// Number of excluded digests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing is excluded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Sha1Digest> for ExcludedDigests {
    fn from_iter<I: IntoIterator<Item = Sha1Digest>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Sha1Digest> for ExcludedDigests {
    fn extend<I: IntoIterator<Item = Sha1Digest>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

/// A single file and its content digest.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FileDigest {
    /// Absolute path of the file.
    pub path: PathBuf,
    /// SHA-1 of the file's content.
    pub digest: Sha1Digest,
}

/// Receiver for per-file digests, such as a file-record store.
pub trait FileDigestSink {
    /// Accept one file's digest.
    fn accept(&mut self, file: FileDigest);
}

impl FileDigestSink for Vec<FileDigest> {
    fn accept(&mut self, file: FileDigest) {
        self.push(file);
    }
}

/// The result of [`verification_codes`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VerificationCodes {
    root: PathBuf,
    content_code: Sha1Digest,
    digests: DigestMap,
    path_code: Sha1Digest,
}

impl VerificationCodes {
    /// The canonical root the codes were computed for.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// SHA-1 over the sorted digests of the included files.
    #[must_use]
    pub const fn content_code(&self) -> &Sha1Digest {
        &self.content_code
    }

    /// SHA-1 over the sorted hashes of the included files' relative paths.
    #[must_use]
    pub const fn path_code(&self) -> &Sha1Digest {
        &self.path_code
    }

    /// Digests of every regular file in the tree, excluded ones included.
    #[must_use]
    pub const fn digests(&self) -> &DigestMap {
        &self.digests
    }

    /// Consume the codes, keeping the per-file digests.
    #[must_use]
    pub fn into_digests(self) -> DigestMap {
        self.digests
    }

    /// Feed every file digest to `sink` in path order.
    pub fn publish<S: FileDigestSink + ?Sized>(&self, sink: &mut S) {
        for (path, digest) in &self.digests {
            sink.accept(FileDigest {
                path: path.clone(),
                digest: digest.clone(),
            });
        }
    }
}

/// Compute the content and path verification codes for the tree at `root`.
///
/// Every regular file beneath `root` is hashed, following symbolic links to
/// files that stay inside `root`. Directories, dangling links and links that
/// resolve outside `root` are skipped. Any walk, stat or checksum failure
/// aborts the computation; no partial result is returned.
///
/// # Errors
///
/// Returns [`VerifyError::Root`] or [`VerifyError::RootNotDirectory`] when
/// `root` is unusable, [`VerifyError::Walk`] when traversal fails, and
/// [`VerifyError::Checksum`] when a file cannot be read.
///
/// # Examples
///
/// ```
/// use treecode::verification::{ExcludedDigests, verification_codes};
/// use treecode::walk::WalkOptions;
///
/// let dir = tempfile::tempdir().expect("temp dir");
/// let codes = verification_codes(dir.path(), &ExcludedDigests::new(), &WalkOptions::default())
///     .expect("codes");
/// assert_eq!(codes.content_code().as_str(), "da39a3ee5e6b4b0d3255bfef95601890afd80709");
/// assert_eq!(codes.path_code(), codes.content_code());
/// ```
pub fn verification_codes(
    root: &Path,
    excluded: &ExcludedDigests,
    options: &WalkOptions,
) -> Result<VerificationCodes, VerifyError> {
    let root = fs::canonicalize(root).map_err(|source| VerifyError::Root {
        path: root.to_path_buf(),
        source,
    })?;
    if !root.is_dir() {
        return Err(VerifyError::RootNotDirectory { path: root });
    }

    let mut paths = walk(&root, options).collect::<Result<Vec<_>, _>>()?;
    paths.sort();

    let mut digests = DigestMap::new();
    for path in paths {
        if !is_hashable(&root, &path)? {
            continue;
        }
        let digest = sha1_file(&path)?;
        digests.insert(path, digest);
    }

    let content_code = content_code(digests.values(), excluded);
    let path_code = path_code(&root, &digests, excluded)?;
    debug!(
        "verification codes for {} files under {}: content {content_code}, path {path_code}",
        digests.len(),
        root.display()
    );

    Ok(VerificationCodes {
        root,
        content_code,
        digests,
        path_code,
    })
}

/// Aggregate file digests into a content verification code.
///
/// Excluded digests are dropped, the rest sorted and concatenated, and the
/// concatenation hashed.
///
/// # Examples
///
/// ```
/// use treecode::verification::{ExcludedDigests, content_code};
/// use treecode_common::sha1_bytes;
///
/// let a = sha1_bytes(b"a");
/// let b = sha1_bytes(b"b");
/// assert_eq!(
///     content_code([&a, &b], &ExcludedDigests::new()),
///     content_code([&b, &a], &ExcludedDigests::new()),
/// );
/// ```
pub fn content_code<'a, I>(digests: I, excluded: &ExcludedDigests) -> Sha1Digest
where
    I: IntoIterator<Item = &'a Sha1Digest>,
{
    let mut included: Vec<&str> = digests
        .into_iter()
        .filter(|digest| !excluded.contains(digest))
        .map(Sha1Digest::as_str)
        .collect();
    included.sort_unstable();
    sha1_bytes(included.concat().as_bytes())
}

fn path_code(
    root: &Path,
    digests: &DigestMap,
    excluded: &ExcludedDigests,
) -> Result<Sha1Digest, VerifyError> {
    let mut path_hashes = Vec::with_capacity(digests.len());
    for (path, digest) in digests {
        if excluded.contains(digest) {
            continue;
        }
        let rendered =
            render_relative(root, path).ok_or_else(|| VerifyError::OutsideRoot {
                path: path.clone(),
            })?;
        path_hashes.push(sha1_bytes(rendered.as_bytes()).into_inner());
    }
    path_hashes.sort_unstable();
    Ok(sha1_bytes(path_hashes.concat().as_bytes()))
}

/// Whether `path` resolves to a regular file inside the canonical `root`.
fn is_hashable(root: &Path, path: &Path) -> Result<bool, ChecksumError> {
    let io_err = |source| ChecksumError::Io {
        path: path.to_path_buf(),
        source,
    };
    let target = match fs::canonicalize(path) {
        Ok(target) => target,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("skipping dangling link {}", path.display());
            return Ok(false);
        }
        Err(source) => return Err(io_err(source)),
    };
    if !target.starts_with(root) {
        debug!(
            "skipping {}: it resolves outside the tree to {}",
            path.display(),
            target.display()
        );
        return Ok(false);
    }
    Ok(fs::metadata(&target).map_err(io_err)?.is_file())
}

#[cfg(test)]
#[path = "verification_tests.rs"]
mod tests;
