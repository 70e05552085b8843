//! Scoped extraction into self-cleaning temporary directories.
//!
//! [`with_extracted`] creates a private temporary directory, unpacks an
//! archive into it, hands the result to a caller-supplied body, and removes
//! the directory on every exit path. The body's own error always takes
//! precedence over a failure to remove the directory; a cleanup failure only
//! surfaces when nothing else went wrong. If the body panics, a drop guard
//! removes the directory during unwinding.

use crate::classify::{ArchiveKind, classify};
use crate::extraction::{ArchiveExtractor, ExtractionError, TarExtractor, ZipExtractor};
use log::{debug, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use thiserror::Error;

/// Default prefix for extraction directories.
pub const DEFAULT_TEMP_PREFIX: &str = "treecode-";

/// Settings for temporary directory creation and extraction limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Prefix for temporary directory names.
    pub temp_prefix: String,
    /// Parent for temporary directories; the OS temp dir when `None`.
    pub temp_root: Option<PathBuf>,
    /// Upper bound on archive members; unbounded when `None`.
    pub max_entries: Option<usize>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            temp_prefix: DEFAULT_TEMP_PREFIX.to_owned(),
            temp_root: None,
            max_entries: None,
        }
    }
}

/// An archive unpacked into a scoped temporary directory.
///
/// Only valid inside the body passed to [`with_extracted`]; the directory it
/// names is deleted as soon as the body returns.
#[derive(Debug)]
pub struct ExtractedArchive {
    root: PathBuf,
    entries: Vec<String>,
    kind: ArchiveKind,
}

impl ExtractedArchive {
    /// Directory holding the extracted members.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Member names as declared inside the archive, in archive order.
    ///
    /// These are reported as-is and may not match the extracted tree one to
    /// one when the archive is unusual (duplicate names, link members).
    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// The detected archive format.
    #[must_use]
    pub const fn kind(&self) -> ArchiveKind {
        self.kind
    }
}

/// Errors arising from a scoped extraction.
#[derive(Debug, Error)]
pub enum ScopeError {
    /// The temporary directory could not be created.
    #[error("failed to create temporary directory: {source}")]
    TempDir {
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The archive could not be opened for classification.
    #[error("failed to read {}: {source}", .archive.display())]
    Classify {
        /// The archive path.
        archive: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The file is neither a tar nor a zip archive.
    #[error("{} is not an archive file", .archive.display())]
    UnsupportedFormat {
        /// The rejected path.
        archive: PathBuf,
    },

    /// The archive is recognised but could not be extracted.
    #[error("failed to extract {}: {source}", .archive.display())]
    Extraction {
        /// The archive path.
        archive: PathBuf,
        /// What went wrong while unpacking.
        #[source]
        source: ExtractionError,
    },

    /// The temporary directory could not be removed.
    #[error("failed to remove temporary directory {}: {source}", .path.display())]
    Cleanup {
        /// The directory that was left behind.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Run `body` with a fresh temporary directory, removing it afterwards.
///
/// # Errors
///
/// Returns [`ScopeError::TempDir`] if the directory cannot be created, the
/// body's error if it fails, or [`ScopeError::Cleanup`] if the body
/// succeeded but the directory could not be removed.
///
/// # Examples
///
/// ```
/// use treecode_extract::scoped::{ExtractOptions, ScopeError, with_temp_dir};
///
/// let kept = with_temp_dir(&ExtractOptions::default(), |dir| {
///     Ok::<_, ScopeError>(dir.to_path_buf())
/// })
/// .expect("scope succeeds");
/// assert!(!kept.exists());
/// ```
pub fn with_temp_dir<T, E, F>(options: &ExtractOptions, body: F) -> Result<T, E>
where
    F: FnOnce(&Path) -> Result<T, E>,
    E: From<ScopeError>,
{
    let dir = create_temp_dir(options).map_err(E::from)?;
    let outcome = body(dir.path());
    settle(outcome, dir.remove())
}

/// Extract `archive` into a scoped temporary directory and run `body` on it.
///
/// The archive is classified by content. The temporary directory is removed
/// whether extraction fails, the body fails, or the body succeeds.
///
/// # Errors
///
/// Returns [`ScopeError::UnsupportedFormat`] for files that are neither tar
/// nor zip, [`ScopeError::Extraction`] for corrupt archives or members that
/// would escape the directory, the body's own error, or
/// [`ScopeError::Cleanup`] as described on [`with_temp_dir`].
pub fn with_extracted<T, E, F>(archive: &Path, options: &ExtractOptions, body: F) -> Result<T, E>
where
    F: FnOnce(&ExtractedArchive) -> Result<T, E>,
    E: From<ScopeError>,
{
    with_temp_dir(options, |root| {
        let extracted = extract_into(archive, root, options).map_err(E::from)?;
        body(&extracted)
    })
}

/// Owns a temporary directory until it is removed, by hand or on drop.
struct ScratchDir {
    path: PathBuf,
    dir: Option<TempDir>,
}

impl ScratchDir {
    fn path(&self) -> &Path {
        &self.path
    }

    fn remove(mut self) -> Result<(), ScopeError> {
        self.dir.take().map_or(Ok(()), remove_temp_dir)
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if let Err(e) = self.dir.take().map_or(Ok(()), remove_temp_dir) {
            warn!("{e}");
        }
    }
}

fn create_temp_dir(options: &ExtractOptions) -> Result<ScratchDir, ScopeError> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(&options.temp_prefix);
    let created = match &options.temp_root {
        Some(parent) => builder.tempdir_in(parent),
        None => builder.tempdir(),
    };
    let dir = created.map_err(|source| ScopeError::TempDir { source })?;
    debug!("created temporary directory {}", dir.path().display());
    Ok(ScratchDir {
        path: dir.path().to_path_buf(),
        dir: Some(dir),
    })
}

fn extract_into(
    archive: &Path,
    root: &Path,
    options: &ExtractOptions,
) -> Result<ExtractedArchive, ScopeError> {
    let kind = classify(archive).map_err(|source| ScopeError::Classify {
        archive: archive.to_path_buf(),
        source,
    })?;
    let extractor: Box<dyn ArchiveExtractor> = match kind {
        ArchiveKind::Tar(compression) => {
            Box::new(TarExtractor::new(compression, options.max_entries))
        }
        ArchiveKind::Zip => Box::new(ZipExtractor::new(options.max_entries)),
        ArchiveKind::Unrecognised => {
            return Err(ScopeError::UnsupportedFormat {
                archive: archive.to_path_buf(),
            });
        }
    };
    let entries = extractor
        .extract(archive, root)
        .map_err(|source| ScopeError::Extraction {
            archive: archive.to_path_buf(),
            source,
        })?;
    debug!(
        "extracted {} entries from {} into {}",
        entries.len(),
        archive.display(),
        root.display()
    );
    Ok(ExtractedArchive {
        root: root.to_path_buf(),
        entries,
        kind,
    })
}

/// Remove the directory, treating an already-missing directory as success.
fn remove_temp_dir(dir: TempDir) -> Result<(), ScopeError> {
    let path = dir.path().to_path_buf();
    // Archives may carry read-only directories; their children cannot be
    // unlinked until the owner can write to them again.
    match make_owner_writable(&path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => {
            debug!("could not restore write access under {}: {e}", path.display());
        }
        _ => {}
    }
    match dir.close() {
        Ok(()) => {
            debug!("removed temporary directory {}", path.display());
            Ok(())
        }
        Err(source) if source.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(ScopeError::Cleanup { path, source }),
    }
}

#[cfg(unix)]
fn make_owner_writable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = fs::symlink_metadata(path)?;
    if !metadata.is_dir() {
        return Ok(());
    }
    let mut permissions = metadata.permissions();
    if permissions.mode() & 0o700 != 0o700 {
        permissions.set_mode(permissions.mode() | 0o700);
        fs::set_permissions(path, permissions)?;
    }
    for entry in fs::read_dir(path)? {
        make_owner_writable(&entry?.path())?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn make_owner_writable(path: &Path) -> io::Result<()> {
    fs::symlink_metadata(path).map(drop)
}

/// Combine the body's outcome with the cleanup result.
fn settle<T, E>(outcome: Result<T, E>, cleanup: Result<(), ScopeError>) -> Result<T, E>
where
    E: From<ScopeError>,
{
    match (outcome, cleanup) {
        (outcome, Ok(())) => outcome,
        (Ok(_), Err(cleanup_err)) => Err(E::from(cleanup_err)),
        (Err(primary), Err(cleanup_err)) => {
            warn!("{cleanup_err}; reporting the earlier failure instead");
            Err(primary)
        }
    }
}

#[cfg(test)]
#[path = "scoped_tests.rs"]
mod tests;
