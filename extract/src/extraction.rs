//! Archive extraction with path traversal protection.
//!
//! Tar members are unpacked with `tar::Entry::unpack_in`, zip members are
//! copied out entry by entry. In both cases each member's declared name is
//! recorded unmodified, in archive order, and any member that would land
//! outside the destination directory aborts the extraction.

use crate::classify::TarCompression;
use log::debug;
use std::fs;
use std::io;
use std::path::{Component, Path};

/// Trait for extracting archives into a destination directory.
pub trait ArchiveExtractor {
    /// Extract the archive at `archive_path` into `dest_dir`.
    ///
    /// Returns the member names exactly as declared in the archive.
    ///
    /// # Errors
    ///
    /// Returns [`ExtractionError::PathTraversal`] if any entry attempts to
    /// escape the destination directory,
    /// [`ExtractionError::TooManyEntries`] when the configured limit is
    /// exceeded, and [`ExtractionError::Io`] / [`ExtractionError::Zip`] when
    /// the archive is corrupt or the destination cannot be written.
    fn extract(&self, archive_path: &Path, dest_dir: &Path)
    -> Result<Vec<String>, ExtractionError>;
}

/// Errors arising from archive extraction.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    /// I/O error while reading the archive or writing members.
    #[error("extraction I/O error: {0}")]
    Io(#[from] io::Error),

    /// The zip container is corrupt or uses an unsupported feature.
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// A path in the archive attempts to traverse outside the destination.
    #[error("path traversal detected: {path}")]
    PathTraversal {
        /// The offending path from the archive entry.
        path: String,
    },

    /// The archive holds more members than permitted.
    #[error("archive has more than {limit} entries")]
    TooManyEntries {
        /// The configured member limit.
        limit: usize,
    },
}

/// Extractor for tar archives behind an optional compression layer.
#[derive(Debug, Clone, Copy)]
pub struct TarExtractor {
    compression: TarCompression,
    max_entries: Option<usize>,
}

impl TarExtractor {
    /// Build an extractor for the given compression layer.
    #[must_use]
    pub const fn new(compression: TarCompression, max_entries: Option<usize>) -> Self {
        Self {
            compression,
            max_entries,
        }
    }
}

impl ArchiveExtractor for TarExtractor {
    fn extract(
        &self,
        archive_path: &Path,
        dest_dir: &Path,
    ) -> Result<Vec<String>, ExtractionError> {
        let mut archive = tar::Archive::new(self.compression.reader(archive_path)?);
        archive.set_overwrite(true);
        let mut names = Vec::new();
        let mut directories = Vec::new();

        for entry_result in archive.entries()? {
            let mut entry = entry_result?;
            // Global pax headers carry metadata, not members.
            if entry.header().entry_type().is_pax_global_extensions() {
                continue;
            }
            check_entry_limit(names.len(), self.max_entries)?;

            let declared = String::from_utf8_lossy(&entry.path_bytes()).into_owned();
            let entry_path = entry.path()?.into_owned();
            validate_entry_path(&entry_path)?;
            names.push(declared.clone());

            if entry.header().entry_type().is_dir() {
                directories.push((declared, entry));
            } else if !entry.unpack_in(dest_dir)? {
                return Err(ExtractionError::PathTraversal { path: declared });
            }
        }

        // A directory mode may remove write access, so directories are
        // unpacked after every other member, deepest first.
        directories.sort_by(|(_, a), (_, b)| b.path_bytes().cmp(&a.path_bytes()));
        for (declared, mut directory) in directories {
            if !directory.unpack_in(dest_dir)? {
                return Err(ExtractionError::PathTraversal { path: declared });
            }
        }

        debug!(
            "unpacked {} tar entries from {}",
            names.len(),
            archive_path.display()
        );
        Ok(names)
    }
}

/// Extractor for zip archives.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipExtractor {
    max_entries: Option<usize>,
}

impl ZipExtractor {
    /// Build a zip extractor with an optional member limit.
    #[must_use]
    pub const fn new(max_entries: Option<usize>) -> Self {
        Self { max_entries }
    }
}

impl ArchiveExtractor for ZipExtractor {
    fn extract(
        &self,
        archive_path: &Path,
        dest_dir: &Path,
    ) -> Result<Vec<String>, ExtractionError> {
        let mut archive = zip::ZipArchive::new(fs::File::open(archive_path)?)?;
        if let Some(limit) = self.max_entries.filter(|limit| archive.len() > *limit) {
            return Err(ExtractionError::TooManyEntries { limit });
        }
        let mut names = Vec::with_capacity(archive.len());

        for index in 0..archive.len() {
            let mut member = archive.by_index(index)?;
            let declared = member.name().to_owned();
            let Some(relative) = member.enclosed_name() else {
                return Err(ExtractionError::PathTraversal { path: declared });
            };
            validate_entry_path(&relative)?;

            let dest_path = dest_dir.join(&relative);
            if member.is_dir() {
                fs::create_dir_all(&dest_path)?;
            } else {
                if let Some(parent) = dest_path.parent() {
                    fs::create_dir_all(parent)?;
                }
                let mut out = fs::File::create(&dest_path)?;
                io::copy(&mut member, &mut out)?;
            }
            names.push(declared);
        }

        debug!(
            "unpacked {} zip entries from {}",
            names.len(),
            archive_path.display()
        );
        Ok(names)
    }
}

fn check_entry_limit(seen: usize, limit: Option<usize>) -> Result<(), ExtractionError> {
    match limit {
        Some(limit) if seen >= limit => Err(ExtractionError::TooManyEntries { limit }),
        _ => Ok(()),
    }
}

/// Validate that an entry path does not escape the destination directory
/// via `..` components or absolute paths.
fn validate_entry_path(path: &Path) -> Result<(), ExtractionError> {
    let escapes = path.is_absolute()
        || path.components().any(|component| {
            matches!(
                component,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
    if escapes {
        return Err(ExtractionError::PathTraversal {
            path: path.display().to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
#[path = "extraction_tests.rs"]
mod tests;
