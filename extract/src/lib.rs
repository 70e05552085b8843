//! Archive handling for treecode.
//!
//! Recognises tar (bare, gzip, bzip2, xz, zstd) and zip archives by content,
//! unpacks them with path traversal protection, and scopes the unpacked tree
//! to a temporary directory that is always removed.
//!
//! # Modules
//!
//! - [`classify`] - Content-sniffing format detection
//! - [`extraction`] - Tar and zip extractors
//! - [`naming`] - Package names derived from archive file names
//! - [`scoped`] - Temporary directory scopes with guaranteed cleanup

pub mod classify;
pub mod extraction;
pub mod naming;
pub mod scoped;

#[cfg(test)]
mod test_utils;

pub use classify::{ArchiveKind, TarCompression, classify};
pub use extraction::{ArchiveExtractor, ExtractionError, TarExtractor, ZipExtractor};
pub use naming::package_friendly_name;
pub use scoped::{ExtractOptions, ExtractedArchive, ScopeError, with_extracted, with_temp_dir};
