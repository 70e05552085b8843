//! Archive format detection by content sniffing.
//!
//! A file is a tar archive when its first 512-byte block, after undoing any
//! recognised compression layer, is a tar header with a valid checksum. A
//! file is a zip archive when the zip reader can locate its central
//! directory. File names and extensions are never consulted.

use log::debug;
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Size of a tar header block.
const BLOCK_SIZE: usize = 512;

/// Byte range of the checksum field within a tar header.
const CHECKSUM_FIELD: std::ops::Range<usize> = 148..156;

/// Number of leading bytes inspected for compression magic.
const MAGIC_LEN: usize = 6;

const GZIP_MAGIC: &[u8] = &[0x1f, 0x8b];
const BZIP2_MAGIC: &[u8] = b"BZh";
const XZ_MAGIC: &[u8] = &[0xfd, b'7', b'z', b'X', b'Z', 0x00];
const ZSTD_MAGIC: &[u8] = &[0x28, 0xb5, 0x2f, 0xfd];

/// Compression layer wrapped around a tar stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TarCompression {
    /// A bare tar stream.
    None,
    /// `.tar.gz` / `.tgz`.
    Gzip,
    /// `.tar.bz2`.
    Bzip2,
    /// `.tar.xz`.
    Xz,
    /// `.tar.zst`.
    Zstd,
}

impl TarCompression {
    /// Pick the compression layer announced by a file's leading bytes.
    #[must_use]
    pub fn sniff(magic: &[u8]) -> Self {
        if magic.starts_with(GZIP_MAGIC) {
            Self::Gzip
        } else if magic.starts_with(BZIP2_MAGIC) {
            Self::Bzip2
        } else if magic.starts_with(XZ_MAGIC) {
            Self::Xz
        } else if magic.starts_with(ZSTD_MAGIC) {
            Self::Zstd
        } else {
            Self::None
        }
    }

    /// Open `path` and wrap it in the matching decompressor.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be opened or the decoder
    /// cannot be initialised.
    pub fn reader(self, path: &Path) -> io::Result<Box<dyn Read>> {
        let file = File::open(path)?;
        Ok(match self {
            Self::None => Box::new(file),
            Self::Gzip => Box::new(flate2::read::GzDecoder::new(file)),
            Self::Bzip2 => Box::new(bzip2::read::BzDecoder::new(file)),
            Self::Xz => Box::new(xz2::read::XzDecoder::new(file)),
            Self::Zstd => Box::new(zstd::Decoder::new(file)?),
        })
    }
}

/// Result of classifying a candidate archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveKind {
    /// A tar archive, possibly compressed.
    Tar(TarCompression),
    /// A zip archive.
    Zip,
    /// Neither format matched. This is a normal outcome, not an error.
    Unrecognised,
}

impl fmt::Display for ArchiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tar(TarCompression::None) => f.write_str("tar"),
            Self::Tar(TarCompression::Gzip) => f.write_str("tar+gzip"),
            Self::Tar(TarCompression::Bzip2) => f.write_str("tar+bzip2"),
            Self::Tar(TarCompression::Xz) => f.write_str("tar+xz"),
            Self::Tar(TarCompression::Zstd) => f.write_str("tar+zstd"),
            Self::Zip => f.write_str("zip"),
            Self::Unrecognised => f.write_str("unrecognised"),
        }
    }
}

/// Classify the file at `path` as a tar archive, a zip archive, or neither.
///
/// Tar is tried first, so a file satisfying both checks is reported as tar.
///
/// # Errors
///
/// Returns an I/O error only when `path` cannot be opened or read. Content
/// that fails to decode is classified, not reported.
///
/// # Examples
///
/// ```
/// use treecode_extract::classify::{ArchiveKind, classify};
///
/// let dir = tempfile::tempdir().expect("temp dir");
/// let path = dir.path().join("notes.zip");
/// std::fs::write(&path, b"just some text").expect("write");
/// assert_eq!(classify(&path).expect("readable"), ArchiveKind::Unrecognised);
/// ```
pub fn classify(path: &Path) -> io::Result<ArchiveKind> {
    let mut magic = [0u8; MAGIC_LEN];
    let read = read_prefix(&mut File::open(path)?, &mut magic)?;
    let compression = TarCompression::sniff(magic.get(..read).unwrap_or_default());

    let kind = if leads_with_tar_header(path, compression)? {
        ArchiveKind::Tar(compression)
    } else if zip::ZipArchive::new(File::open(path)?).is_ok() {
        ArchiveKind::Zip
    } else {
        ArchiveKind::Unrecognised
    };
    debug!("classified {} as {kind}", path.display());
    Ok(kind)
}

/// Fill `buf` from `reader`, stopping early at end of input.
fn read_prefix(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while let Some(rest) = buf.get_mut(filled..) {
        if rest.is_empty() {
            break;
        }
        match reader.read(rest) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

fn leads_with_tar_header(path: &Path, compression: TarCompression) -> io::Result<bool> {
    let mut reader = compression.reader(path)?;
    let mut block = [0u8; BLOCK_SIZE];
    if let Err(e) = reader.read_exact(&mut block) {
        debug!("{} has no readable tar header: {e}", path.display());
        return Ok(false);
    }
    if !is_zero_block(&block) {
        return Ok(is_tar_header(&block));
    }
    // A tar with no members is only the end-of-archive marker: two zero blocks.
    Ok(reader.read_exact(&mut block).is_ok() && is_zero_block(&block))
}

fn is_zero_block(block: &[u8; BLOCK_SIZE]) -> bool {
    block.iter().all(|b| *b == 0)
}

/// Check a 512-byte block against the tar header checksum rule.
///
/// The stored checksum is the sum of all header bytes with the checksum field
/// itself counted as spaces. Historic writers summed signed bytes, so either
/// sum is accepted. An all-zero block marks end of archive, not a header.
fn is_tar_header(block: &[u8; BLOCK_SIZE]) -> bool {
    if is_zero_block(block) {
        return false;
    }
    let Some(stored) = block.get(CHECKSUM_FIELD).and_then(parse_octal) else {
        return false;
    };

    let mut unsigned: u64 = 0;
    let mut signed: i64 = 0;
    for (offset, byte) in block.iter().enumerate() {
        let byte = if CHECKSUM_FIELD.contains(&offset) {
            b' '
        } else {
            *byte
        };
        unsigned += u64::from(byte);
        signed += if byte >= 0x80 {
            i64::from(byte) - 0x100
        } else {
            i64::from(byte)
        };
    }
    stored == unsigned || i64::try_from(stored).is_ok_and(|s| s == signed)
}

/// Parse a NUL- or space-terminated octal field.
fn parse_octal(field: &[u8]) -> Option<u64> {
    let text = std::str::from_utf8(field).ok()?;
    let digits = text.trim_matches(|c: char| c == '\0' || c == ' ');
    if digits.is_empty() {
        return None;
    }
    u64::from_str_radix(digits, 8).ok()
}

#[cfg(test)]
#[path = "classify_tests.rs"]
mod tests;
