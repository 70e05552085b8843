//! SPDX file types guessed from a libmagic-style description.
//!
//! The description itself is produced elsewhere, behind [`DescribeFile`];
//! this module only interprets it.

use std::fmt;
use std::io;
use std::path::Path;

/// SPDX file type of a package member.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SpdxFileType {
    /// Human-written source, scripts, and markup.
    Source,
    /// Compiled objects, executables, and static libraries.
    Binary,
    /// Any other archive or compressed container.
    Archive,
    /// Everything else.
    Other,
}

impl SpdxFileType {
    /// Interpret a file description such as `"ASCII C program text"`.
    ///
    /// Source is checked first, then binary, then archive.
    ///
    /// # Examples
    ///
    /// ```
    /// use treecode::filetype::SpdxFileType;
    ///
    /// assert_eq!(
    ///     SpdxFileType::from_description("POSIX shell script, ASCII text executable"),
    ///     SpdxFileType::Source,
    /// );
    /// assert_eq!(
    ///     SpdxFileType::from_description("current ar archive"),
    ///     SpdxFileType::Binary,
    /// );
    /// ```
    #[must_use]
    pub fn from_description(description: &str) -> Self {
        if is_source(description) {
            Self::Source
        } else if is_binary(description) {
            Self::Binary
        } else if description.contains("archive") {
            Self::Archive
        } else {
            Self::Other
        }
    }

    /// The SPDX spelling of the type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Source => "SOURCE",
            Self::Binary => "BINARY",
            Self::Archive => "ARCHIVE",
            Self::Other => "OTHER",
        }
    }
}

impl fmt::Display for SpdxFileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Produces a textual description of a file's content.
#[cfg_attr(test, mockall::automock)]
pub trait DescribeFile {
    /// Describe the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error when the file cannot be inspected.
    fn describe(&self, path: &Path) -> io::Result<String>;
}

/// Classify the file at `path` using `probe` for its description.
///
/// # Errors
///
/// Propagates the probe's I/O error.
pub fn classify_file<P>(probe: &P, path: &Path) -> io::Result<SpdxFileType>
where
    P: DescribeFile + ?Sized,
{
    probe
        .describe(path)
        .map(|description| SpdxFileType::from_description(&description))
}

fn is_source(description: &str) -> bool {
    let has = |needle: &str| description.contains(needle);
    let text = has(" text");
    (has(" source") && text)
        || (has(" script") && text)
        || (has(" program") && text)
        || has(" shell script")
        || has(" text executable")
        || (has("HTML") && has("text"))
        || (has("XML") && has("text"))
}

fn is_binary(description: &str) -> bool {
    [
        " executable",
        " relocatable",
        " shared object",
        " dynamically linked",
        " ar archive",
    ]
    .iter()
    .any(|needle| description.contains(needle))
}
