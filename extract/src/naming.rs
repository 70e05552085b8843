//! Package names derived from archive file names.

use std::ffi::OsStr;
use std::path::Path;

/// Return the name of a package archive without its extension.
///
/// One extension is removed, plus a trailing `.tar` left behind by compound
/// extensions such as `.tar.gz`.
///
/// # Examples
///
/// ```
/// use treecode_extract::naming::package_friendly_name;
///
/// assert_eq!(package_friendly_name("zlib-1.3.1.tar.xz"), "zlib-1.3.1");
/// assert_eq!(package_friendly_name("bundle.zip"), "bundle");
/// ```
#[must_use]
pub fn package_friendly_name(file_name: &str) -> String {
    let stem = file_stem(file_name);
    let has_tar_suffix = Path::new(stem)
        .extension()
        .is_some_and(|ext| ext == "tar");
    if has_tar_suffix {
        file_stem(stem).to_owned()
    } else {
        stem.to_owned()
    }
}

fn file_stem(name: &str) -> &str {
    Path::new(name)
        .file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or(name)
}
