//! OS-neutral rendering of paths relative to a tree root.
//!
//! Renderings always start with `./` and join components with `/`, whatever
//! the host separator, so path hashes agree across platforms.

use std::path::{Component, Path};

/// Prefix placed before every rendered relative path.
pub const CURRENT_DIR_PREFIX: &str = ".";

/// Render `path` relative to `root` as `./a/b`.
///
/// Returns `None` when `path` does not live under `root`. Components that are
/// not valid UTF-8 are rendered lossily.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use treecode_common::relative::render_relative;
///
/// let rendered = render_relative(Path::new("/pkg"), Path::new("/pkg/src/lib.c"));
/// assert_eq!(rendered.as_deref(), Some("./src/lib.c"));
/// ```
#[must_use]
pub fn render_relative(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let mut rendered = String::from(CURRENT_DIR_PREFIX);
    for component in relative.components() {
        match component {
            Component::Normal(part) => {
                rendered.push('/');
                rendered.push_str(&part.to_string_lossy());
            }
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(rendered)
}
