//! Restartable traversal of an unpacked package tree.
//!
//! Every call to [`walk`] starts a fresh [`walkdir::WalkDir`], so no state
//! survives between traversals. Entries within a directory come out sorted by
//! file name; callers that need a total order still sort the full paths.

use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

/// Traversal settings.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct WalkOptions {
    /// Descend through symbolic links to directories.
    ///
    /// Off by default so that cyclic trees terminate. When enabled, a link
    /// cycle is reported as a [`WalkError`].
    pub follow_links: bool,
    /// Maximum depth below the root; unbounded when `None`.
    pub max_depth: Option<usize>,
}

/// A directory entry could not be read during traversal.
#[derive(Debug, Error)]
#[error("failed to walk {}: {source}", .path.display())]
pub struct WalkError {
    path: PathBuf,
    #[source]
    source: walkdir::Error,
}

impl WalkError {
    /// The path being visited when the failure occurred.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the failure is a symbolic link loop.
    #[must_use]
    pub fn is_loop(&self) -> bool {
        self.source.loop_ancestor().is_some()
    }
}

/// Yield every file and directory beneath `root`, excluding `root` itself.
///
/// # Examples
///
/// ```
/// use treecode::walk::{WalkOptions, walk};
///
/// let dir = tempfile::tempdir().expect("temp dir");
/// std::fs::create_dir(dir.path().join("src")).expect("mkdir");
/// std::fs::write(dir.path().join("src/lib.c"), b"int x;").expect("write");
///
/// let found: Vec<_> = walk(dir.path(), &WalkOptions::default())
///     .collect::<Result<_, _>>()
///     .expect("walk succeeds");
/// assert_eq!(found, vec![dir.path().join("src"), dir.path().join("src/lib.c")]);
/// ```
pub fn walk(
    root: &Path,
    options: &WalkOptions,
) -> impl Iterator<Item = Result<PathBuf, WalkError>> + use<> {
    let root = root.to_path_buf();
    let mut walker = WalkDir::new(&root)
        .min_depth(1)
        .follow_links(options.follow_links)
        .sort_by_file_name();
    if let Some(depth) = options.max_depth {
        walker = walker.max_depth(depth);
    }

    walker.into_iter().map(move |entry| {
        entry.map(walkdir::DirEntry::into_path).map_err(|source| {
            let path = source.path().map_or_else(|| root.clone(), Path::to_path_buf);
            WalkError { path, source }
        })
    })
}
