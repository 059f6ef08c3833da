//! Depth-first, pre-order traversal driven by a visitor.
//!
//! The visitor decides per node whether to descend, so pruning a subtree that
//! was just moved away is an explicit return value rather than shared state.

use std::io;
use std::path::Path;
use walkdir::WalkDir;

use crate::errors::MergeError;

/// What the walker should do after visiting a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    /// Descend into the node if it is a directory.
    Continue,
    /// Do not visit anything beneath this node.
    SkipSubtree,
    /// End the walk without error.
    Stop,
}

/// Walk `root` (root included, children sorted by name). Symlinks are never
/// followed, not even when `root` itself is one.
///
/// The first visitor error or read error aborts the walk.
pub fn walk_tree<F>(root: &Path, mut visit: F) -> Result<(), MergeError>
where
    F: FnMut(&Path) -> Result<Visit, MergeError>,
{
    let mut it = WalkDir::new(root)
        .follow_links(false)
        .follow_root_links(false)
        .sort_by_file_name()
        .into_iter();

    while let Some(next) = it.next() {
        let entry = next.map_err(walk_error)?;
        match visit(entry.path())? {
            Visit::Continue => {}
            Visit::SkipSubtree => {
                if entry.file_type().is_dir() {
                    it.skip_current_dir();
                }
            }
            Visit::Stop => break,
        }
    }
    Ok(())
}

fn walk_error(e: walkdir::Error) -> MergeError {
    let path = e.path().map(Path::to_path_buf).unwrap_or_default();
    let source = if e.io_error().is_some() {
        e.into_io_error().unwrap_or_else(|| io::Error::other("directory walk failed"))
    } else {
        // Loop detection only happens when following links; surface it anyway.
        io::Error::other(e.to_string())
    };
    MergeError::Io {
        op: "read directory",
        path,
        source,
    }
}
