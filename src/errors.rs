//! Typed error definitions for dirmerge.
//! Callers match on `ErrorKind` instead of downcasting.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::fs_ops::helpers::{hint_for, is_privilege_denied};

/// Coarse classification of a failed merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Destination already holds an incompatible node.
    Conflict,
    /// EPERM/EACCES from a primitive that is not allowed to fail.
    Permission,
    /// Everything else.
    OtherIo,
}

#[derive(Debug, Error)]
pub enum MergeError {
    /// Same wording `cp` uses when a non-directory would replace a directory.
    #[error("{}: Is a directory", .path.display())]
    Conflict { path: PathBuf },

    #[error("{op} '{}': {source}{}", .path.display(), hint_for(.source))]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Source is not a directory: {}", .path.display())]
    SourceNotDirectory { path: PathBuf },

    #[error(
        "Destination '{}' must not be the source or lie inside it ('{}')",
        .destination_root.display(),
        .source_root.display()
    )]
    InvalidPaths {
        source_root: PathBuf,
        destination_root: PathBuf,
    },
}

impl MergeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MergeError::Conflict { .. } => ErrorKind::Conflict,
            MergeError::Io { source, .. } if is_privilege_denied(source) => ErrorKind::Permission,
            _ => ErrorKind::OtherIo,
        }
    }

    /// The untouched OS error, when the failure came from a primitive.
    pub fn io_error(&self) -> Option<&io::Error> {
        match self {
            MergeError::Io { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Path the failure is attributed to.
    pub fn path(&self) -> &Path {
        match self {
            MergeError::Conflict { path }
            | MergeError::Io { path, .. }
            | MergeError::SourceNotDirectory { path } => path,
            MergeError::InvalidPaths {
                destination_root, ..
            } => destination_root,
        }
    }

    /// Stable numeric code for structured logs.
    pub fn code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Conflict => 17,
            ErrorKind::Permission => 13,
            ErrorKind::OtherIo => 5,
        }
    }
}

/// Adapter for `.map_err(...)`: attach the failing operation and path.
pub(crate) fn io_err<'a>(op: &'static str, path: &'a Path) -> impl FnOnce(io::Error) -> MergeError + 'a {
    move |source| MergeError::Io {
        op,
        path: path.to_path_buf(),
        source,
    }
}
