//! Directory unpack strategy.
//! A plain directory "extracts" by merging it into the unpack directory.

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::errors::MergeError;
use crate::merge::{MergeReport, TreeMerger};

/// Strategy for inputs that are already directories.
#[derive(Debug, Clone)]
pub struct DirectoryStrategy {
    path: PathBuf,
}

impl DirectoryStrategy {
    /// File extensions this strategy claims (none: it matches on type, not name).
    pub fn extensions() -> &'static [&'static str] {
        &[]
    }

    /// True when `path` is a directory (following symlinks).
    pub fn can_extract(path: &Path) -> bool {
        path.is_dir()
    }

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Merge this directory into `unpack_dir`, consuming it.
    pub fn extract(&self, unpack_dir: &Path, config: &Config) -> Result<MergeReport, MergeError> {
        TreeMerger::new(config.clone()).merge(&self.path, unpack_dir)
    }
}
