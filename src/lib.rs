//! Core library for `dirmerge`.
//!
//! Merges a staged source directory tree into a destination directory the way
//! `cp -pR` followed by removing the source would, but with renames: existing
//! destination directories are merged into (their metadata refreshed from the
//! source), everything else is moved over as a unit.
//!
//! ```no_run
//! use dirmerge::{Config, TreeMerger};
//! use std::path::Path;
//!
//! let report = TreeMerger::new(Config::default())
//!     .merge(Path::new("/tmp/staging/pkg"), Path::new("/opt/pkg"))?;
//! println!("relocated {} entries", report.relocated);
//! # Ok::<(), dirmerge::MergeError>(())
//! ```

#[cfg(not(unix))]
compile_error!("dirmerge preserves Unix ownership and only builds for Unix targets");

pub mod config;
pub mod errors;
pub mod fs_ops;
pub mod merge;
pub mod platform;
pub mod strategy;
pub mod walk;

pub use config::{Config, CrossDevice, GroupSpec, LogLevel};
pub use errors::{ErrorKind, MergeError};
pub use fs_ops::{EntryKind, FsOps, NodeStat, SystemFs};
pub use merge::{MergeDecision, MergeReport, TreeMerger};
pub use strategy::DirectoryStrategy;
pub use walk::{Visit, walk_tree};

/// Merge `source` into `destination` with `config`, using the real filesystem.
pub fn merge(source: &std::path::Path, destination: &std::path::Path, config: &Config) -> Result<MergeReport, MergeError> {
    TreeMerger::new(config.clone()).merge(source, destination)
}

/// Whether the directory strategy applies to `path`.
pub fn can_extract(path: &std::path::Path) -> bool {
    DirectoryStrategy::can_extract(path)
}
