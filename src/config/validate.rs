//! Pre-merge path validation.
//! Verifies the source is a directory and that the destination is neither the
//! source nor nested inside it. Nothing on disk is modified here.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

use crate::errors::{MergeError, io_err};

/// Paths a merge runs against once validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPaths {
    /// Canonical source root (a root symlink is resolved here, never during the walk).
    pub source: PathBuf,
    /// Destination root as given by the caller; may not exist yet.
    pub destination: PathBuf,
}

pub fn validate_paths(source: &Path, destination: &Path) -> Result<ValidatedPaths, MergeError> {
    let meta = fs::metadata(source).map_err(io_err("stat source", source))?;
    if !meta.is_dir() {
        error!("source is not a directory: {}", source.display());
        return Err(MergeError::SourceNotDirectory {
            path: source.to_path_buf(),
        });
    }

    let src_real = fs::canonicalize(source).map_err(io_err("resolve source", source))?;
    let dst_real = resolve_lenient(destination).map_err(io_err("resolve destination", destination))?;

    if dst_real.starts_with(&src_real) {
        error!(
            "destination '{}' resolves inside source '{}'",
            dst_real.display(),
            src_real.display()
        );
        return Err(MergeError::InvalidPaths {
            source_root: source.to_path_buf(),
            destination_root: destination.to_path_buf(),
        });
    }

    debug!(source = %src_real.display(), destination = %destination.display(), "paths validated");
    Ok(ValidatedPaths {
        source: src_real,
        destination: destination.to_path_buf(),
    })
}

/// Canonicalize the longest existing ancestor and re-append the missing tail.
fn resolve_lenient(path: &Path) -> io::Result<PathBuf> {
    let abs = std::path::absolute(path)?;
    let mut existing = abs.as_path();
    let mut tail: Vec<&std::ffi::OsStr> = Vec::new();
    loop {
        match fs::canonicalize(existing) {
            Ok(mut real) => {
                for part in tail.iter().rev() {
                    real.push(part);
                }
                return Ok(real);
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let (Some(parent), Some(name)) = (existing.parent(), existing.file_name()) else {
                    return Err(e);
                };
                tail.push(name);
                existing = parent;
            }
            Err(e) => return Err(e),
        }
    }
}
