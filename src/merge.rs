//! Tree merge.
//!
//! Walks the source tree top-down and, per node, either merges into an existing
//! destination directory (copying the directory's metadata and descending), or
//! relocates the whole subtree with one rename and prunes it from the walk.
//! Merge-point mode and mtime are applied after the walk, deepest first, so
//! renames into those directories do not disturb them.
//! A non-directory that would land on an existing directory is a conflict.
//!
//! There is no rollback: if a later node fails, nodes already relocated stay
//! in the destination.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, trace};

use crate::config::{Config, CrossDevice, GroupSpec, ValidatedPaths, validate_paths};
use crate::errors::{MergeError, io_err};
use crate::fs_ops::copy::copy_then_remove;
use crate::fs_ops::metadata::{
    GroupFixup, Ownership, fixup_relocated_group, reconcile_ownership, restore_mode_and_mtime,
};
use crate::fs_ops::{EntryKind, FsOps, NodeStat, SystemFs, is_cross_device};
use crate::platform::group_name;
use crate::walk::{Visit, walk_tree};

/// Per-node policy outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeDecision {
    /// The source root itself.
    Skip,
    /// Both sides are real directories: copy metadata, descend, do not move.
    MergeInto,
    /// Destination is a real directory, source is not.
    Conflict,
    /// Move the subtree as a unit and prune it.
    Relocate,
}

impl MergeDecision {
    /// `rel` is the node's path relative to the source root; `dst` is the kind
    /// of the destination counterpart, if one exists.
    pub fn for_entry(rel: &Path, src: EntryKind, dst: Option<EntryKind>) -> Self {
        if rel.as_os_str().is_empty() {
            return MergeDecision::Skip;
        }
        match (src, dst) {
            (EntryKind::Directory, Some(EntryKind::Directory)) => MergeDecision::MergeInto,
            (_, Some(EntryKind::Directory)) => MergeDecision::Conflict,
            _ => MergeDecision::Relocate,
        }
    }
}

/// Counters describing a finished merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Directories merged into pre-existing destination directories.
    pub merged_dirs: usize,
    /// Subtrees moved with a single rename.
    pub relocated: usize,
    /// Subtrees copied across filesystems then removed.
    pub copied_across_devices: usize,
    /// Ownership changes skipped because of EPERM/EACCES.
    pub ownership_denied: usize,
}

/// Merges a source tree into a destination tree.
#[derive(Debug, Clone)]
pub struct TreeMerger<F: FsOps = SystemFs> {
    config: Config,
    ops: F,
}

impl TreeMerger<SystemFs> {
    pub fn new(config: Config) -> Self {
        Self::with_fs(config, SystemFs)
    }
}

impl<F: FsOps> TreeMerger<F> {
    /// Merger running every filesystem primitive through `ops`.
    pub fn with_fs(config: Config, ops: F) -> Self {
        Self { config, ops }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn fs(&self) -> &F {
        &self.ops
    }

    /// Merge `source_root` into `destination_root`, consuming the source.
    ///
    /// The destination root is created if missing. The first error aborts the
    /// merge and leaves the destination partially merged.
    pub fn merge(&self, source_root: &Path, destination_root: &Path) -> Result<MergeReport, MergeError> {
        let paths = validate_paths(source_root, destination_root)?;
        fs::create_dir_all(&paths.destination).map_err(io_err("create destination", &paths.destination))?;

        let privileged_gid = self.resolve_privileged_gid();
        let mut report = MergeReport::default();
        let mut merge_points: Vec<(PathBuf, NodeStat)> = Vec::new();
        walk_tree(&paths.source, |src| {
            self.visit(&paths, src, privileged_gid, &mut report, &mut merge_points)
        })?;

        // Deepest first, after every child has landed.
        for (dst, src_stat) in merge_points.iter().rev() {
            restore_mode_and_mtime(&self.ops, src_stat, dst)?;
        }

        info!(
            source = %source_root.display(),
            dest = %destination_root.display(),
            merged = report.merged_dirs,
            relocated = report.relocated,
            copied = report.copied_across_devices,
            ownership_denied = report.ownership_denied,
            "Merge completed"
        );
        Ok(report)
    }

    fn resolve_privileged_gid(&self) -> Option<u32> {
        let spec = &self.config.privileged_group;
        let gid = spec.resolve();
        match (spec, gid) {
            (GroupSpec::Disabled, _) => debug!("group remapping disabled"),
            (_, None) => debug!(group = %spec, "privileged group not found; group remapping disabled"),
            (_, Some(gid)) => debug!(group = %spec, gid, name = ?group_name(gid), "privileged group resolved"),
        }
        gid
    }

    fn visit(
        &self,
        paths: &ValidatedPaths,
        src: &Path,
        privileged_gid: Option<u32>,
        report: &mut MergeReport,
        merge_points: &mut Vec<(PathBuf, NodeStat)>,
    ) -> Result<Visit, MergeError> {
        let rel = src.strip_prefix(&paths.source).unwrap_or(Path::new(""));
        let dst = if rel.as_os_str().is_empty() {
            paths.destination.clone()
        } else {
            paths.destination.join(rel)
        };

        let src_stat = self.ops.lstat(src).map_err(io_err("stat", src))?;
        let dst_kind = match self.ops.lstat(&dst) {
            Ok(st) => Some(st.kind),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => return Err(io_err("stat", &dst)(e)),
        };

        match MergeDecision::for_entry(rel, src_stat.kind, dst_kind) {
            MergeDecision::Skip => Ok(Visit::Continue),
            MergeDecision::MergeInto => {
                self.trace_entry("merge", src, &dst);
                if reconcile_ownership(&self.ops, &src_stat, &dst, privileged_gid)? == Ownership::Denied {
                    report.ownership_denied += 1;
                }
                merge_points.push((dst, src_stat));
                report.merged_dirs += 1;
                Ok(Visit::Continue)
            }
            MergeDecision::Conflict => Err(MergeError::Conflict { path: dst }),
            MergeDecision::Relocate => {
                self.trace_entry("relocate", src, &dst);
                self.relocate(src, &dst, report)?;
                if fixup_relocated_group(&self.ops, &dst, privileged_gid)? == GroupFixup::Denied {
                    report.ownership_denied += 1;
                }
                Ok(Visit::SkipSubtree)
            }
        }
    }

    fn relocate(&self, src: &Path, dst: &Path, report: &mut MergeReport) -> Result<(), MergeError> {
        match self.ops.rename(src, dst) {
            Ok(()) => {
                report.relocated += 1;
                Ok(())
            }
            Err(e) if is_cross_device(&e) && self.config.cross_device == CrossDevice::Copy => {
                debug!(src = %src.display(), dest = %dst.display(), "rename crossed devices; copying instead");
                copy_then_remove(&self.ops, src, dst)?;
                report.copied_across_devices += 1;
                Ok(())
            }
            Err(e) => Err(io_err("move to destination", dst)(e)),
        }
    }

    fn trace_entry(&self, action: &'static str, src: &Path, dst: &Path) {
        if self.config.verbose {
            info!(action, src = %src.display(), dest = %dst.display(), "merge entry");
        } else {
            trace!(action, src = %src.display(), dest = %dst.display(), "merge entry");
        }
    }
}
