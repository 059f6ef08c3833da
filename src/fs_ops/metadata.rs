//! Metadata preservation.
//! - Merge points: copy owner/group (best-effort), then mode and mtime, from the source directory.
//! - Relocated subtrees: re-group nodes that arrived owned by the privileged group.
//!
//! Ownership changes tolerate EPERM/EACCES the way `cp -p` does; mode and mtime
//! changes do not.

use std::io;
use std::path::Path;
use tracing::{debug, trace};

use super::helpers::is_privilege_denied;
use super::{FsOps, NodeStat};
use crate::errors::{MergeError, io_err};
use crate::walk::{Visit, walk_tree};

/// Whether the ownership part of a metadata copy took effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    Applied,
    /// Swallowed EPERM/EACCES; the node keeps its previous owner/group.
    Denied,
}

/// Result of the post-relocation group fixup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupFixup {
    /// Moved root was not owned by the privileged group (or remapping is disabled).
    NotNeeded,
    /// Number of nodes re-grouped.
    Applied(usize),
    /// Swallowed EPERM/EACCES part-way; remaining nodes were left as they were.
    Denied,
}

/// Copy `src`'s owner and group onto the existing directory `dst`.
pub fn reconcile_ownership<F: FsOps + ?Sized>(
    ops: &F,
    src: &NodeStat,
    dst: &Path,
    privileged_gid: Option<u32>,
) -> Result<Ownership, MergeError> {
    match copy_ownership(ops, src, dst, privileged_gid) {
        Ok(()) => Ok(Ownership::Applied),
        Err(e) if is_privilege_denied(&e) => {
            debug!(path = %dst.display(), error = %e, "ownership change denied; keeping existing owner");
            Ok(Ownership::Denied)
        }
        Err(e) => Err(io_err("change ownership", dst)(e)),
    }
}

/// Copy `src`'s permission bits and mtime onto `dst`.
///
/// For merge points this runs once nothing else will be moved into `dst`:
/// every rename into a directory bumps its mtime, and a read-only mode would
/// block the renames.
pub fn restore_mode_and_mtime<F: FsOps + ?Sized>(ops: &F, src: &NodeStat, dst: &Path) -> Result<(), MergeError> {
    ops.set_mode(dst, src.mode).map_err(io_err("set mode", dst))?;
    ops.set_mtime(dst, src.mtime).map_err(io_err("set mtime", dst))?;
    trace!(path = %dst.display(), mode = format!("{:o}", src.mode), "copied directory mode and mtime");
    Ok(())
}

/// Group first, then user; the first failure ends the step.
fn copy_ownership<F: FsOps + ?Sized>(
    ops: &F,
    src: &NodeStat,
    dst: &Path,
    privileged_gid: Option<u32>,
) -> io::Result<()> {
    let gid = if privileged_gid == Some(src.gid) {
        parent_gid(ops, dst)?
    } else {
        src.gid
    };
    ops.chown(dst, None, Some(gid))?;
    ops.chown(dst, Some(src.uid), None)
}

/// After relocating to `dst`: if it landed owned by the privileged group, hand the
/// whole subtree to the group of `dst`'s parent.
pub fn fixup_relocated_group<F: FsOps + ?Sized>(
    ops: &F,
    dst: &Path,
    privileged_gid: Option<u32>,
) -> Result<GroupFixup, MergeError> {
    let Some(privileged) = privileged_gid else {
        return Ok(GroupFixup::NotNeeded);
    };

    let root = match ops.lstat(dst) {
        Ok(st) => st,
        Err(e) if is_privilege_denied(&e) => return Ok(GroupFixup::Denied),
        Err(e) => return Err(io_err("stat", dst)(e)),
    };
    if root.gid != privileged {
        return Ok(GroupFixup::NotNeeded);
    }

    let target_gid = match parent_gid(ops, dst) {
        Ok(gid) => gid,
        Err(e) if is_privilege_denied(&e) => return Ok(GroupFixup::Denied),
        Err(e) => return Err(io_err("stat parent of", dst)(e)),
    };

    let mut changed = 0usize;
    let mut denied = false;
    let walked = walk_tree(dst, |path| match ops.lchown(path, None, Some(target_gid)) {
        Ok(()) => {
            changed += 1;
            Ok(Visit::Continue)
        }
        Err(e) if is_privilege_denied(&e) => {
            debug!(path = %path.display(), error = %e, "group change denied; leaving subtree group as-is");
            denied = true;
            Ok(Visit::Stop)
        }
        Err(e) => Err(io_err("change group", path)(e)),
    });
    match walked {
        Ok(()) => {}
        // An unreadable directory inside the moved subtree counts as a denial too.
        Err(e) if e.io_error().is_some_and(is_privilege_denied) => {
            debug!(path = %e.path().display(), error = %e, "subtree not readable; leaving its group as-is");
            return Ok(GroupFixup::Denied);
        }
        Err(e) => return Err(e),
    }

    if denied {
        return Ok(GroupFixup::Denied);
    }
    trace!(path = %dst.display(), gid = target_gid, nodes = changed, "re-grouped relocated subtree");
    Ok(GroupFixup::Applied(changed))
}

fn parent_gid<F: FsOps + ?Sized>(ops: &F, path: &Path) -> io::Result<u32> {
    let parent = path
        .parent()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no parent"))?;
    ops.lstat(parent).map(|st| st.gid)
}
