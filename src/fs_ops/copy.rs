//! Cross-device relocation: copy a subtree, then remove the original.
//!
//! Used only when `rename` reports EXDEV and the config allows copying. Regular
//! files are copied byte-for-byte, directories recreated and symlinks recreated
//! with the same target. Mode and mtime are preserved; ownership is preserved
//! best-effort. Directory mode/mtime are applied after their children exist so
//! read-only directories can still be populated.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::helpers::is_privilege_denied;
use super::{EntryKind, FsOps, NodeStat};
use crate::errors::{MergeError, io_err};
use crate::walk::{Visit, walk_tree};

/// Copy `src` (any kind) to `dst`, then delete `src`. Returns the number of nodes copied.
pub fn copy_then_remove<F: FsOps + ?Sized>(ops: &F, src: &Path, dst: &Path) -> Result<usize, MergeError> {
    let root = ops.lstat(src).map_err(io_err("stat", src))?;
    prepare_destination(&root, dst)?;

    let mut dirs: Vec<(PathBuf, NodeStat)> = Vec::new();
    let mut copied = 0usize;
    walk_tree(src, |path| {
        let rel = path.strip_prefix(src).unwrap_or(Path::new(""));
        let target = if rel.as_os_str().is_empty() {
            dst.to_path_buf()
        } else {
            dst.join(rel)
        };
        let st = ops.lstat(path).map_err(io_err("stat", path))?;
        copy_node(ops, path, &target, &st)?;
        copied += 1;
        if st.is_plain_dir() {
            dirs.push((target, st));
        }
        Ok(Visit::Continue)
    })?;

    // Deepest first so a parent's mtime is not bumped by later child updates.
    for (dir, st) in dirs.iter().rev() {
        ops.set_mode(dir, st.mode).map_err(io_err("set mode", dir))?;
        ops.set_mtime(dir, st.mtime).map_err(io_err("set mtime", dir))?;
    }

    if root.is_plain_dir() {
        fs::remove_dir_all(src).map_err(io_err("remove source directory", src))?;
    } else {
        fs::remove_file(src).map_err(io_err("remove source", src))?;
    }
    info!(src = %src.display(), dest = %dst.display(), nodes = copied, "Copied across devices and removed source");
    Ok(copied)
}

/// Mirror what `rename` would do with an existing non-directory destination.
fn prepare_destination(root: &NodeStat, dst: &Path) -> Result<(), MergeError> {
    match fs::symlink_metadata(dst) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(io_err("stat", dst)(e)),
        Ok(_) if root.is_plain_dir() => Err(io_err("copy directory onto", dst)(io::Error::from_raw_os_error(libc::ENOTDIR))),
        Ok(_) => fs::remove_file(dst).map_err(io_err("replace existing", dst)),
    }
}

fn copy_node<F: FsOps + ?Sized>(ops: &F, src: &Path, dst: &Path, st: &NodeStat) -> Result<(), MergeError> {
    match st.kind {
        EntryKind::Directory => {
            fs::create_dir(dst).map_err(io_err("create directory", dst))?;
            copy_ownership(ops, dst, st)
        }
        EntryKind::RegularFile => {
            fs::copy(src, dst).map_err(io_err("copy file", dst))?;
            // chown clears setuid/setgid on files, so the mode goes on after it.
            copy_ownership(ops, dst, st)?;
            ops.set_mode(dst, st.mode).map_err(io_err("set mode", dst))?;
            ops.set_mtime(dst, st.mtime).map_err(io_err("set mtime", dst))
        }
        EntryKind::Symlink => {
            let target = fs::read_link(src).map_err(io_err("read link", src))?;
            std::os::unix::fs::symlink(&target, dst).map_err(io_err("create symlink", dst))?;
            copy_ownership(ops, dst, st)?;
            filetime::set_symlink_file_times(dst, st.mtime, st.mtime).map_err(io_err("set mtime", dst))
        }
        EntryKind::Other => Err(io_err("copy special file", src)(io::Error::new(
            io::ErrorKind::Unsupported,
            "fifos, sockets and device nodes cannot be copied",
        ))),
    }
}

/// Best-effort: EPERM/EACCES leaves the copy owned by the caller.
fn copy_ownership<F: FsOps + ?Sized>(ops: &F, dst: &Path, st: &NodeStat) -> Result<(), MergeError> {
    match ops.lchown(dst, Some(st.uid), Some(st.gid)) {
        Ok(()) => Ok(()),
        Err(e) if is_privilege_denied(&e) => {
            debug!(path = %dst.display(), error = %e, "ownership not preserved on copy");
            Ok(())
        }
        Err(e) => Err(io_err("change ownership", dst)(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs_ops::SystemFs;
    use filetime::FileTime;
    use std::os::unix::fs::symlink;
    use tempfile::tempdir;

    #[test]
    fn copies_tree_and_removes_source() {
        let td = tempdir().unwrap();
        let src = td.path().join("src");
        let dst = td.path().join("dst");
        fs::create_dir_all(src.join("sub")).unwrap();
        fs::write(src.join("sub/f.txt"), "hello").unwrap();
        symlink("sub/f.txt", src.join("link")).unwrap();
        SystemFs.set_mode(&src.join("sub"), 0o750).unwrap();
        let past = FileTime::from_unix_time(1_400_000_000, 0);
        filetime::set_file_mtime(src.join("sub/f.txt"), past).unwrap();

        let n = copy_then_remove(&SystemFs, &src, &dst).unwrap();
        assert_eq!(n, 4);
        assert!(!src.exists());
        assert_eq!(fs::read_to_string(dst.join("sub/f.txt")).unwrap(), "hello");
        assert_eq!(fs::read_link(dst.join("link")).unwrap(), PathBuf::from("sub/f.txt"));
        assert_eq!(SystemFs.lstat(&dst.join("sub")).unwrap().mode, 0o750);
        assert_eq!(SystemFs.lstat(&dst.join("sub/f.txt")).unwrap().mtime, past);
    }

    #[test]
    fn file_replaces_existing_file() {
        let td = tempdir().unwrap();
        let src = td.path().join("a");
        let dst = td.path().join("b");
        fs::write(&src, "new").unwrap();
        fs::write(&dst, "old").unwrap();
        copy_then_remove(&SystemFs, &src, &dst).unwrap();
        assert_eq!(fs::read_to_string(&dst).unwrap(), "new");
        assert!(!src.exists());
    }

    #[test]
    fn directory_onto_file_is_enotdir() {
        let td = tempdir().unwrap();
        let src = td.path().join("d");
        let dst = td.path().join("f");
        fs::create_dir(&src).unwrap();
        fs::write(&dst, "x").unwrap();
        let err = copy_then_remove(&SystemFs, &src, &dst).unwrap_err();
        assert_eq!(err.io_error().and_then(io::Error::raw_os_error), Some(libc::ENOTDIR));
        assert!(src.exists());
    }
}
