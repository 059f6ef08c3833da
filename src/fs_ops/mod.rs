//! Filesystem operations.
//!
//! `FsOps` is the seam between the merge policy and the operating system: every
//! stat, rename, ownership/mode/mtime change the merger performs goes through it.
//! `SystemFs` uses the default (real) implementations; tests substitute wrappers
//! that inject failures or record calls.

pub mod copy;
pub mod helpers;
pub mod metadata;

use filetime::FileTime;
use std::fs;
use std::io;
use std::os::unix::fs::{MetadataExt, PermissionsExt};
use std::path::Path;

pub use helpers::{is_cross_device, is_privilege_denied};

/// Node type as seen by `lstat` (symlinks are never followed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    RegularFile,
    Directory,
    Symlink,
    /// Fifos, sockets, device nodes.
    Other,
}

impl EntryKind {
    pub fn from_file_type(ft: fs::FileType) -> Self {
        if ft.is_symlink() {
            EntryKind::Symlink
        } else if ft.is_dir() {
            EntryKind::Directory
        } else if ft.is_file() {
            EntryKind::RegularFile
        } else {
            EntryKind::Other
        }
    }
}

/// The identity a merge reproduces: kind, owner, group, permission bits, mtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeStat {
    pub kind: EntryKind,
    pub uid: u32,
    pub gid: u32,
    /// Permission bits only (`& 0o7777`).
    pub mode: u32,
    pub mtime: FileTime,
}

impl NodeStat {
    pub fn from_metadata(meta: &fs::Metadata) -> Self {
        Self {
            kind: EntryKind::from_file_type(meta.file_type()),
            uid: meta.uid(),
            gid: meta.gid(),
            mode: meta.mode() & 0o7777,
            mtime: FileTime::from_last_modification_time(meta),
        }
    }

    /// A real directory, not a symlink to one.
    #[inline]
    pub fn is_plain_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

/// Primitive filesystem calls used by the merger.
///
/// Default methods hit the real filesystem; implementors override only what they
/// need to observe or fail.
pub trait FsOps {
    fn lstat(&self, path: &Path) -> io::Result<NodeStat> {
        fs::symlink_metadata(path).map(|m| NodeStat::from_metadata(&m))
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }

    /// Change owner and/or group, following symlinks.
    fn chown(&self, path: &Path, uid: Option<u32>, gid: Option<u32>) -> io::Result<()> {
        std::os::unix::fs::chown(path, uid, gid)
    }

    /// Change owner and/or group of the node itself, never its link target.
    fn lchown(&self, path: &Path, uid: Option<u32>, gid: Option<u32>) -> io::Result<()> {
        std::os::unix::fs::lchown(path, uid, gid)
    }

    fn set_mode(&self, path: &Path, mode: u32) -> io::Result<()> {
        fs::set_permissions(path, fs::Permissions::from_mode(mode))
    }

    /// Set mtime only; the node must already exist.
    fn set_mtime(&self, path: &Path, mtime: FileTime) -> io::Result<()> {
        filetime::set_file_mtime(path, mtime)
    }
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemFs;

impl FsOps for SystemFs {}
