//! Shared test helpers: a filesystem wrapper that records ownership calls and
//! injects OS errors into selected primitives.
#![allow(dead_code)]

use dirmerge::{FsOps, NodeStat, SystemFs};
use filetime::FileTime;
use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChownCall {
    pub path: PathBuf,
    pub uid: Option<u32>,
    pub gid: Option<u32>,
    pub follow: bool,
}

/// Real filesystem, except where a field says otherwise.
#[derive(Default)]
pub struct FaultyFs {
    /// errno returned by chown/lchown.
    pub chown_errno: Option<i32>,
    /// errno returned by set_mode.
    pub set_mode_errno: Option<i32>,
    /// errno returned by rename.
    pub rename_errno: Option<i32>,
    /// Record ownership changes without applying them.
    pub dry_chown: bool,
    /// lstat reports this gid for the given path.
    pub gid_overrides: Vec<(PathBuf, u32)>,
    pub chown_calls: RefCell<Vec<ChownCall>>,
}

impl FaultyFs {
    pub fn calls(&self) -> Vec<ChownCall> {
        self.chown_calls.borrow().clone()
    }

    fn record(&self, path: &Path, uid: Option<u32>, gid: Option<u32>, follow: bool) -> io::Result<()> {
        self.chown_calls.borrow_mut().push(ChownCall {
            path: path.to_path_buf(),
            uid,
            gid,
            follow,
        });
        if let Some(code) = self.chown_errno {
            return Err(io::Error::from_raw_os_error(code));
        }
        if self.dry_chown {
            return Ok(());
        }
        if follow {
            SystemFs.chown(path, uid, gid)
        } else {
            SystemFs.lchown(path, uid, gid)
        }
    }
}

impl FsOps for FaultyFs {
    fn lstat(&self, path: &Path) -> io::Result<NodeStat> {
        let mut st = SystemFs.lstat(path)?;
        if let Some((_, gid)) = self.gid_overrides.iter().find(|(p, _)| p == path) {
            st.gid = *gid;
        }
        Ok(st)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        match self.rename_errno {
            Some(code) => Err(io::Error::from_raw_os_error(code)),
            None => SystemFs.rename(from, to),
        }
    }

    fn chown(&self, path: &Path, uid: Option<u32>, gid: Option<u32>) -> io::Result<()> {
        self.record(path, uid, gid, true)
    }

    fn lchown(&self, path: &Path, uid: Option<u32>, gid: Option<u32>) -> io::Result<()> {
        self.record(path, uid, gid, false)
    }

    fn set_mode(&self, path: &Path, mode: u32) -> io::Result<()> {
        match self.set_mode_errno {
            Some(code) => Err(io::Error::from_raw_os_error(code)),
            None => SystemFs.set_mode(path, mode),
        }
    }
}

pub fn gid_of(path: &Path) -> u32 {
    SystemFs.lstat(path).unwrap().gid
}

pub fn mtime_of(path: &Path) -> FileTime {
    SystemFs.lstat(path).unwrap().mtime
}

pub fn write(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

pub fn is_root() -> bool {
    // SAFETY: geteuid has no preconditions.
    unsafe { libc::geteuid() == 0 }
}
