//! I/O helper utilities.
//!
//! Classifies `io::Error`s by raw OS code and renders short, actionable hints
//! that `MergeError` appends to its message.

use std::io;

/// EPERM / EACCES: the two codes an ownership change may fail with and still be ignored.
pub fn is_privilege_denied(e: &io::Error) -> bool {
    matches!(e.raw_os_error(), Some(libc::EPERM) | Some(libc::EACCES))
}

/// EXDEV: rename across filesystems.
pub fn is_cross_device(e: &io::Error) -> bool {
    e.raw_os_error() == Some(libc::EXDEV)
}

/// Platform-aware hint plus OS code, or an empty string when nothing useful applies.
pub fn hint_for(e: &io::Error) -> String {
    let Some(code) = e.raw_os_error() else {
        return match e.kind() {
            io::ErrorKind::NotFound => " — path not found; verify it exists.".to_string(),
            io::ErrorKind::Unsupported => " — node type cannot be copied.".to_string(),
            _ => String::new(),
        };
    };

    let hint = match code {
        libc::EACCES | libc::EPERM => " — permission denied; check ownership and write permissions.",
        libc::EXDEV => " — cross-filesystem; atomic rename not possible.",
        libc::EBUSY => " — resource busy; ensure no other process is writing.",
        libc::ENOENT => " — path not found; verify it exists.",
        libc::ENOTDIR => " — a path component or the destination is not a directory.",
        libc::ENOTEMPTY => " — destination directory is not empty.",
        libc::ENOSPC => " — insufficient space on device.",
        libc::EROFS => " — read-only filesystem; cannot write here.",
        libc::ELOOP => " — too many symbolic link levels (ELOOP); possible symlink cycle.",
        libc::ENAMETOOLONG => " — filename or path too long; shorten path segments.",
        _ => "",
    };
    format!("{hint} [os code: {code}]")
}
