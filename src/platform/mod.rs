//! Platform-specific helpers.
//! Unix only: ownership semantics (uid/gid, chown) are what this crate preserves.

mod unix;

pub use unix::{group_name, lookup_group_id, open_log_file_secure_append, path_has_symlink_ancestor};
