//! Config module.
//! Provides the merge configuration types and pre-merge path validation.

pub mod types;
mod validate;

pub use types::{Config, CrossDevice, GroupSpec, LogLevel};
pub use validate::{ValidatedPaths, validate_paths};

/// Group that staging areas tend to leave on extracted files.
pub const PRIVILEGED_GROUP_DEFAULT: &str = "wheel";
