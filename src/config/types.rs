//! Core configuration types.
//! - Config holds merge settings with sensible defaults.
//! - GroupSpec names the privileged default group (by name or id).
//! - LogLevel represents verbosity with simple parsing helpers.

use std::fmt;
use std::str::FromStr;

use super::PRIVILEGED_GROUP_DEFAULT;
use crate::platform::lookup_group_id;

/// Program-defined verbosity levels exposed to users.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogLevel {
    /// Only errors
    Quiet,
    /// Informational output (default)
    #[default]
    Normal,
    /// More info (like verbose)
    Info,
    /// Debug/trace
    Debug,
}

impl LogLevel {
    /// Parse common string names into our LogLevel (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "quiet" | "error" | "none" => Some(LogLevel::Quiet),
            "normal" => Some(LogLevel::Normal),
            "info" | "verbose" | "detailed" => Some(LogLevel::Info),
            "debug" | "trace" => Some(LogLevel::Debug),
            _ => None,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
        };
        f.write_str(s)
    }
}

impl FromStr for LogLevel {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("invalid log level: '{s}'"))
    }
}

/// The group whose ownership is treated as a staging artifact and remapped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupSpec {
    Id(u32),
    Name(String),
    /// Never remap groups.
    Disabled,
}

impl GroupSpec {
    /// Resolve to a numeric gid. Unknown names resolve to `None` (remapping off).
    pub fn resolve(&self) -> Option<u32> {
        match self {
            GroupSpec::Id(gid) => Some(*gid),
            GroupSpec::Name(name) => lookup_group_id(name),
            GroupSpec::Disabled => None,
        }
    }
}

impl Default for GroupSpec {
    fn default() -> Self {
        GroupSpec::Name(PRIVILEGED_GROUP_DEFAULT.to_string())
    }
}

impl FromStr for GroupSpec {
    type Err = String;
    /// Digits are a gid, `none` disables remapping, anything else is a group name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err("empty group".to_string());
        }
        if s.eq_ignore_ascii_case("none") {
            return Ok(GroupSpec::Disabled);
        }
        if s.bytes().all(|b| b.is_ascii_digit()) {
            return s
                .parse::<u32>()
                .map(GroupSpec::Id)
                .map_err(|e| format!("invalid group id '{s}': {e}"));
        }
        Ok(GroupSpec::Name(s.to_string()))
    }
}

impl fmt::Display for GroupSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupSpec::Id(gid) => write!(f, "{gid}"),
            GroupSpec::Name(name) => f.write_str(name),
            GroupSpec::Disabled => f.write_str("none"),
        }
    }
}

/// What to do when a relocation's `rename` crosses filesystems (EXDEV).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CrossDevice {
    /// Propagate the EXDEV error.
    #[default]
    Fail,
    /// Copy the subtree with its metadata, then remove the source.
    Copy,
}

/// Runtime configuration used by the merger.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Group remapped to the destination parent's group
    pub privileged_group: GroupSpec,
    /// EXDEV handling for relocations
    pub cross_device: CrossDevice,
    /// Emit per-entry events at info instead of trace
    pub verbose: bool,
    /// Console verbosity (binary only)
    pub log_level: LogLevel,
}

impl Config {
    /// Config with an explicit privileged group; other fields use defaults.
    pub fn with_privileged_group(group: GroupSpec) -> Self {
        Self {
            privileged_group: group,
            ..Default::default()
        }
    }
}
