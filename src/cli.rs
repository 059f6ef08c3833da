//! CLI definition and parsing.
//! Defines Args and applies them on top of the default Config.
//!
//! Notes:
//! - --debug is a shorthand for --log-level debug.
//! - --privileged-group accepts a group name, a numeric gid, or `none`.

use clap::{Parser, ValueHint};
use std::path::PathBuf;

use dirmerge::{Config, CrossDevice, GroupSpec, LogLevel};

/// Merge a staged directory tree into a destination directory.
#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Merge a staged directory tree into a destination, preserving ownership, mode and mtime"
)]
pub struct Args {
    /// Source directory; its contents are moved away.
    #[arg(value_name = "SOURCE", value_hint = ValueHint::DirPath)]
    pub source: PathBuf,

    /// Destination directory; created if missing.
    #[arg(value_name = "DEST", value_hint = ValueHint::DirPath)]
    pub destination: PathBuf,

    /// Group treated as a staging artifact and remapped to the destination parent's group.
    #[arg(long, value_name = "NAME|GID|none", help = "Group to remap to the destination parent's group (default: wheel)")]
    pub privileged_group: Option<GroupSpec>,

    /// Copy subtrees (then delete them) when a rename crosses filesystems.
    #[arg(long, help = "Fall back to copy+remove when the destination is on another filesystem")]
    pub copy_across_devices: bool,

    /// Report every merged or relocated entry.
    #[arg(short = 'v', long, help = "Log every merged or relocated entry")]
    pub verbose: bool,

    /// Enable debug logging (equivalent to `--log-level debug`).
    #[arg(short = 'd', long, help = "Enable debug logging (shorthand for --log-level debug)")]
    pub debug: bool,

    /// Set log level. One of: quiet, normal, info, debug.
    #[arg(long, help = "Set log level: quiet, normal, info, debug")]
    pub log_level: Option<String>,

    /// Also append logs to this file.
    #[arg(long, value_hint = ValueHint::FilePath, help = "Append logs to this file as well as stdout")]
    pub log_file: Option<PathBuf>,

    /// Emit logs in structured JSON (includes timestamp, level, and structured fields).
    #[arg(long, help = "Emit logs in structured JSON")]
    pub json: bool,
}

impl Args {
    /// Effective log level derived from flags.
    /// Precedence: --debug > --log-level value > --verbose > None (use config default).
    pub fn effective_log_level(&self) -> Option<LogLevel> {
        if self.debug {
            return Some(LogLevel::Debug);
        }
        if let Some(lvl) = self.log_level.as_deref().and_then(LogLevel::parse) {
            return Some(lvl);
        }
        self.verbose.then_some(LogLevel::Info)
    }

    /// Apply CLI overrides to a Config (in-place). No-ops for unset flags.
    pub fn apply_overrides(&self, cfg: &mut Config) {
        if let Some(group) = &self.privileged_group {
            cfg.privileged_group = group.clone();
        }
        if self.copy_across_devices {
            cfg.cross_device = CrossDevice::Copy;
        }
        if self.verbose {
            cfg.verbose = true;
        }
        if let Some(level) = self.effective_log_level() {
            cfg.log_level = level;
        }
    }
}

pub fn parse() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn effective_log_level_precedence() {
        let args = Args::parse_from(["dirmerge", "--debug", "--log-level", "quiet", "a", "b"]);
        assert_eq!(args.effective_log_level(), Some(LogLevel::Debug));

        let args = Args::parse_from(["dirmerge", "--log-level", "quiet", "-v", "a", "b"]);
        assert_eq!(args.effective_log_level(), Some(LogLevel::Quiet));

        let args = Args::parse_from(["dirmerge", "-v", "a", "b"]);
        assert_eq!(args.effective_log_level(), Some(LogLevel::Info));

        let args = Args::parse_from(["dirmerge", "a", "b"]);
        assert_eq!(args.effective_log_level(), None);
    }

    #[test]
    fn apply_overrides_sets_flags() {
        let args = Args::parse_from([
            "dirmerge",
            "--privileged-group",
            "80",
            "--copy-across-devices",
            "--verbose",
            "/src",
            "/dst",
        ]);
        let mut cfg = Config::default();
        args.apply_overrides(&mut cfg);
        assert_eq!(args.source, PathBuf::from("/src"));
        assert_eq!(args.destination, PathBuf::from("/dst"));
        assert_eq!(cfg.privileged_group, GroupSpec::Id(80));
        assert_eq!(cfg.cross_device, CrossDevice::Copy);
        assert!(cfg.verbose);
        assert_eq!(cfg.log_level, LogLevel::Info);
    }

    #[test]
    fn defaults_leave_config_alone() {
        let args = Args::parse_from(["dirmerge", "/src", "/dst"]);
        let mut cfg = Config::default();
        args.apply_overrides(&mut cfg);
        assert_eq!(cfg.privileged_group, GroupSpec::Name("wheel".into()));
        assert_eq!(cfg.cross_device, CrossDevice::Fail);
        assert!(!cfg.verbose);
    }

    #[test]
    fn missing_destination_is_rejected() {
        assert!(Args::try_parse_from(["dirmerge", "/src"]).is_err());
    }
}
