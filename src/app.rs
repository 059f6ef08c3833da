//! Application orchestrator.
//! Builds the config from CLI flags, initializes logging, runs one merge and
//! reports the outcome.

use anyhow::Result;
use tracing::{debug, error};

use dirmerge::{Config, ErrorKind, TreeMerger};

use crate::cli::Args;
use crate::logging::init_tracing;
use crate::output as out;

/// Run the CLI application. Failures are printed to stderr before `Err` is returned.
pub fn run(args: Args) -> Result<()> {
    let mut cfg = Config::default();
    args.apply_overrides(&mut cfg);

    // Held until return so the file appender flushes.
    let _guard = init_tracing(&cfg.log_level, args.log_file.as_deref(), args.json).map_err(|e| {
        out::print_error(&format!("Failed to initialize logging: {}", e));
        e
    })?;

    debug!("Starting dirmerge: {:?}", args);

    let merger = TreeMerger::new(cfg);
    match merger.merge(&args.source, &args.destination) {
        Ok(report) => {
            out::print_merged(
                &args.source,
                &args.destination,
                report.relocated + report.copied_across_devices,
                report.merged_dirs,
            );
            Ok(())
        }
        Err(e) => {
            let code = e.code();
            match e.kind() {
                ErrorKind::Conflict => {
                    error!(code, kind = "conflict", path = %e.path().display(), "Merge failed")
                }
                ErrorKind::Permission => {
                    error!(code, kind = "permission_denied", path = %e.path().display(), error = %e, "Merge failed")
                }
                ErrorKind::OtherIo => {
                    error!(code, kind = "io", path = %e.path().display(), error = %e, "Merge failed")
                }
            }
            match e.kind() {
                ErrorKind::Conflict => out::print_conflict(e.path(), &e.to_string()),
                _ => out::print_error(&e.to_string()),
            }
            Err(e.into())
        }
    }
}
