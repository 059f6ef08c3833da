//! User-facing status lines.
//! Every line carries a short prefix (`warn:`, `error:`, `ok:`); the prefix is
//! coloured only when the stream it goes to is a terminal.

use owo_colors::OwoColorize;
use std::path::Path;

fn stdout_is_tty() -> bool {
    atty::is(atty::Stream::Stdout)
}

fn stderr_is_tty() -> bool {
    atty::is(atty::Stream::Stderr)
}

pub fn print_warn(msg: &str) {
    if stderr_is_tty() {
        eprintln!("{} {}", "warn:".yellow().bold(), msg);
    } else {
        eprintln!("warn: {}", msg);
    }
}

pub fn print_error(msg: &str) {
    if stderr_is_tty() {
        eprintln!("{} {}", "error:".red().bold(), msg);
    } else {
        eprintln!("error: {}", msg);
    }
}

/// A non-directory would replace `path`. The message text is exactly the
/// error's `Display`, so scripts can match on it; only the prefix is styled.
pub fn print_conflict(path: &Path, msg: &str) {
    print_error(msg);
    if stderr_is_tty() {
        eprintln!("  {} remove or rename '{}' and merge again", "hint:".cyan(), path.display());
    }
}

/// Final summary of a successful merge.
pub fn print_merged(source: &Path, destination: &Path, relocated: usize, merged: usize) {
    let msg = format!(
        "Merged '{}' into '{}' ({} relocated, {} merged)",
        source.display(),
        destination.display(),
        relocated,
        merged
    );
    if stdout_is_tty() {
        println!("{} {}", "ok:".green().bold(), msg);
    } else {
        println!("ok: {}", msg);
    }
}
