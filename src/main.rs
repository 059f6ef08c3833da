use std::process::ExitCode;

mod app;
mod cli;
mod logging;
mod output;

fn main() -> ExitCode {
    let args = cli::parse();
    match app::run(args) {
        Ok(()) => ExitCode::SUCCESS,
        // Already reported on stderr by `run`.
        Err(_) => ExitCode::FAILURE,
    }
}
