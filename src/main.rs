//! Application entry point.
//!
//! Parses command-line arguments, merges configuration layers and delegates
//! execution to [`runner::run`].

use crudcheck::{cli, runner};
use std::io::{self, Write};
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::fmt;

fn main() -> ExitCode {
    let (parsed, matches) = match cli::parse_from(std::env::args_os()) {
        Ok(parsed) => parsed,
        Err(err) => err.exit(),
    };
    let merged = match cli::merge_with_config(&parsed, &matches) {
        Ok(merged) => merged,
        Err(err) => {
            fmt().with_writer(io::stderr).with_max_level(Level::ERROR).init();
            let message = format!("{:#}", anyhow::Error::from(err));
            tracing::error!(error = %message, "configuration failed");
            return ExitCode::FAILURE;
        }
    };
    let max_level = if merged.verbose {
        Level::DEBUG
    } else {
        Level::ERROR
    };
    fmt().with_writer(io::stderr).with_max_level(max_level).init();
    let mut stdout = io::stdout().lock();
    let outcome = runner::run(&merged, &mut stdout)
        .and_then(|()| stdout.flush().map_err(anyhow::Error::from));
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let message = format!("{err:#}");
            tracing::error!(error = %message, "command failed");
            ExitCode::FAILURE
        }
    }
}
