//! CLI module for mwm.
//!
//! This module provides the command-line interface. Every command runs the
//! tiling core in-process; simulation commands use an in-memory desktop.

pub(crate) mod commands;
mod output;

use clap::Parser;
pub use commands::Cli;

use crate::error::MwmError;

/// Runs the CLI.
///
/// Parses command-line arguments and executes the appropriate command. Must
/// be awaited inside a Tokio runtime with the time driver enabled.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub async fn run() -> Result<(), MwmError> {
    let cli = Cli::parse();
    cli.execute().await
}
