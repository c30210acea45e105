//! CLI command definitions using Clap.
//!
//! This module defines all CLI commands and their arguments, organized into
//! domain-specific submodules:
//!
//! - `bindings` - Effective key binding table
//! - `layout` - Master/stack layout computation
//! - `simulate` - Migration and navigation against a simulated desktop
//! - `types` - Shared argument types

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{self, MwmConfig};
use crate::error::MwmError;
use crate::schema;

pub mod bindings;
pub mod layout;
pub mod simulate;
pub mod types;

pub use layout::LayoutArgs;
pub use simulate::SimulateCommands;

/// Application version from Cargo.toml.
const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// mwm CLI - master/stack tiling core with workspace migration.
#[derive(Parser, Debug)]
#[command(name = "mwm")]
#[command(author, version = APP_VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to a custom configuration file.
    ///
    /// Overrides the default configuration file search paths.
    /// Supports JSONC format (JSON with comments).
    #[arg(long, short, global = true, value_name = "PATH", env = "MWM_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub(crate) command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum Commands {
    /// Compute the master/stack layout for a screen.
    ///
    /// Prints one frame per window; window 1 is the master.
    #[command(after_long_help = r"Examples:
  mwm layout --screen 0,25,1440,875 --windows 3
  mwm layout --windows 4 --ratio 0.6 --json")]
    Layout(LayoutArgs),

    /// Print the effective key bindings.
    ///
    /// Shows the built-in bindings merged with the `keybindings` section of
    /// the configuration file.
    Bindings {
        /// Output in JSON format instead of table format.
        #[arg(long, short = 'j')]
        json: bool,
    },

    /// Output the configuration JSON Schema.
    ///
    /// Outputs a JSON Schema to stdout that describes the structure of the
    /// configuration file. Can be redirected to a file for use with editors
    /// that support JSON Schema validation.
    Schema,

    /// Run the tiling core against a simulated desktop.
    #[command(subcommand)]
    Simulate(SimulateCommands),
}

impl Cli {
    /// Loads the configuration named by `--config`, or the default search
    /// paths when the flag is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if an
    /// explicitly named file does not exist.
    pub fn load_config(&self) -> Result<MwmConfig, MwmError> {
        let loaded = config::load(self.config.as_deref())?;
        Ok(loaded.config)
    }

    /// Execute the CLI command.
    ///
    /// # Errors
    ///
    /// Returns an error if the command execution fails.
    pub async fn execute(&self) -> Result<(), MwmError> {
        match &self.command {
            Commands::Schema => {
                println!("{}", schema::generate_schema_json());
                Ok(())
            }
            Commands::Layout(args) => layout::execute(args, &self.load_config()?),
            Commands::Bindings { json } => bindings::execute(*json, &self.load_config()?),
            Commands::Simulate(cmd) => simulate::execute(cmd, &self.load_config()?).await,
        }
    }
}
