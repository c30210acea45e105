//! Bindings CLI command.
//!
//! Prints the effective key binding table: the built-in defaults merged with
//! the `keybindings` section of the configuration.

use colored::Colorize;
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::cli::output;
use crate::config::MwmConfig;
use crate::error::MwmError;
use crate::hotkey::{Action, Binding, BindingTable};

#[derive(Serialize)]
struct BindingEntry {
    binding: Binding,
    action: Action,
}

/// Builds the effective binding table for a configuration.
#[must_use]
pub fn effective_bindings(config: &MwmConfig) -> BindingTable {
    BindingTable::with_overrides(&config.keybindings)
}

/// Executes `mwm bindings`.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn execute(json: bool, config: &MwmConfig) -> Result<(), MwmError> {
    #[derive(Tabled)]
    struct BindingRow {
        #[tabled(rename = "Keys")]
        keys: String,
        #[tabled(rename = "Action")]
        action: String,
        #[tabled(rename = "Layout")]
        layout: String,
    }

    let entries = effective_bindings(config).sorted();

    if json {
        let list: Vec<BindingEntry> =
            entries.into_iter().map(|(binding, action)| BindingEntry { binding, action }).collect();
        output::print_highlighted_json(&serde_json::to_value(list)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("{}", "No key bindings.".dimmed());
        return Ok(());
    }

    let count = entries.len();
    let rows: Vec<BindingRow> = entries
        .into_iter()
        .map(|(binding, action)| BindingRow {
            keys: binding.to_string(),
            action: action.to_string(),
            layout: output::format_bool(action.affects_layout()),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", format!("Key bindings ({count})").bold());
    println!("{table}");
    Ok(())
}
