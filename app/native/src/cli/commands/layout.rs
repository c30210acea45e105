//! Layout CLI command.
//!
//! Computes the master/stack layout for a number of windows on a screen frame
//! without touching any host window.

use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify, Style};
use tabled::{Table, Tabled};

use super::types::ScreenFrame;
use crate::cli::output;
use crate::config::MwmConfig;
use crate::error::MwmError;
use crate::tiling::{LayoutCommand, LayoutConfig, Rect, WindowId, layout};

/// Arguments of `mwm layout`.
#[derive(Args, Debug)]
pub struct LayoutArgs {
    /// Screen frame as X,Y,W,H.
    #[arg(long, short, default_value_t = ScreenFrame::default(), value_name = "X,Y,W,H")]
    pub screen: ScreenFrame,

    /// Number of tiled windows.
    #[arg(long, short, default_value_t = 2)]
    pub windows: usize,

    /// Gap between windows in pixels. Defaults to the configured value.
    #[arg(long)]
    pub gaps: Option<u32>,

    /// Screen edge padding in pixels. Defaults to the configured value.
    #[arg(long)]
    pub padding: Option<u32>,

    /// Master area ratio. Defaults to the configured value.
    #[arg(long)]
    pub ratio: Option<f64>,

    /// Output in JSON format instead of table format.
    #[arg(long, short = 'j')]
    pub json: bool,
}

impl LayoutArgs {
    /// Resolves the effective layout settings from flags over configuration.
    #[must_use]
    pub fn layout_config(&self, config: &MwmConfig) -> LayoutConfig {
        let base = config.layout.to_layout_config();
        LayoutConfig::new(
            self.gaps.unwrap_or_else(|| base.gaps()),
            self.padding.unwrap_or_else(|| base.padding()),
            self.ratio.unwrap_or_else(|| base.master_ratio()),
        )
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LayoutOutput<'a> {
    screen: Rect,
    config: LayoutConfig,
    commands: &'a [LayoutCommand],
}

/// Executes `mwm layout`.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn execute(args: &LayoutArgs, config: &MwmConfig) -> Result<(), MwmError> {
    let layout_config = args.layout_config(config);
    let screen = args.screen.rect();
    let windows: Vec<WindowId> = (1..=args.windows as u64).map(WindowId::new).collect();
    let commands = layout::compute(&windows, &screen, &layout_config);

    if args.json {
        let value = serde_json::to_value(LayoutOutput {
            screen,
            config: layout_config,
            commands: &commands,
        })?;
        output::print_highlighted_json(&value);
        return Ok(());
    }

    if commands.is_empty() {
        println!("{}", "No windows to lay out.".dimmed());
        return Ok(());
    }

    print_table(&commands, &screen, &layout_config);
    Ok(())
}

fn print_table(commands: &[LayoutCommand], screen: &Rect, config: &LayoutConfig) {
    #[derive(Tabled)]
    struct CommandRow {
        #[tabled(rename = "Window")]
        window: u64,
        #[tabled(rename = "Role")]
        role: &'static str,
        #[tabled(rename = "X")]
        x: String,
        #[tabled(rename = "Y")]
        y: String,
        #[tabled(rename = "Width")]
        width: String,
        #[tabled(rename = "Height")]
        height: String,
    }

    let rows: Vec<CommandRow> = commands
        .iter()
        .enumerate()
        .map(|(index, command)| CommandRow {
            window: command.window_id.get(),
            role: if index == 0 { "master" } else { "stack" },
            x: format!("{:.1}", command.frame.x),
            y: format!("{:.1}", command.frame.y),
            width: format!("{:.1}", command.frame.width),
            height: format!("{:.1}", command.frame.height),
        })
        .collect();

    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::first()).with(Alignment::right()))
        .with(Modify::new(Columns::new(2..6)).with(Alignment::right()))
        .to_string();

    println!(
        "{} {}",
        format!("Layout ({} windows on {screen})", commands.len()).bold(),
        format!(
            "gaps {} / padding {} / ratio {:.2}",
            config.gaps(),
            config.padding(),
            config.master_ratio()
        )
        .dimmed()
    );
    println!("{table}");
}
