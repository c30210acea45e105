//! Simulation CLI commands.
//!
//! These commands drive the tiling core against an in-memory desktop, so the
//! migration protocol and the navigation rules can be inspected without a
//! window server.

use std::sync::Arc;

use clap::Subcommand;
use colored::Colorize;
use serde::Serialize;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify, Style};
use tabled::{Table, Tabled};
use tokio::time::Instant;

use super::bindings::effective_bindings;
use super::types::{ActionList, ScreenFrame};
use crate::cli::output;
use crate::config::MwmConfig;
use crate::error::MwmError;
use crate::hotkey::{Action, Binding};
use crate::platform::simulated::{InputEvent, RecordedInput, SimulatedDesktop};
use crate::platform::{Capabilities, PointerEventKind, SpaceProvider};
use crate::tiling::{
    DispatchOutcome, ManagerSettings, ManagerState, Rect, TilingActor, TilingManager, TilingMessage,
    WindowHandle, WindowId,
};

/// Simulation subcommands.
#[derive(Subcommand, Debug)]
#[command(next_display_order = None)]
pub enum SimulateCommands {
    /// Migrate a window to another space and print the synthesized input.
    #[command(after_long_help = r"Examples:
  mwm simulate migrate --space 2                      # Default three spaces
  mwm simulate migrate --space 3 --disabled-shortcut  # Shortcut enabled temporarily
  mwm simulate migrate --space 2 --json               # Timeline as JSON")]
    Migrate {
        /// Target space number (1-based).
        #[arg(long, short)]
        space: usize,

        /// Number of spaces on the simulated desktop.
        #[arg(long, default_value_t = 3)]
        spaces: usize,

        /// Start with the target space's switch shortcut disabled.
        #[arg(long, conflicts_with = "no_shortcut")]
        disabled_shortcut: bool,

        /// Remove the target space's switch shortcut entirely.
        #[arg(long)]
        no_shortcut: bool,

        /// Output in JSON format instead of table format.
        #[arg(long, short = 'j')]
        json: bool,
    },

    /// Replay logical actions and print the resulting order and focus.
    #[command(after_long_help = r"Examples:
  mwm simulate navigate --windows 3 --actions focus-right,move-left
  mwm simulate navigate --windows 4 --actions promote,increase-master-ratio --json")]
    Navigate {
        /// Number of windows on the simulated desktop.
        #[arg(long, short, default_value_t = 3)]
        windows: usize,

        /// Comma-separated actions, e.g. `focus-right,move-left,promote`.
        #[arg(long, short, default_value = "")]
        actions: ActionList,

        /// Screen frame as X,Y,W,H.
        #[arg(long, default_value_t = ScreenFrame::default(), value_name = "X,Y,W,H")]
        screen: ScreenFrame,

        /// Output in JSON format instead of table format.
        #[arg(long, short = 'j')]
        json: bool,
    },
}

/// Executes a simulation subcommand.
///
/// # Errors
///
/// Returns an error if the simulated operation is rejected.
pub async fn execute(cmd: &SimulateCommands, config: &MwmConfig) -> Result<(), MwmError> {
    match cmd {
        SimulateCommands::Migrate {
            space,
            spaces,
            disabled_shortcut,
            no_shortcut,
            json,
        } => {
            let scenario = MigrateScenario {
                target_space: *space,
                spaces: *spaces,
                disabled_shortcut: *disabled_shortcut,
                no_shortcut: *no_shortcut,
            };
            let report = run_migration(&scenario, config).await?;
            print_migration(&report, *json)
        }
        SimulateCommands::Navigate { windows, actions, screen, json } => {
            let report = run_navigation(*windows, actions.actions(), screen.rect(), config).await?;
            print_navigation(&report, *json)
        }
    }
}

// ============================================================================
// Migration
// ============================================================================

/// Setup of a simulated migration.
#[derive(Debug, Clone, Copy)]
pub struct MigrateScenario {
    /// Target space number.
    pub target_space: usize,
    /// Number of spaces on the desktop.
    pub spaces: usize,
    /// Disable the target shortcut before migrating.
    pub disabled_shortcut: bool,
    /// Remove the target shortcut before migrating.
    pub no_shortcut: bool,
}

/// One synthesized input event relative to the first event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    /// Milliseconds since the first event.
    pub offset_ms: u64,
    /// Event name.
    pub event: String,
    /// Location or key combination.
    pub detail: String,
}

/// Result of a simulated migration.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationReport {
    /// Target space number.
    pub target_space: usize,
    /// Space the window ended up on.
    pub window_space: Option<usize>,
    /// Active space afterwards.
    pub active_space: usize,
    /// Whether the target shortcut is enabled afterwards.
    pub shortcut_enabled: bool,
    /// Synthesized input in posting order.
    pub timeline: Vec<TimelineEntry>,
}

const MIGRATED_WINDOW: WindowHandle = WindowHandle(1);

/// Runs a migration of one window on a simulated desktop.
///
/// # Errors
///
/// Returns an error if the migration is rejected or fails.
pub async fn run_migration(scenario: &MigrateScenario, config: &MwmConfig) -> Result<MigrationReport, MwmError> {
    if scenario.spaces == 0 {
        return Err(MwmError::InvalidArguments("--spaces must be at least 1".to_string()));
    }

    let desktop = Arc::new(SimulatedDesktop::new(scenario.spaces));
    desktop.add_window(MIGRATED_WINDOW, "Terminal", "mwm", Rect::new(100.0, 100.0, 800.0, 600.0));
    if scenario.no_shortcut {
        desktop.remove_shortcut(scenario.target_space);
    } else if scenario.disabled_shortcut {
        desktop.set_shortcut_enabled(scenario.target_space, false);
    }

    let mut manager = TilingManager::new(Capabilities::simulated(&desktop), ManagerSettings::from(config));
    manager.sync_windows(desktop.enumerate());

    if let DispatchOutcome::MigrationStarted { ticket, .. } =
        manager.dispatch(Action::MoveToSpace(scenario.target_space))?
    {
        ticket.wait().await?;
    }

    Ok(MigrationReport {
        target_space: scenario.target_space,
        window_space: desktop.space_of(MIGRATED_WINDOW),
        active_space: desktop.active_ordinal(),
        shortcut_enabled: desktop.is_shortcut_enabled(scenario.target_space),
        timeline: timeline(&desktop.events()),
    })
}

/// Converts recorded input into offsets relative to the first event.
#[must_use]
pub fn timeline(events: &[RecordedInput]) -> Vec<TimelineEntry> {
    let Some(start) = events.first().map(|event| event.at) else {
        return Vec::new();
    };

    events
        .iter()
        .map(|recorded| {
            let (event, detail) = describe(&recorded.event);
            TimelineEntry {
                offset_ms: elapsed_ms(start, recorded.at),
                event,
                detail,
            }
        })
        .collect()
}

fn elapsed_ms(start: Instant, at: Instant) -> u64 {
    u64::try_from(at.duration_since(start).as_millis()).unwrap_or(u64::MAX)
}

fn describe(event: &InputEvent) -> (String, String) {
    match *event {
        InputEvent::Pointer { kind, point, button_held } => {
            let name = match kind {
                PointerEventKind::Down => "pointer-down",
                PointerEventKind::Dragged => "pointer-dragged",
                PointerEventKind::Up => "pointer-up",
            };
            let held = if button_held { " held" } else { "" };
            (name.to_string(), format!("({}, {}){held}", point.x, point.y))
        }
        InputEvent::Key { code, modifiers, down } => {
            let name = if down { "key-down" } else { "key-up" };
            let combo = Binding { modifiers, key: format!("#{code}") };
            (name.to_string(), combo.to_string())
        }
    }
}

fn print_migration(report: &MigrationReport, json: bool) -> Result<(), MwmError> {
    #[derive(Tabled)]
    struct EventRow {
        #[tabled(rename = "+ms")]
        offset: u64,
        #[tabled(rename = "Event")]
        event: String,
        #[tabled(rename = "Detail")]
        detail: String,
    }

    if json {
        output::print_highlighted_json(&serde_json::to_value(report)?);
        return Ok(());
    }

    let rows: Vec<EventRow> = report
        .timeline
        .iter()
        .map(|entry| EventRow {
            offset: entry.offset_ms,
            event: entry.event.clone(),
            detail: entry.detail.clone(),
        })
        .collect();

    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::first()).with(Alignment::right()))
        .to_string();

    println!("{}", format!("Synthesized input ({})", report.timeline.len()).bold());
    println!("{table}");

    let landed = report.window_space == Some(report.target_space);
    let window_space = report.window_space.map_or_else(|| "-".to_string(), |n| n.to_string());
    println!(
        "{} window on space {window_space}, active space {}, shortcut enabled {}",
        output::format_bool(landed),
        report.active_space,
        output::format_bool(report.shortcut_enabled),
    );
    Ok(())
}

// ============================================================================
// Navigation
// ============================================================================

/// State after one replayed action.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationStep {
    /// The action.
    pub action: Action,
    /// Focused window afterwards.
    pub focused: Option<WindowId>,
    /// Window order afterwards.
    pub order: Vec<WindowId>,
}

/// Result of a replayed action sequence.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationReport {
    /// One entry per action.
    pub steps: Vec<NavigationStep>,
    /// Final manager state.
    pub state: ManagerState,
}

/// Replays `actions` through a tiling actor over `windows` simulated windows.
///
/// # Errors
///
/// Returns an error if the actor cannot be reached.
pub async fn run_navigation(
    windows: usize,
    actions: &[Action],
    screen: Rect,
    config: &MwmConfig,
) -> Result<NavigationReport, MwmError> {
    let desktop = Arc::new(SimulatedDesktop::new(3));
    for n in 1..=windows as u64 {
        let offset = 40.0 * n as f64;
        desktop.add_window(
            WindowHandle(n),
            "Terminal",
            &format!("shell {n}"),
            Rect::new(offset, offset, 640.0, 480.0),
        );
    }

    let mut manager = TilingManager::new(Capabilities::simulated(&desktop), ManagerSettings::from(config));
    manager.sync_windows(desktop.enumerate());
    let handle = TilingActor::spawn(manager, effective_bindings(config));

    handle.send_async(TilingMessage::SetScreen(screen)).await?;

    let mut steps = Vec::with_capacity(actions.len());
    for &action in actions {
        handle.send_async(TilingMessage::Action(action)).await?;
        let state = handle.state().await?;
        steps.push(NavigationStep {
            action,
            focused: state.focused,
            order: state.windows.iter().map(|window| window.id).collect(),
        });
    }

    let state = handle.state().await?;
    handle.shutdown().await?;
    Ok(NavigationReport { steps, state })
}

fn format_order(order: &[WindowId]) -> String {
    order.iter().map(ToString::to_string).collect::<Vec<_>>().join(" ")
}

fn print_navigation(report: &NavigationReport, json: bool) -> Result<(), MwmError> {
    #[derive(Tabled)]
    struct StepRow {
        #[tabled(rename = "#")]
        step: usize,
        #[tabled(rename = "Action")]
        action: String,
        #[tabled(rename = "Focused")]
        focused: String,
        #[tabled(rename = "Order")]
        order: String,
    }

    #[derive(Tabled)]
    struct WindowRow {
        #[tabled(rename = "ID")]
        id: u64,
        #[tabled(rename = "Title")]
        title: String,
        #[tabled(rename = "Frame")]
        frame: String,
        #[tabled(rename = "Focused")]
        focused: String,
    }

    if json {
        output::print_highlighted_json(&serde_json::to_value(report)?);
        return Ok(());
    }

    if !report.steps.is_empty() {
        let rows: Vec<StepRow> = report
            .steps
            .iter()
            .enumerate()
            .map(|(index, step)| StepRow {
                step: index + 1,
                action: step.action.to_string(),
                focused: step.focused.map_or_else(|| "-".to_string(), |id| id.to_string()),
                order: format_order(&step.order),
            })
            .collect();

        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Columns::first()).with(Alignment::right()))
            .to_string();
        println!("{}", format!("Actions ({})", report.steps.len()).bold());
        println!("{table}");
    }

    if report.state.windows.is_empty() {
        println!("{}", "No windows managed.".dimmed());
        return Ok(());
    }

    let rows: Vec<WindowRow> = report
        .state
        .windows
        .iter()
        .map(|window| WindowRow {
            id: window.id.get(),
            title: output::truncate(&window.title, 30),
            frame: window.frame.to_string(),
            focused: output::format_bool(report.state.focused == Some(window.id)),
        })
        .collect();

    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::first()).with(Alignment::right()))
        .with(Modify::new(Columns::last()).with(Alignment::center()))
        .to_string();
    println!("{}", format!("Windows ({})", report.state.windows.len()).bold());
    println!("{table}");
    Ok(())
}
