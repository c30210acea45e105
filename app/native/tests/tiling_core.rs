//! Integration tests for the tiling core.
//!
//! These tests drive the manager and the actor through the public API against
//! the simulated desktop, so they run anywhere without a window server.

use std::sync::Arc;
use std::time::Duration;

use mwm_lib::config::MwmConfig;
use mwm_lib::hotkey::{Action, Binding, BindingTable};
use mwm_lib::platform::simulated::{InputEvent, SimulatedDesktop};
use mwm_lib::platform::{Capabilities, PointerEventKind, SpaceProvider};
use mwm_lib::tiling::{
    Direction, DispatchOutcome, ManagerSettings, MigrationError, MigrationPhase, QueryResult, Rect,
    TilingActor, TilingError, TilingManager, TilingMessage, TilingQuery, WindowHandle, WindowId,
};

const SCREEN: Rect = Rect::new(0.0, 0.0, 1920.0, 1080.0);

fn desktop_with_windows(spaces: usize, windows: u64) -> Arc<SimulatedDesktop> {
    let desktop = Arc::new(SimulatedDesktop::new(spaces));
    for n in 1..=windows {
        desktop.add_window(
            WindowHandle(n),
            "Terminal",
            &format!("shell {n}"),
            Rect::new(20.0 * n as f64, 20.0 * n as f64, 640.0, 480.0),
        );
    }
    desktop
}

fn manager_for(desktop: &Arc<SimulatedDesktop>, config: &MwmConfig) -> TilingManager {
    let mut manager = TilingManager::new(Capabilities::simulated(desktop), ManagerSettings::from(config));
    manager.sync_windows(desktop.enumerate());
    manager
}

fn ids(raw: &[u64]) -> Vec<WindowId> { raw.iter().copied().map(WindowId::new).collect() }

// ============================================================================
// Manager
// ============================================================================

#[test]
fn test_three_window_layout_and_navigation() {
    let desktop = desktop_with_windows(3, 3);
    let mut manager = manager_for(&desktop, &MwmConfig::default());

    assert_eq!(manager.apply_layout(SCREEN), 3);
    assert_eq!(desktop.frame_of(WindowHandle(1)), Some(Rect::new(10.0, 10.0, 945.0, 1060.0)));
    assert_eq!(desktop.frame_of(WindowHandle(2)), Some(Rect::new(965.0, 10.0, 945.0, 525.0)));
    assert_eq!(desktop.frame_of(WindowHandle(3)), Some(Rect::new(965.0, 545.0, 945.0, 525.0)));

    // Focus wraps from the master to the last stack window.
    let outcome = manager.dispatch(Action::Focus(Direction::Left)).unwrap();
    assert!(matches!(outcome, DispatchOutcome::FocusChanged(id) if id == WindowId::new(3)));
    assert_eq!(desktop.focused(), Some(WindowHandle(3)));

    // Moving up swaps with the previous stack window.
    assert!(manager.dispatch(Action::Move(Direction::Up)).unwrap().needs_layout());
    assert_eq!(manager.registry().order(), ids(&[1, 3, 2]).as_slice());
    manager.retile();
    assert_eq!(desktop.frame_of(WindowHandle(3)), Some(Rect::new(965.0, 10.0, 945.0, 525.0)));

    manager.registry().check_invariants().unwrap();
}

#[test]
fn test_configured_layout_and_ratio_steps() {
    let config: MwmConfig =
        serde_json::from_str(r#"{ "layout": { "gaps": 0, "padding": 0, "masterRatio": 0.6 } }"#).unwrap();
    let desktop = desktop_with_windows(1, 2);
    let mut manager = manager_for(&desktop, &config);

    manager.apply_layout(Rect::new(0.0, 0.0, 1000.0, 800.0));
    assert_eq!(desktop.frame_of(WindowHandle(1)), Some(Rect::new(0.0, 0.0, 600.0, 800.0)));

    manager.dispatch(Action::IncreaseMasterRatio).unwrap();
    manager.retile();
    assert_eq!(desktop.frame_of(WindowHandle(1)), Some(Rect::new(0.0, 0.0, 650.0, 800.0)));
    assert_eq!(desktop.frame_of(WindowHandle(2)), Some(Rect::new(650.0, 0.0, 350.0, 800.0)));
}

#[test]
fn test_windows_come_and_go() {
    let desktop = desktop_with_windows(1, 3);
    let mut manager = manager_for(&desktop, &MwmConfig::default());

    manager.dispatch(Action::Focus(Direction::Right)).unwrap();
    assert_eq!(manager.focused(), Some(WindowId::new(2)));

    desktop.close_window(WindowHandle(2));
    manager.sync_windows(desktop.enumerate());
    assert_eq!(manager.focused(), None);
    assert_eq!(manager.registry().order(), ids(&[1, 3]).as_slice());

    desktop.add_window(WindowHandle(9), "Browser", "docs", Rect::new(0.0, 0.0, 800.0, 600.0));
    manager.sync_windows(desktop.enumerate());
    assert_eq!(manager.id_of(WindowHandle(9)), Some(WindowId::new(4)));
    assert_eq!(manager.registry().count(), 3);

    desktop.set_minimized(WindowHandle(3), true);
    manager.sync_windows(desktop.enumerate());
    assert_eq!(manager.registry().order(), ids(&[1, 4]).as_slice());
    manager.registry().check_invariants().unwrap();
}

#[test]
fn test_degraded_host_keeps_state_consistent() {
    let mut manager = TilingManager::new(Capabilities::unavailable(), ManagerSettings::default());
    let desktop = desktop_with_windows(1, 2);
    manager.sync_windows(desktop.enumerate());

    assert_eq!(manager.apply_layout(SCREEN), 0);
    assert!(manager.dispatch(Action::Promote).is_ok());
    assert!(manager.dispatch(Action::SwitchToSpace(2)).is_err());
    assert!(manager.directory().all_spaces().is_empty());
    manager.registry().check_invariants().unwrap();
}

// ============================================================================
// Migration
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_migration_through_manager() {
    let desktop = desktop_with_windows(3, 2);
    desktop.set_shortcut_enabled(2, false);
    let mut manager = manager_for(&desktop, &MwmConfig::default());
    manager.apply_layout(SCREEN);

    let DispatchOutcome::MigrationStarted { ticket, .. } = manager.dispatch(Action::MoveToSpace(2)).unwrap() else {
        panic!("expected migration to start");
    };
    ticket.wait().await.unwrap();

    assert_eq!(desktop.space_of(WindowHandle(1)), Some(2));
    assert_eq!(desktop.space_of(WindowHandle(2)), Some(1));
    assert!(!desktop.is_shortcut_enabled(2));
    assert!(!desktop.is_pointer_held());

    // The grab point sits inside the title bar of the laid-out master frame.
    let events = desktop.events();
    let InputEvent::Pointer { point, .. } = events[0].event else {
        panic!("expected pointer event first");
    };
    assert!((point.x - 110.0).abs() < f64::EPSILON);
    assert!((point.y - 22.0).abs() < f64::EPSILON);
    assert_eq!(events.last().unwrap().event.pointer_kind(), Some(PointerEventKind::Up));
}

#[tokio::test(start_paused = true)]
async fn test_migration_single_flight() {
    let desktop = desktop_with_windows(3, 1);
    let mut manager = manager_for(&desktop, &MwmConfig::default());

    let first = manager.dispatch(Action::MoveToSpace(2)).unwrap();
    let err = manager.dispatch(Action::MoveToSpace(3)).unwrap_err();
    assert!(matches!(err, TilingError::Migration(MigrationError::Busy(_))));

    let DispatchOutcome::MigrationStarted { ticket, .. } = first else {
        panic!("expected migration to start");
    };
    ticket.wait().await.unwrap();
    assert_eq!(desktop.space_of(WindowHandle(1)), Some(2));
}

#[tokio::test(start_paused = true)]
async fn test_migration_cancel_releases_pointer() {
    let desktop = desktop_with_windows(3, 1);
    let mut manager = manager_for(&desktop, &MwmConfig::default());

    let DispatchOutcome::MigrationStarted { ticket, .. } = manager.dispatch(Action::MoveToSpace(3)).unwrap() else {
        panic!("expected migration to start");
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(manager.cancel_migration());

    assert_eq!(ticket.wait().await, Err(MigrationError::Cancelled));
    assert!(!desktop.is_pointer_held());
    assert_eq!(desktop.active_ordinal(), 1);
    assert_eq!(manager.migration_phase(), MigrationPhase::Failed);
}

// ============================================================================
// Actor
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_actor_end_to_end() {
    let desktop = desktop_with_windows(3, 3);
    let manager = manager_for(&desktop, &MwmConfig::default());
    let handle = TilingActor::spawn(manager, BindingTable::defaults());

    handle.send_async(TilingMessage::SetScreen(SCREEN)).await.unwrap();
    handle
        .send_async(TilingMessage::Hotkey("alt+l".parse::<Binding>().unwrap()))
        .await
        .unwrap();
    handle
        .send_async(TilingMessage::Hotkey("alt+return".parse::<Binding>().unwrap()))
        .await
        .unwrap();

    let state = handle.state().await.unwrap();
    let order: Vec<WindowId> = state.windows.iter().map(|window| window.id).collect();
    assert_eq!(order, ids(&[2, 1, 3]));
    assert_eq!(state.focused, Some(WindowId::new(2)));
    assert_eq!(desktop.frame_of(WindowHandle(2)), Some(Rect::new(10.0, 10.0, 945.0, 1060.0)));

    handle
        .send_async(TilingMessage::Hotkey("alt+shift+3".parse::<Binding>().unwrap()))
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert_eq!(desktop.space_of(WindowHandle(2)), Some(3));
    let QueryResult::Focused(focused) = handle.query(TilingQuery::Focused).await.unwrap() else {
        panic!("expected focused result");
    };
    assert_eq!(focused, Some(WindowId::new(2)));

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_actor_uses_configured_bindings() {
    let config: MwmConfig =
        serde_json::from_str(r#"{ "keybindings": { "Cmd+P": "promote", "Option+Return": "" } }"#).unwrap();
    let desktop = desktop_with_windows(1, 2);
    let manager = manager_for(&desktop, &config);
    let handle = TilingActor::spawn(manager, BindingTable::with_overrides(&config.keybindings));

    handle.send_async(TilingMessage::Action(Action::Focus(Direction::Right))).await.unwrap();
    handle
        .send_async(TilingMessage::Hotkey("Option+Return".parse().unwrap()))
        .await
        .unwrap();
    let state = handle.state().await.unwrap();
    assert_eq!(state.windows[0].id, WindowId::new(1));

    handle
        .send_async(TilingMessage::Hotkey("Command+P".parse().unwrap()))
        .await
        .unwrap();
    let state = handle.state().await.unwrap();
    assert_eq!(state.windows[0].id, WindowId::new(2));
}
