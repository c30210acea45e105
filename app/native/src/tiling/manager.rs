//! Tiling manager context.
//!
//! The manager owns all tiling state (registry, focus, layout config, the
//! handle/id correlation) and the platform capabilities it acts through. It
//! is a plain value with `&mut self` methods; serialization of access is the
//! job of whoever owns it, normally the [`TilingActor`](super::actor::TilingActor).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use super::error::{TilingError, TilingResult};
use super::layout::{self, LayoutConfig};
use super::migration::{
    MigrationCoordinator, MigrationError, MigrationPhase, MigrationRequest, MigrationTicket,
    MigrationTiming,
};
use super::navigation::NavigationController;
use super::registry::WindowRegistry;
use super::state::{ManagedWindow, NewWindow, Rect, WindowHandle, WindowId};
use super::workspace::WorkspaceDirectory;
use crate::config::MwmConfig;
use crate::hotkey::Action;
use crate::platform::{Capabilities, WindowSnapshot};

// ============================================================================
// Types
// ============================================================================

/// Settings the manager is built with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManagerSettings {
    /// Initial layout settings.
    pub layout: LayoutConfig,
    /// Space enumeration cache TTL.
    pub cache_ttl: Duration,
    /// Migration protocol timing.
    pub migration: MigrationTiming,
    /// Whether temporarily enabled switch shortcuts are disabled again.
    pub restore_shortcut_state: bool,
}

impl Default for ManagerSettings {
    fn default() -> Self { Self::from(&MwmConfig::default()) }
}

impl From<&MwmConfig> for ManagerSettings {
    fn from(config: &MwmConfig) -> Self {
        Self {
            layout: config.layout.to_layout_config(),
            cache_ttl: config.workspaces.cache_ttl(),
            migration: config.migration.timing(),
            restore_shortcut_state: config.migration.restore_shortcut_state,
        }
    }
}

/// What a dispatched action did.
#[derive(Debug)]
pub enum DispatchOutcome {
    /// Nothing changed.
    Unchanged,
    /// Focus moved to a window.
    FocusChanged(WindowId),
    /// The window order changed.
    OrderChanged,
    /// The master ratio changed to the given value.
    RatioChanged(f64),
    /// The layout should be re-applied.
    Retile,
    /// The host was asked to switch to a space.
    SpaceSwitched(usize),
    /// A window migration is running.
    MigrationStarted {
        /// The migrating window.
        window_id: WindowId,
        /// Target space number.
        target_space: usize,
        /// Completion handle.
        ticket: MigrationTicket,
    },
}

impl DispatchOutcome {
    /// Returns `true` if the layout should be re-applied after this outcome.
    #[must_use]
    pub const fn needs_layout(&self) -> bool {
        matches!(self, Self::OrderChanged | Self::RatioChanged(_) | Self::Retile)
    }
}

/// Serializable view of the manager state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerState {
    /// Windows in tiling order.
    pub windows: Vec<ManagedWindow>,
    /// Focused window.
    pub focused: Option<WindowId>,
    /// Current layout settings.
    pub layout: LayoutConfig,
    /// Screen frame last used for layout.
    pub screen: Option<Rect>,
    /// Phase of the migration state machine.
    pub migration_phase: MigrationPhase,
}

// ============================================================================
// Tiling Manager
// ============================================================================

/// Owns the tiling state and applies actions through the platform.
#[derive(Debug)]
pub struct TilingManager {
    capabilities: Capabilities,
    registry: WindowRegistry,
    navigation: NavigationController,
    layout: LayoutConfig,
    screen: Option<Rect>,
    handle_to_id: HashMap<WindowHandle, WindowId>,
    id_to_handle: HashMap<WindowId, WindowHandle>,
    directory: Arc<WorkspaceDirectory>,
    migration: MigrationCoordinator,
}

impl TilingManager {
    /// Creates a manager with no windows.
    #[must_use]
    pub fn new(capabilities: Capabilities, settings: ManagerSettings) -> Self {
        let directory = Arc::new(WorkspaceDirectory::with_ttl(
            Arc::clone(&capabilities.spaces),
            settings.cache_ttl,
        ));
        let migration = MigrationCoordinator::new(
            Arc::clone(&directory),
            Arc::clone(&capabilities.input),
            settings.migration,
        )
        .with_shortcut_restore(settings.restore_shortcut_state);

        Self {
            capabilities,
            registry: WindowRegistry::new(),
            navigation: NavigationController::new(),
            layout: settings.layout,
            screen: None,
            handle_to_id: HashMap::new(),
            id_to_handle: HashMap::new(),
            directory,
            migration,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Returns the window registry.
    #[must_use]
    pub const fn registry(&self) -> &WindowRegistry { &self.registry }

    /// Returns the focused window.
    #[must_use]
    pub const fn focused(&self) -> Option<WindowId> { self.navigation.focused() }

    /// Returns the layout settings.
    #[must_use]
    pub const fn layout_config(&self) -> &LayoutConfig { &self.layout }

    /// Returns the screen frame used for layout, if known.
    #[must_use]
    pub const fn screen(&self) -> Option<Rect> { self.screen }

    /// Returns the space directory.
    #[must_use]
    pub fn directory(&self) -> &WorkspaceDirectory { &self.directory }

    /// Returns the current migration phase.
    #[must_use]
    pub fn migration_phase(&self) -> MigrationPhase { self.migration.phase() }

    /// Returns the host handle of a managed window.
    #[must_use]
    pub fn handle_of(&self, id: WindowId) -> Option<WindowHandle> { self.id_to_handle.get(&id).copied() }

    /// Returns the id assigned to a host handle.
    #[must_use]
    pub fn id_of(&self, handle: WindowHandle) -> Option<WindowId> { self.handle_to_id.get(&handle).copied() }

    /// Returns a serializable snapshot of the state.
    #[must_use]
    pub fn state(&self) -> ManagerState {
        ManagerState {
            windows: self.registry.iter().cloned().collect(),
            focused: self.navigation.focused(),
            layout: self.layout,
            screen: self.screen,
            migration_phase: self.migration.phase(),
        }
    }

    // ========================================================================
    // Window Lifecycle
    // ========================================================================

    /// Handles a window reported by the host.
    ///
    /// A new handle gets a fresh id and joins the stack; a known handle only
    /// has its title and frame refreshed. Minimized windows are not managed.
    /// If nothing is focused, the window becomes focused.
    pub fn window_appeared(&mut self, snapshot: WindowSnapshot) -> Option<WindowId> {
        if snapshot.is_minimized {
            tracing::trace!(handle = %snapshot.handle, "ignoring minimized window");
            return None;
        }

        if let Some(id) = self.id_of(snapshot.handle) {
            self.registry.update_title(id, &snapshot.title);
            self.registry.update_frame(id, snapshot.frame);
            return Some(id);
        }

        let id = self.registry.register(NewWindow::tiled(
            snapshot.app_name,
            snapshot.title,
            snapshot.frame,
        ));
        self.handle_to_id.insert(snapshot.handle, id);
        self.id_to_handle.insert(id, snapshot.handle);

        if self.navigation.focused().is_none() {
            self.navigation.set_focus(id, &self.registry);
        }

        tracing::debug!(
            window_id = %id,
            handle = %snapshot.handle,
            count = self.registry.count(),
            "window managed"
        );
        Some(id)
    }

    /// Handles a window the host reports as gone.
    pub fn window_vanished(&mut self, handle: WindowHandle) -> Option<WindowId> {
        let id = self.handle_to_id.remove(&handle)?;
        self.id_to_handle.remove(&id);
        self.registry.remove(id);
        self.navigation.on_window_removed(id);
        tracing::debug!(window_id = %id, %handle, count = self.registry.count(), "window retired");
        Some(id)
    }

    /// Reconciles the managed set with a full host enumeration.
    ///
    /// Handles not present in `windows` (or now minimized) are retired.
    /// Returns the number of managed windows afterwards.
    pub fn sync_windows(&mut self, windows: impl IntoIterator<Item = WindowSnapshot>) -> usize {
        let mut seen = Vec::new();
        for snapshot in windows {
            let handle = snapshot.handle;
            if self.window_appeared(snapshot).is_some() {
                seen.push(handle);
            }
        }

        let stale: Vec<WindowHandle> =
            self.handle_to_id.keys().filter(|handle| !seen.contains(handle)).copied().collect();
        for handle in stale {
            self.window_vanished(handle);
        }

        tracing::debug!("{}", self.registry.describe());
        self.registry.count()
    }

    /// Marks a window floating (excluded from layout) or tiled.
    pub fn set_floating(&mut self, id: WindowId, floating: bool) -> bool {
        self.registry.set_floating(id, floating)
    }

    // ========================================================================
    // Layout
    // ========================================================================

    /// Records the screen frame used by [`retile`](Self::retile).
    pub const fn set_screen(&mut self, screen: Rect) { self.screen = Some(screen); }

    /// Replaces the layout settings. The ratio is clamped.
    pub fn set_layout_config(&mut self, gaps: u32, padding: u32, master_ratio: f64) {
        self.layout.set(gaps, padding, master_ratio);
        tracing::debug!(gaps, padding, master_ratio = self.layout.master_ratio(), "layout config updated");
    }

    /// Computes the layout for the tiled windows and moves them.
    ///
    /// Returns the number of windows the host accepted a frame for.
    pub fn apply_layout(&mut self, screen: Rect) -> usize {
        self.screen = Some(screen);
        let tiled: Vec<WindowId> = self.registry.tiled().map(|window| window.id).collect();
        let commands = layout::compute(&tiled, &screen, &self.layout);

        let mut applied = 0;
        for command in &commands {
            let Some(handle) = self.handle_of(command.window_id) else {
                continue;
            };
            if self.capabilities.windows.set_frame(handle, command.frame) {
                self.registry.update_frame(command.window_id, command.frame);
                applied += 1;
            } else {
                tracing::debug!(window_id = %command.window_id, %handle, "host rejected frame");
            }
        }

        tracing::debug!(windows = commands.len(), applied, %screen, "layout applied");
        applied
    }

    /// Re-applies the layout on the last known screen. Returns `None` if no
    /// screen is known yet.
    pub fn retile(&mut self) -> Option<usize> {
        let screen = self.screen?;
        Some(self.apply_layout(screen))
    }

    // ========================================================================
    // Actions
    // ========================================================================

    /// Runs a logical action.
    ///
    /// Layout is not re-applied here; check [`DispatchOutcome::needs_layout`].
    ///
    /// # Errors
    ///
    /// - [`TilingError::NoFocusedWindow`] for a migration without focus
    /// - [`TilingError::ShortcutUnavailable`] if a space switch cannot be posted
    /// - [`TilingError::Migration`] if a migration is rejected
    pub fn dispatch(&mut self, action: Action) -> TilingResult<DispatchOutcome> {
        tracing::debug!(%action, "dispatching action");

        let outcome = match action {
            Action::Focus(direction) => match self.navigation.focus(direction, &self.registry) {
                Some(id) => {
                    self.request_focus(id);
                    DispatchOutcome::FocusChanged(id)
                }
                None => DispatchOutcome::Unchanged,
            },
            Action::Move(direction) => {
                if self.navigation.move_focused(direction, &mut self.registry) {
                    DispatchOutcome::OrderChanged
                } else {
                    DispatchOutcome::Unchanged
                }
            }
            Action::IncreaseMasterRatio => self.step_ratio(LayoutConfig::increase_master_ratio),
            Action::DecreaseMasterRatio => self.step_ratio(LayoutConfig::decrease_master_ratio),
            Action::Retile => DispatchOutcome::Retile,
            Action::Promote => {
                if self.navigation.promote_focused(&mut self.registry) {
                    DispatchOutcome::OrderChanged
                } else {
                    DispatchOutcome::Unchanged
                }
            }
            Action::SwitchToSpace(number) => {
                self.switch_to_space(number)?;
                DispatchOutcome::SpaceSwitched(number)
            }
            Action::MoveToSpace(number) => self.move_focused_to_space(number)?,
        };

        Ok(outcome)
    }

    fn step_ratio(&mut self, step: fn(&mut LayoutConfig) -> f64) -> DispatchOutcome {
        let before = self.layout.master_ratio();
        let after = step(&mut self.layout);
        if (after - before).abs() < f64::EPSILON {
            DispatchOutcome::Unchanged
        } else {
            DispatchOutcome::RatioChanged(after)
        }
    }

    fn request_focus(&self, id: WindowId) {
        if let Some(handle) = self.handle_of(id) {
            if !self.capabilities.windows.request_focus(handle) {
                tracing::debug!(window_id = %id, %handle, "host did not focus window");
            }
        }
    }

    fn switch_to_space(&self, number: usize) -> TilingResult<()> {
        // A switch during a migration would carry the held window along.
        let phase = self.migration.phase();
        if phase.is_in_flight() {
            tracing::info!(space = number, %phase, "space switch rejected, migration in flight");
            return Err(MigrationError::Busy(phase).into());
        }

        let grant = self.directory.switch_shortcut(number)?;
        let shortcut = grant.shortcut;
        let posted = self
            .capabilities
            .input
            .post_key(shortcut.key_code, shortcut.modifiers, true)
            .and_then(|()| self.capabilities.input.post_key(shortcut.key_code, shortcut.modifiers, false));

        self.directory.restore_shortcut(&grant);
        posted?;
        tracing::debug!(space = number, "space switch posted");
        Ok(())
    }

    fn move_focused_to_space(&self, target_space: usize) -> TilingResult<DispatchOutcome> {
        let window_id = self.navigation.focused().ok_or(TilingError::NoFocusedWindow)?;
        let handle = self.handle_of(window_id).ok_or(TilingError::WindowNotFound(window_id))?;
        let stored = self.registry.get(window_id).ok_or(TilingError::WindowNotFound(window_id))?.frame;
        let frame = self.capabilities.windows.frame(handle).unwrap_or(stored);

        let ticket = self.migration.submit(MigrationRequest { handle, frame, target_space })?;
        tracing::debug!(window_id = %window_id, target_space, "migration started");
        Ok(DispatchOutcome::MigrationStarted { window_id, target_space, ticket })
    }

    /// Cancels an in-flight migration. Returns `false` if none was running.
    pub fn cancel_migration(&self) -> bool { self.migration.cancel() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::simulated::SimulatedDesktop;
    use crate::platform::{Capabilities, SpaceProvider};
    use crate::tiling::navigation::Direction;

    fn screen() -> Rect { Rect::new(0.0, 0.0, 1920.0, 1080.0) }

    fn snapshot(handle: u64) -> WindowSnapshot {
        WindowSnapshot {
            handle: WindowHandle(handle),
            app_name: format!("App{handle}"),
            title: format!("Window {handle}"),
            frame: Rect::new(100.0, 100.0, 640.0, 480.0),
            is_minimized: false,
        }
    }

    fn setup(windows: u64) -> (Arc<SimulatedDesktop>, TilingManager) {
        let desktop = Arc::new(SimulatedDesktop::new(3));
        for handle in 1..=windows {
            let s = snapshot(handle);
            desktop.add_window(s.handle, &s.app_name, &s.title, s.frame);
        }
        let mut manager = TilingManager::new(Capabilities::simulated(&desktop), ManagerSettings::default());
        manager.sync_windows(desktop.enumerate());
        (desktop, manager)
    }

    // ========================================================================
    // Window Lifecycle
    // ========================================================================

    #[test]
    fn test_sync_assigns_sequential_ids() {
        let (_, manager) = setup(3);
        assert_eq!(manager.registry().count(), 3);
        assert_eq!(manager.id_of(WindowHandle(1)), Some(WindowId::new(1)));
        assert_eq!(manager.handle_of(WindowId::new(3)), Some(WindowHandle(3)));
        assert_eq!(manager.focused(), Some(WindowId::new(1)));
        manager.registry().check_invariants().unwrap();
    }

    #[test]
    fn test_known_handle_only_refreshes() {
        let (_, mut manager) = setup(1);
        let mut updated = snapshot(1);
        updated.title = "Renamed".to_string();

        assert_eq!(manager.window_appeared(updated), Some(WindowId::new(1)));
        assert_eq!(manager.registry().count(), 1);
        assert_eq!(manager.registry().get(WindowId::new(1)).unwrap().title, "Renamed");
    }

    #[test]
    fn test_minimized_window_is_ignored() {
        let (_, mut manager) = setup(0);
        let mut minimized = snapshot(9);
        minimized.is_minimized = true;
        assert_eq!(manager.window_appeared(minimized), None);
        assert!(manager.registry().is_empty());
    }

    #[test]
    fn test_vanished_window_clears_focus() {
        let (_, mut manager) = setup(2);
        assert_eq!(manager.window_vanished(WindowHandle(1)), Some(WindowId::new(1)));
        assert_eq!(manager.focused(), None);
        assert_eq!(manager.window_vanished(WindowHandle(1)), None);
        assert_eq!(manager.registry().order(), &[WindowId::new(2)]);
    }

    #[test]
    fn test_sync_retires_missing_windows() {
        let (desktop, mut manager) = setup(3);
        desktop.close_window(WindowHandle(2));
        assert_eq!(manager.sync_windows(desktop.enumerate()), 2);
        assert_eq!(manager.id_of(WindowHandle(2)), None);
        manager.registry().check_invariants().unwrap();
    }

    // ========================================================================
    // Layout
    // ========================================================================

    #[test]
    fn test_apply_layout_moves_windows() {
        let (desktop, mut manager) = setup(2);
        assert_eq!(manager.apply_layout(screen()), 2);
        assert_eq!(desktop.frame_of(WindowHandle(1)), Some(Rect::new(10.0, 10.0, 945.0, 1060.0)));
        assert_eq!(desktop.frame_of(WindowHandle(2)), Some(Rect::new(965.0, 10.0, 945.0, 1060.0)));
        assert_eq!(
            manager.registry().get(WindowId::new(2)).unwrap().frame,
            Rect::new(965.0, 10.0, 945.0, 1060.0)
        );
    }

    #[test]
    fn test_floating_windows_are_not_tiled() {
        let (desktop, mut manager) = setup(2);
        assert!(manager.set_floating(WindowId::new(2), true));
        assert_eq!(manager.apply_layout(screen()), 1);
        assert_eq!(desktop.frame_of(WindowHandle(1)), Some(Rect::new(10.0, 10.0, 1900.0, 1060.0)));
        assert_eq!(desktop.frame_of(WindowHandle(2)), Some(Rect::new(100.0, 100.0, 640.0, 480.0)));
    }

    #[test]
    fn test_retile_requires_screen() {
        let (_, mut manager) = setup(1);
        assert_eq!(manager.retile(), None);
        manager.set_screen(screen());
        assert_eq!(manager.retile(), Some(1));
    }

    #[test]
    fn test_apply_layout_without_host_updates_nothing() {
        let mut manager = TilingManager::new(Capabilities::unavailable(), ManagerSettings::default());
        manager.window_appeared(snapshot(1));
        assert_eq!(manager.apply_layout(screen()), 0);
        assert_eq!(
            manager.registry().get(WindowId::new(1)).unwrap().frame,
            snapshot(1).frame
        );
    }

    // ========================================================================
    // Actions
    // ========================================================================

    #[test]
    fn test_focus_action_requests_host_focus() {
        let (desktop, mut manager) = setup(3);
        let outcome = manager.dispatch(Action::Focus(Direction::Right)).unwrap();
        assert!(matches!(outcome, DispatchOutcome::FocusChanged(id) if id == WindowId::new(2)));
        assert_eq!(desktop.focused(), Some(WindowHandle(2)));
    }

    #[test]
    fn test_move_action_changes_order() {
        let (_, mut manager) = setup(3);
        let outcome = manager.dispatch(Action::Move(Direction::Left)).unwrap();
        assert!(outcome.needs_layout());
        assert_eq!(
            manager.registry().order(),
            &[WindowId::new(3), WindowId::new(2), WindowId::new(1)]
        );
        assert_eq!(manager.focused(), Some(WindowId::new(1)));
    }

    #[test]
    fn test_ratio_actions_saturate() {
        let (_, mut manager) = setup(2);
        manager.set_layout_config(10, 10, 0.85);
        assert!(matches!(
            manager.dispatch(Action::IncreaseMasterRatio).unwrap(),
            DispatchOutcome::RatioChanged(r) if (r - 0.9).abs() < f64::EPSILON
        ));
        assert!(matches!(
            manager.dispatch(Action::IncreaseMasterRatio).unwrap(),
            DispatchOutcome::Unchanged
        ));
    }

    #[test]
    fn test_promote_action() {
        let (_, mut manager) = setup(3);
        manager.dispatch(Action::Focus(Direction::Left)).unwrap();
        assert_eq!(manager.focused(), Some(WindowId::new(3)));
        assert!(manager.dispatch(Action::Promote).unwrap().needs_layout());
        assert_eq!(manager.registry().index_of(WindowId::new(3)), Some(0));
    }

    #[test]
    fn test_switch_to_space_posts_shortcut() {
        let (desktop, mut manager) = setup(1);
        let outcome = manager.dispatch(Action::SwitchToSpace(2)).unwrap();
        assert!(matches!(outcome, DispatchOutcome::SpaceSwitched(2)));
        assert_eq!(desktop.active_ordinal(), 2);
        assert_eq!(desktop.events().len(), 2);
    }

    #[test]
    fn test_switch_to_space_restores_disabled_shortcut() {
        let (desktop, mut manager) = setup(1);
        desktop.set_shortcut_enabled(3, false);
        manager.dispatch(Action::SwitchToSpace(3)).unwrap();
        assert_eq!(desktop.active_ordinal(), 3);
        assert!(!desktop.is_shortcut_enabled(3));
    }

    #[test]
    fn test_switch_to_unknown_space_fails() {
        let (_, mut manager) = setup(1);
        assert_eq!(
            manager.dispatch(Action::SwitchToSpace(8)).unwrap_err(),
            TilingError::ShortcutUnavailable(8)
        );
    }

    #[test]
    fn test_move_to_space_without_focus() {
        let (_, mut manager) = setup(0);
        assert_eq!(
            manager.dispatch(Action::MoveToSpace(2)).unwrap_err(),
            TilingError::NoFocusedWindow
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_move_to_space_migrates_focused_window() {
        let (desktop, mut manager) = setup(2);
        manager.apply_layout(screen());

        let outcome = manager.dispatch(Action::MoveToSpace(3)).unwrap();
        let DispatchOutcome::MigrationStarted { window_id, target_space, ticket } = outcome else {
            panic!("expected migration to start");
        };
        assert_eq!(window_id, WindowId::new(1));
        assert_eq!(target_space, 3);

        let busy = manager.dispatch(Action::MoveToSpace(2)).unwrap_err();
        assert!(busy.is_transient());

        ticket.wait().await.unwrap();
        assert_eq!(desktop.space_of(WindowHandle(1)), Some(3));
        assert_eq!(desktop.space_of(WindowHandle(2)), Some(1));
        assert_eq!(manager.migration_phase(), MigrationPhase::Done);
    }

    #[tokio::test(start_paused = true)]
    async fn test_switch_to_space_rejected_during_migration() {
        let (desktop, mut manager) = setup(1);
        manager.apply_layout(screen());

        let DispatchOutcome::MigrationStarted { ticket, .. } = manager.dispatch(Action::MoveToSpace(2)).unwrap()
        else {
            panic!("expected migration to start");
        };
        tokio::time::sleep(Duration::from_millis(100)).await;

        let err = manager.dispatch(Action::SwitchToSpace(3)).unwrap_err();
        assert_eq!(err, TilingError::Migration(MigrationError::Busy(MigrationPhase::Switching)));

        ticket.wait().await.unwrap();
        assert_eq!(desktop.space_of(WindowHandle(1)), Some(2));
        assert_eq!(desktop.active_ordinal(), 2);

        manager.dispatch(Action::SwitchToSpace(3)).unwrap();
        assert_eq!(desktop.active_ordinal(), 3);
        assert_eq!(desktop.space_of(WindowHandle(1)), Some(2));
    }

    #[test]
    fn test_state_snapshot_serializes() {
        let (_, manager) = setup(2);
        let json = serde_json::to_value(manager.state()).unwrap();
        assert_eq!(json["windows"].as_array().unwrap().len(), 2);
        assert_eq!(json["focused"], 1);
        assert_eq!(json["migrationPhase"], "idle");
        assert_eq!(json["layout"]["masterRatio"], 0.5);
    }
}
