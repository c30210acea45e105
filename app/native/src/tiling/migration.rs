//! Window migration between spaces.
//!
//! The host offers no direct "move window to desktop N" call, so a migration
//! replays what a user would do by hand: grab the window by its title bar,
//! press the desktop switch shortcut while holding it, then let go once the
//! switch animation has finished.
//!
//! # Flow
//!
//! ```text
//! Idle -> Resolving -> Grabbing -> Switching -> Releasing -> Done
//!             |            |            |
//!             v            v            v
//!           Failed       Failed       Failed   (pointer is always released)
//! ```
//!
//! 1. **Resolving**: the switch shortcut for the target space is looked up
//!    (and temporarily enabled if the user disabled it)
//! 2. **Grabbing**: pointer-down then pointer-drag at the grab point
//! 3. **Switching**: after the grab delay, the shortcut is pressed and released
//! 4. **Releasing**: after the release delay, pointer-up at the same point
//!
//! # Single Flight
//!
//! At most one migration runs at a time. A request arriving while another one
//! is in flight is rejected with [`MigrationError::Busy`], never queued. The
//! delays are tokio timers inside one spawned task, so the caller's event loop
//! keeps running during the ~450 ms a migration takes.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::oneshot;
use tokio::time::Instant;

use super::constants::migration::{GRAB_DELAY_MS, GRAB_OFFSET_X, GRAB_OFFSET_Y, RELEASE_DELAY_MS};
use super::state::{Point, Rect, WindowHandle};
use super::workspace::{ShortcutGrant, WorkspaceDirectory};
use crate::platform::{InputSynthesizer, PlatformError, PointerEventKind};

// ============================================================================
// Types
// ============================================================================

/// Phase of the migration state machine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MigrationPhase {
    /// Nothing has been requested yet.
    #[default]
    Idle,
    /// Looking up the switch shortcut.
    Resolving,
    /// Pointer is down on the title bar.
    Grabbing,
    /// Switch shortcut posted, waiting for the animation.
    Switching,
    /// Posting pointer-up.
    Releasing,
    /// Finished successfully.
    Done,
    /// Finished unsuccessfully.
    Failed,
}

impl MigrationPhase {
    /// Returns `true` for `Done` and `Failed`.
    #[must_use]
    pub const fn is_terminal(self) -> bool { matches!(self, Self::Done | Self::Failed) }

    /// Returns `true` while a migration occupies the single-flight slot.
    #[must_use]
    pub const fn is_in_flight(self) -> bool { !matches!(self, Self::Idle | Self::Done | Self::Failed) }
}

impl fmt::Display for MigrationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Resolving => "resolving",
            Self::Grabbing => "grabbing",
            Self::Switching => "switching",
            Self::Releasing => "releasing",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// A request to move one window to another space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MigrationRequest {
    /// Host handle of the window.
    pub handle: WindowHandle,
    /// Current frame of the window.
    pub frame: Rect,
    /// 1-based number of the target space.
    pub target_space: usize,
}

/// Delays and grab point used by the migration protocol.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MigrationTiming {
    /// From pointer-down to the switch shortcut.
    pub grab_delay: Duration,
    /// From the switch shortcut to pointer-up.
    pub release_delay: Duration,
    /// Offset of the grab point from the frame's top-left corner.
    pub grab_offset: (f64, f64),
}

impl Default for MigrationTiming {
    fn default() -> Self {
        Self {
            grab_delay: Duration::from_millis(GRAB_DELAY_MS),
            release_delay: Duration::from_millis(RELEASE_DELAY_MS),
            grab_offset: (GRAB_OFFSET_X, GRAB_OFFSET_Y),
        }
    }
}

impl MigrationTiming {
    /// Total time from grab to release.
    #[must_use]
    pub fn total(&self) -> Duration { self.grab_delay + self.release_delay }
}

/// Errors from a migration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MigrationError {
    /// Another migration is in flight.
    #[error("A migration is already in progress ({0})")]
    Busy(MigrationPhase),

    /// The target space number does not exist.
    #[error("Space {0} does not exist")]
    InvalidSpace(usize),

    /// No switch shortcut can be used for the target space.
    #[error("No usable switch shortcut for space {0}")]
    ShortcutUnavailable(usize),

    /// Posting synthetic input failed.
    #[error("Input synthesis failed: {0}")]
    Input(#[from] PlatformError),

    /// The migration was cancelled before completing.
    #[error("Migration cancelled")]
    Cancelled,

    /// `submit` was called outside a Tokio runtime.
    #[error("Migration requires a Tokio runtime")]
    NoRuntime,
}

// ============================================================================
// Ticket
// ============================================================================

/// Completion handle for a submitted migration.
#[derive(Debug)]
pub struct MigrationTicket {
    done: oneshot::Receiver<Result<(), MigrationError>>,
}

impl MigrationTicket {
    /// Waits for the migration to reach a terminal phase.
    ///
    /// # Errors
    ///
    /// Returns the error that made the migration fail.
    pub async fn wait(self) -> Result<(), MigrationError> {
        self.done.await.unwrap_or(Err(MigrationError::Cancelled))
    }
}

// ============================================================================
// Coordinator
// ============================================================================

#[derive(Debug, Default)]
struct Slot {
    phase: MigrationPhase,
    cancel: Option<oneshot::Sender<()>>,
}

/// Runs the drag-and-switch protocol, one migration at a time.
pub struct MigrationCoordinator {
    directory: Arc<WorkspaceDirectory>,
    input: Arc<dyn InputSynthesizer>,
    timing: MigrationTiming,
    restore_shortcut_state: bool,
    slot: Arc<Mutex<Slot>>,
}

impl fmt::Debug for MigrationCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationCoordinator")
            .field("timing", &self.timing)
            .field("phase", &self.phase())
            .finish_non_exhaustive()
    }
}

impl MigrationCoordinator {
    /// Creates an idle coordinator.
    #[must_use]
    pub fn new(
        directory: Arc<WorkspaceDirectory>,
        input: Arc<dyn InputSynthesizer>,
        timing: MigrationTiming,
    ) -> Self {
        Self {
            directory,
            input,
            timing,
            restore_shortcut_state: true,
            slot: Arc::new(Mutex::new(Slot::default())),
        }
    }

    /// Sets whether a shortcut enabled for a migration is disabled again afterwards.
    #[must_use]
    pub fn with_shortcut_restore(mut self, restore: bool) -> Self {
        self.restore_shortcut_state = restore;
        self
    }

    /// Returns the protocol timing.
    #[must_use]
    pub const fn timing(&self) -> &MigrationTiming { &self.timing }

    /// Returns the current phase.
    #[must_use]
    pub fn phase(&self) -> MigrationPhase { self.slot.lock().phase }

    /// Starts a migration.
    ///
    /// Resolution happens synchronously; on success the input sequence runs on
    /// a spawned task and the returned ticket completes when it finishes.
    ///
    /// # Errors
    ///
    /// - [`MigrationError::Busy`] if a migration is already in flight
    /// - [`MigrationError::InvalidSpace`] if the target space does not exist
    /// - [`MigrationError::ShortcutUnavailable`] if no shortcut can be used
    /// - [`MigrationError::NoRuntime`] outside a Tokio runtime
    pub fn submit(&self, request: MigrationRequest) -> Result<MigrationTicket, MigrationError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| MigrationError::NoRuntime)?;

        let mut slot = self.slot.lock();
        if slot.phase.is_in_flight() {
            tracing::info!(
                target_space = request.target_space,
                phase = %slot.phase,
                "migration rejected, another one is in flight"
            );
            return Err(MigrationError::Busy(slot.phase));
        }

        slot.phase = MigrationPhase::Resolving;
        tracing::debug!(
            handle = %request.handle,
            target_space = request.target_space,
            "migration resolving"
        );

        let grant = match self.resolve(request.target_space) {
            Ok(grant) => grant,
            Err(err) => {
                slot.phase = MigrationPhase::Failed;
                tracing::info!(target_space = request.target_space, error = %err, "migration failed");
                return Err(err);
            }
        };

        let (cancel_tx, cancel_rx) = oneshot::channel();
        let (done_tx, done_rx) = oneshot::channel();
        slot.phase = MigrationPhase::Grabbing;
        slot.cancel = Some(cancel_tx);
        drop(slot);

        let (dx, dy) = self.timing.grab_offset;
        let flight = Flight {
            directory: Arc::clone(&self.directory),
            input: Arc::clone(&self.input),
            slot: Arc::clone(&self.slot),
            timing: self.timing,
            restore_shortcut_state: self.restore_shortcut_state,
            grant,
            point: request.frame.offset_from_origin(dx, dy),
        };

        runtime.spawn(async move {
            let result = flight.run(cancel_rx).await;
            let _ = done_tx.send(result);
        });

        Ok(MigrationTicket { done: done_rx })
    }

    /// Aborts the in-flight migration at its next wait point.
    ///
    /// The pointer is released before the migration ends in `Failed`.
    /// Returns `false` if nothing was in flight or the pointer is already
    /// being released.
    pub fn cancel(&self) -> bool {
        let mut slot = self.slot.lock();
        if !slot.phase.is_in_flight() {
            return false;
        }
        let Some(cancel) = slot.cancel.take() else {
            return false;
        };
        drop(slot);
        tracing::debug!("migration cancel requested");
        cancel.send(()).is_ok()
    }

    fn resolve(&self, target_space: usize) -> Result<ShortcutGrant, MigrationError> {
        if target_space == 0 {
            return Err(MigrationError::InvalidSpace(target_space));
        }

        // A stale snapshot may not know a space created moments ago.
        if self.directory.is_available()
            && self.directory.space_at(target_space).is_none()
            && self.directory.force_refresh().at(target_space).is_none()
        {
            return Err(MigrationError::InvalidSpace(target_space));
        }

        self.directory
            .switch_shortcut(target_space)
            .map_err(|_| MigrationError::ShortcutUnavailable(target_space))
    }
}

// ============================================================================
// In-Flight Migration
// ============================================================================

struct Flight {
    directory: Arc<WorkspaceDirectory>,
    input: Arc<dyn InputSynthesizer>,
    slot: Arc<Mutex<Slot>>,
    timing: MigrationTiming,
    restore_shortcut_state: bool,
    grant: ShortcutGrant,
    point: Point,
}

impl Flight {
    async fn run(self, mut cancel: oneshot::Receiver<()>) -> Result<(), MigrationError> {
        let result = self.drive(&mut cancel).await;

        if self.restore_shortcut_state {
            self.directory.restore_shortcut(&self.grant);
        }

        let mut slot = self.slot.lock();
        slot.cancel = None;
        slot.phase = if result.is_ok() { MigrationPhase::Done } else { MigrationPhase::Failed };
        match &result {
            Ok(()) => tracing::debug!(target_space = self.grant.ordinal, "migration done"),
            Err(err) => tracing::info!(target_space = self.grant.ordinal, error = %err, "migration failed"),
        }
        result
    }

    async fn drive(&self, cancel: &mut oneshot::Receiver<()>) -> Result<(), MigrationError> {
        let grabbed_at = Instant::now();
        tracing::debug!(point = ?self.point, "migration grabbing");
        self.input.post_pointer(PointerEventKind::Down, self.point, true)?;

        // From here on the pointer is logically down and must be released.
        self.input
            .post_pointer(PointerEventKind::Dragged, self.point, true)
            .inspect_err(|_| self.release())?;

        if wait_or_cancel(grabbed_at + self.timing.grab_delay, cancel).await {
            self.release();
            return Err(MigrationError::Cancelled);
        }

        self.set_phase(MigrationPhase::Switching);
        let switched_at = Instant::now();
        let shortcut = self.grant.shortcut;
        self.input
            .post_key(shortcut.key_code, shortcut.modifiers, true)
            .and_then(|()| self.input.post_key(shortcut.key_code, shortcut.modifiers, false))
            .inspect_err(|_| self.release())?;

        if wait_or_cancel(switched_at + self.timing.release_delay, cancel).await {
            self.release();
            return Err(MigrationError::Cancelled);
        }

        self.enter_releasing();
        self.input.post_pointer(PointerEventKind::Up, self.point, false)?;
        Ok(())
    }

    fn set_phase(&self, phase: MigrationPhase) {
        tracing::debug!(%phase, "migration phase");
        self.slot.lock().phase = phase;
    }

    /// Past this point the migration can no longer be cancelled.
    fn enter_releasing(&self) {
        tracing::debug!(phase = %MigrationPhase::Releasing, "migration phase");
        let mut slot = self.slot.lock();
        slot.phase = MigrationPhase::Releasing;
        slot.cancel = None;
    }

    fn release(&self) {
        self.enter_releasing();
        if let Err(err) = self.input.post_pointer(PointerEventKind::Up, self.point, false) {
            tracing::warn!(error = %err, "could not release pointer after failed migration");
        }
    }
}

/// Sleeps until `deadline`. Returns `true` if cancelled first.
async fn wait_or_cancel(deadline: Instant, cancel: &mut oneshot::Receiver<()>) -> bool {
    tokio::select! {
        biased;
        _ = cancel => true,
        () = tokio::time::sleep_until(deadline) => false,
    }
}
