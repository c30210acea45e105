//! Tiling actor.
//!
//! The actor owns the [`TilingManager`] and processes messages sequentially on
//! one tokio task. This is the single serialized execution context for all
//! tiling state; nothing else mutates the registry, the focus or the layout
//! settings.
//!
//! After every message that can change what is on screen, the layout is
//! re-applied if a screen frame is known.
//!
//! # Panic Recovery
//!
//! If a message handler panics, the panic is caught and logged and the actor
//! keeps processing subsequent messages.

mod handle;
mod messages;

use std::panic::{AssertUnwindSafe, catch_unwind};

pub use handle::{ActorError, TilingActorHandle};
pub use messages::{QueryResult, TilingMessage, TilingQuery};
use tokio::sync::mpsc;

use super::constants::actor::CHANNEL_CAPACITY;
use super::manager::{DispatchOutcome, TilingManager};
use crate::hotkey::{Action, BindingTable};

/// The actor that owns all tiling state.
pub struct TilingActor {
    manager: TilingManager,
    bindings: BindingTable,
    receiver: mpsc::Receiver<TilingMessage>,
}

impl TilingActor {
    /// Spawn a new tiling actor and return a handle for communication.
    ///
    /// Must be called from within a Tokio runtime.
    #[must_use]
    pub fn spawn(manager: TilingManager, bindings: BindingTable) -> TilingActorHandle {
        tracing::debug!(bindings = bindings.len(), "spawning tiling actor");
        let (sender, receiver) = mpsc::channel(CHANNEL_CAPACITY);

        let actor = Self { manager, bindings, receiver };
        tokio::spawn(actor.run());

        TilingActorHandle::new(sender)
    }

    /// Run the actor's message loop.
    async fn run(mut self) {
        tracing::trace!("tiling actor message loop starting");

        while let Some(msg) = self.receiver.recv().await {
            if matches!(msg, TilingMessage::Shutdown) {
                tracing::debug!("tiling actor received shutdown message");
                return;
            }

            let msg_name = msg.name();
            let result = catch_unwind(AssertUnwindSafe(|| {
                self.handle_message(msg);
            }));

            if let Err(panic_info) = result {
                let panic_msg = panic_info
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| panic_info.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());

                tracing::error!(message = msg_name, panic = %panic_msg, "tiling actor recovered from panic");
            }
        }

        tracing::debug!("tiling actor channel closed, exiting");
    }

    /// Handle a single message.
    fn handle_message(&mut self, msg: TilingMessage) {
        let relayout = match msg {
            TilingMessage::WindowAppeared(snapshot) => self.manager.window_appeared(snapshot).is_some(),
            TilingMessage::WindowVanished { handle } => self.manager.window_vanished(handle).is_some(),
            TilingMessage::SyncWindows(windows) => {
                self.manager.sync_windows(windows);
                true
            }
            TilingMessage::Hotkey(binding) => match self.bindings.lookup(&binding) {
                Some(action) => self.run_action(action),
                None => {
                    tracing::trace!(%binding, "unbound hotkey");
                    false
                }
            },
            TilingMessage::Action(action) => self.run_action(action),
            TilingMessage::CancelMigration => {
                self.manager.cancel_migration();
                false
            }
            TilingMessage::SetScreen(screen) => {
                self.manager.set_screen(screen);
                true
            }
            TilingMessage::SetLayoutConfig { gaps, padding, master_ratio } => {
                self.manager.set_layout_config(gaps, padding, master_ratio);
                true
            }
            TilingMessage::ApplyLayout => true,
            TilingMessage::Query { query, respond_to } => {
                let _ = respond_to.send(self.answer(query));
                false
            }
            TilingMessage::Shutdown => false,
        };

        if relayout && self.manager.retile().is_none() {
            tracing::trace!("no screen known yet, layout deferred");
        }
    }

    fn run_action(&mut self, action: Action) -> bool {
        match self.manager.dispatch(action) {
            Ok(DispatchOutcome::MigrationStarted { window_id, target_space, ticket }) => {
                tokio::spawn(async move {
                    if let Err(err) = ticket.wait().await {
                        tracing::debug!(window_id = %window_id, target_space, error = %err, "migration ended");
                    }
                });
                false
            }
            Ok(outcome) => outcome.needs_layout(),
            Err(err) if err.is_transient() => {
                tracing::info!(%action, error = %err, "action rejected");
                false
            }
            Err(err) => {
                tracing::warn!(%action, error = %err, "action failed");
                false
            }
        }
    }

    fn answer(&self, query: TilingQuery) -> QueryResult {
        match query {
            TilingQuery::State => QueryResult::State(Box::new(self.manager.state())),
            TilingQuery::Focused => QueryResult::Focused(self.manager.focused()),
            TilingQuery::Spaces => QueryResult::Spaces(self.manager.directory().all_spaces()),
        }
    }
}
