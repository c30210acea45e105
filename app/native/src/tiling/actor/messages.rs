//! Message types for the tiling actor.
//!
//! All communication with the tiling actor happens through messages:
//! - `TilingMessage` - events and commands sent to the actor
//! - `TilingQuery` - requests for state data (with response channel)
//! - `QueryResult` - responses from queries

use tokio::sync::oneshot;

use crate::hotkey::{Action, Binding};
use crate::platform::{SpaceId, WindowSnapshot};
use crate::tiling::manager::ManagerState;
use crate::tiling::state::{Rect, WindowHandle, WindowId};

// ============================================================================
// Tiling Messages
// ============================================================================

/// Messages sent to the tiling actor.
#[derive(Debug)]
pub enum TilingMessage {
    // ════════════════════════════════════════════════════════════════════════
    // Window Events (from host enumeration)
    // ════════════════════════════════════════════════════════════════════════
    /// A window was created or changed.
    WindowAppeared(WindowSnapshot),

    /// A window was closed.
    WindowVanished { handle: WindowHandle },

    /// Full enumeration of the current space, replacing the managed set.
    SyncWindows(Vec<WindowSnapshot>),

    // ════════════════════════════════════════════════════════════════════════
    // User Input
    // ════════════════════════════════════════════════════════════════════════
    /// A key combination was pressed. Unbound combinations are ignored.
    Hotkey(Binding),

    /// Run a logical action directly.
    Action(Action),

    /// Abort the in-flight window migration.
    CancelMigration,

    // ════════════════════════════════════════════════════════════════════════
    // Layout
    // ════════════════════════════════════════════════════════════════════════
    /// The visible screen frame changed.
    SetScreen(Rect),

    /// Replace the layout settings.
    SetLayoutConfig { gaps: u32, padding: u32, master_ratio: f64 },

    /// Re-apply the layout on the known screen.
    ApplyLayout,

    // ════════════════════════════════════════════════════════════════════════
    // Queries (with response channel)
    // ════════════════════════════════════════════════════════════════════════
    /// Execute a query and send result back.
    Query {
        query: TilingQuery,
        respond_to: oneshot::Sender<QueryResult>,
    },

    // ════════════════════════════════════════════════════════════════════════
    // Internal
    // ════════════════════════════════════════════════════════════════════════
    /// Shutdown the actor gracefully.
    Shutdown,
}

impl TilingMessage {
    /// Returns a human-readable name for this message type.
    ///
    /// Used for logging, especially in panic recovery.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::WindowAppeared(_) => "WindowAppeared",
            Self::WindowVanished { .. } => "WindowVanished",
            Self::SyncWindows(_) => "SyncWindows",
            Self::Hotkey(_) => "Hotkey",
            Self::Action(_) => "Action",
            Self::CancelMigration => "CancelMigration",
            Self::SetScreen(_) => "SetScreen",
            Self::SetLayoutConfig { .. } => "SetLayoutConfig",
            Self::ApplyLayout => "ApplyLayout",
            Self::Query { .. } => "Query",
            Self::Shutdown => "Shutdown",
        }
    }
}

// ============================================================================
// Queries
// ============================================================================

/// Queries answered by the tiling actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TilingQuery {
    /// Full state snapshot.
    State,
    /// The focused window.
    Focused,
    /// Spaces in host order (cached enumeration).
    Spaces,
}

/// Responses to [`TilingQuery`].
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    /// Full state snapshot.
    State(Box<ManagerState>),
    /// The focused window.
    Focused(Option<WindowId>),
    /// Spaces in host order.
    Spaces(Vec<SpaceId>),
}
