//! Error types for the tiling core.
//!
//! Expected failures are reported through this enum, never through panics.
//!
//! # Error Categories
//!
//! - **Lookup errors**: unknown window id or out-of-range index
//! - **Unavailable**: a platform capability cannot be reached
//! - **Protocol errors**: a migration shortcut cannot be resolved
//! - **Transient**: a migration is in flight
//!
//! # Example
//!
//! ```rust,ignore
//! use mwm_lib::tiling::error::{TilingError, TilingResult};
//!
//! fn focused(nav: &NavigationController) -> TilingResult<WindowId> {
//!     nav.focused().ok_or(TilingError::NoFocusedWindow)
//! }
//! ```

use super::migration::MigrationError;
use super::state::WindowId;
use crate::platform::PlatformError;

/// Result type alias for tiling operations.
pub type TilingResult<T> = Result<T, TilingError>;

/// Errors that can occur during tiling operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TilingError {
    /// No window with the given id is managed.
    #[error("Window {0} not found")]
    WindowNotFound(WindowId),

    /// An order index was outside `0..count`.
    #[error("Index {index} out of range for {count} windows")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// The number of managed windows.
        count: usize,
    },

    /// The id is already present in the registry.
    #[error("Window {0} is already managed")]
    DuplicateWindow(WindowId),

    /// The operation needs a focused window and none is set.
    #[error("No window is focused")]
    NoFocusedWindow,

    /// The host offers no switch shortcut for the given space ordinal.
    #[error("No switch shortcut available for space {0}")]
    ShortcutUnavailable(usize),

    /// A platform capability could not be reached.
    #[error(transparent)]
    Platform(#[from] PlatformError),

    /// A window migration could not be started.
    #[error(transparent)]
    Migration(#[from] MigrationError),
}

impl TilingError {
    /// Returns `true` if this error indicates a resource was not found.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::WindowNotFound(_) | Self::IndexOutOfRange { .. })
    }

    /// Returns `true` if a platform capability is missing.
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::Platform(PlatformError::Unavailable(_))
                | Self::Migration(MigrationError::Input(PlatformError::Unavailable(_)))
        )
    }

    /// Returns `true` if the operation might succeed once the running migration ends.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Migration(MigrationError::Busy(_)))
    }
}
