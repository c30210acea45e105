//! Master/stack tiling core.
//!
//! This module owns the managed window set and everything that acts on it:
//! the layout engine, directional navigation, the space directory and the
//! cross-space window migration protocol.
//!
//! # Architecture
//!
//! - [`registry`] - window arena plus the tiling order
//! - [`layout`] - pure master/stack frame computation
//! - [`navigation`] - focus tracking and directional focus/move
//! - [`workspace`] - cached space enumeration and switch shortcuts
//! - [`migration`] - drag-and-switch state machine with a single-flight slot
//! - [`manager`] - the context object tying the above to the platform
//! - [`actor`] - runs the manager on one tokio task
//!
//! All mutation goes through [`TilingManager`], normally owned by a
//! [`TilingActor`]. Host access is injected through
//! [`Capabilities`](crate::platform::Capabilities).
//!
//! # Usage
//!
//! ```bash
//! mwm layout --screen 0,0,1920,1080 --windows 3
//! mwm simulate navigate --windows 3 --actions focus-right,move-left
//! mwm simulate migrate --space 2
//! ```

pub mod actor;
pub mod constants;
pub mod error;
pub mod layout;
pub mod manager;
pub mod migration;
pub mod navigation;
pub mod registry;
pub mod state;
pub mod workspace;

pub use actor::{ActorError, QueryResult, TilingActor, TilingActorHandle, TilingMessage, TilingQuery};
pub use error::{TilingError, TilingResult};
pub use layout::{LayoutCommand, LayoutConfig, LayoutResult};
pub use manager::{DispatchOutcome, ManagerSettings, ManagerState, TilingManager};
pub use migration::{
    MigrationCoordinator, MigrationError, MigrationPhase, MigrationRequest, MigrationTicket,
    MigrationTiming,
};
pub use navigation::{Direction, NavigationController};
pub use registry::WindowRegistry;
pub use state::{ManagedWindow, NewWindow, Point, Rect, WindowHandle, WindowId};
pub use workspace::{ShortcutGrant, SpaceSnapshot, WorkspaceDirectory};
