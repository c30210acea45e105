//! mwm - a master/stack tiling core with cross-space window migration.
//!
//! The crate models the managed window set of a tiling window manager:
//! ordering, master/stack layout, directional navigation, a cached directory
//! of virtual desktops and the drag-and-switch protocol that moves a window
//! to another desktop. Host access is injected through the traits in
//! [`platform`]; a simulated desktop ships for tests and the CLI.

// Core modules
pub mod config;
pub mod error;
pub mod hotkey;
pub mod platform;
pub mod schema;
pub mod tiling;

// CLI
pub mod cli;
