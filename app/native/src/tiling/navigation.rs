//! Directional focus and move actions over the master/stack order.
//!
//! Directions are logical, not geometric: left/right cross between the master
//! and the stack, up/down walk the order.
//!
//! ```text
//! ┌──────────┬─────┐
//! │          │  1  │   focus-left from the stack  -> master
//! │    0     ├─────┤   focus-right from master    -> 1
//! │          │  2  │   focus-right from 2         -> 1 (wraps within the stack)
//! └──────────┴─────┘
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::registry::WindowRegistry;
use super::state::WindowId;

/// Logical navigation direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Toward the master.
    Left,
    /// Toward the stack.
    Right,
    /// Earlier in the order.
    Up,
    /// Later in the order.
    Down,
}

impl Direction {
    /// All directions, in a fixed order.
    pub const ALL: [Self; 4] = [Self::Left, Self::Right, Self::Up, Self::Down];

    /// Returns the lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            _ => Err(format!("Invalid direction: {s}. Expected: left, right, up, down")),
        }
    }
}

// ============================================================================
// Index Rules
// ============================================================================

/// Returns the index to focus when moving focus from `i` among `n` windows.
///
/// `None` means the action is a no-op.
#[must_use]
pub const fn focus_target(direction: Direction, i: usize, n: usize) -> Option<usize> {
    if n <= 1 {
        return None;
    }
    let target = match direction {
        Direction::Left => {
            if i == 0 {
                n - 1
            } else {
                0
            }
        }
        Direction::Right => {
            if i == 0 {
                1
            } else {
                (i % (n - 1)) + 1
            }
        }
        Direction::Up => (i + n - 1) % n,
        Direction::Down => (i + 1) % n,
    };
    Some(target)
}

/// Returns the slots to swap when moving the window at `i` among `n` windows.
///
/// `None` means the action is a no-op.
#[must_use]
pub const fn move_swap(direction: Direction, i: usize, n: usize) -> Option<(usize, usize)> {
    if n <= 1 || i >= n {
        return None;
    }
    match direction {
        Direction::Left => {
            if i == 0 {
                Some((0, n - 1))
            } else {
                Some((i, 0))
            }
        }
        Direction::Right => {
            if i == 0 {
                Some((0, 1))
            } else if i < n - 1 {
                Some((i, i + 1))
            } else {
                None
            }
        }
        Direction::Up => {
            if i > 0 {
                Some((i, i - 1))
            } else {
                None
            }
        }
        Direction::Down => {
            if i < n - 1 {
                Some((i, i + 1))
            } else {
                None
            }
        }
    }
}

// ============================================================================
// Navigation Controller
// ============================================================================

/// Tracks the focused window and applies directional actions.
///
/// The controller never owns windows. It stores at most one id, which is
/// always present in the registry order while set.
#[derive(Debug, Clone, Default)]
pub struct NavigationController {
    focused: Option<WindowId>,
}

impl NavigationController {
    /// Creates a controller with no focus.
    #[must_use]
    pub const fn new() -> Self { Self { focused: None } }

    /// Returns the focused window.
    #[must_use]
    pub const fn focused(&self) -> Option<WindowId> { self.focused }

    /// Focuses `id` if it is managed. Returns `false` otherwise.
    pub fn set_focus(&mut self, id: WindowId, registry: &WindowRegistry) -> bool {
        if registry.index_of(id).is_none() {
            return false;
        }
        self.focused = Some(id);
        true
    }

    /// Unsets focus.
    pub const fn clear(&mut self) { self.focused = None; }

    /// Unsets focus if `id` was focused.
    pub fn on_window_removed(&mut self, id: WindowId) {
        if self.focused == Some(id) {
            tracing::debug!(window_id = %id, "focused window removed, clearing focus");
            self.focused = None;
        }
    }

    /// Focuses the master window. Returns the new focus.
    pub fn focus_master(&mut self, registry: &WindowRegistry) -> Option<WindowId> {
        let master = registry.order().first().copied()?;
        self.focused = Some(master);
        Some(master)
    }

    /// Moves the focused window to the master slot. Focus stays on it.
    ///
    /// Returns `false` if nothing is focused or the window is already master.
    pub fn promote_focused(&self, registry: &mut WindowRegistry) -> bool {
        let Some(id) = self.focused else {
            return false;
        };
        if registry.index_of(id) == Some(0) {
            return false;
        }
        registry.move_to_front(id)
    }

    /// Moves focus in `direction`. Returns the newly focused window, or
    /// `None` if the action was a no-op.
    pub fn focus(&mut self, direction: Direction, registry: &WindowRegistry) -> Option<WindowId> {
        let i = self.current_index(registry);
        let target = focus_target(direction, i, registry.count())?;
        let id = registry.order().get(target).copied()?;
        if self.focused == Some(id) {
            return None;
        }
        tracing::debug!(%direction, from = i, to = target, window_id = %id, "focus moved");
        self.focused = Some(id);
        Some(id)
    }

    /// Moves the focused window in `direction`. Focus stays on the same id.
    ///
    /// Returns `true` if the order changed.
    pub fn move_focused(&self, direction: Direction, registry: &mut WindowRegistry) -> bool {
        let i = self.current_index(registry);
        let Some((a, b)) = move_swap(direction, i, registry.count()) else {
            return false;
        };
        registry.swap(a, b);
        tracing::debug!(%direction, swapped = ?(a, b), "window moved");
        true
    }

    fn current_index(&self, registry: &WindowRegistry) -> usize {
        self.focused.and_then(|id| registry.index_of(id)).unwrap_or(0)
    }
}
