//! Platform capability interfaces.
//!
//! The tiling core never talks to the host OS directly. Everything it needs
//! from the outside world (window frames, synthetic input, virtual desktop
//! enumeration) goes through the traits in this module, so a host binding, the
//! [`simulated`] desktop and the [`unavailable`] fallback are interchangeable.
//!
//! A capability that cannot be reached is a typed state
//! ([`PlatformError::Unavailable`]) rather than a missing global.

pub mod simulated;
pub mod unavailable;

use std::fmt;
use std::sync::Arc;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::tiling::state::{Point, Rect, WindowHandle};

/// Result type alias for platform calls.
pub type PlatformResult<T> = Result<T, PlatformError>;

/// Host virtual key code.
pub type KeyCode = u16;

// ============================================================================
// Errors
// ============================================================================

/// Platform capabilities the core may depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Reading or writing window geometry.
    WindowControl,
    /// Posting synthetic pointer and keyboard events.
    InputSynthesis,
    /// Listing virtual desktops.
    SpaceEnumeration,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::WindowControl => "window control",
            Self::InputSynthesis => "input synthesis",
            Self::SpaceEnumeration => "space enumeration",
        };
        f.write_str(name)
    }
}

/// Errors reported by platform capabilities.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlatformError {
    /// The capability is not reachable in this environment.
    #[error("{0} is unavailable")]
    Unavailable(Capability),

    /// The capability exists but rejected the request.
    #[error("{capability} request rejected: {reason}")]
    Rejected {
        /// Which capability rejected the call.
        capability: Capability,
        /// Host-provided reason.
        reason: String,
    },
}

impl PlatformError {
    /// Creates a rejection error.
    #[must_use]
    pub fn rejected(capability: Capability, reason: impl Into<String>) -> Self {
        Self::Rejected { capability, reason: reason.into() }
    }
}

// ============================================================================
// Input Types
// ============================================================================

bitflags! {
    /// Keyboard modifier set, independent of host key codes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Modifiers: u8 {
        /// Command / Super.
        const COMMAND = 1;
        /// Option / Alt.
        const OPTION = 1 << 1;
        /// Control.
        const CONTROL = 1 << 2;
        /// Shift.
        const SHIFT = 1 << 3;
        /// Function key.
        const FUNCTION = 1 << 4;
    }
}

/// Kind of synthetic pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PointerEventKind {
    /// Primary button pressed.
    Down,
    /// Pointer moved with the primary button held.
    Dragged,
    /// Primary button released.
    Up,
}

/// A key combination bound by the host to "switch to desktop N".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchShortcut {
    /// Host virtual key code.
    pub key_code: KeyCode,
    /// Modifiers held with the key.
    pub modifiers: Modifiers,
}

/// Opaque host identifier of a virtual desktop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpaceId(pub u64);

impl fmt::Display for SpaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

/// One window as reported by host enumeration.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSnapshot {
    /// Host handle.
    pub handle: WindowHandle,
    /// Owning application name.
    pub app_name: String,
    /// Window title.
    pub title: String,
    /// Current frame.
    pub frame: Rect,
    /// Whether the window is minimized.
    pub is_minimized: bool,
}

// ============================================================================
// Capability Traits
// ============================================================================

/// Reads and writes window geometry and focus.
pub trait WindowControl: Send + Sync {
    /// Returns the current on-screen frame, if the window can be read.
    fn frame(&self, handle: WindowHandle) -> Option<Rect>;

    /// Moves and resizes the window. Returns `false` if the host refused.
    fn set_frame(&self, handle: WindowHandle, frame: Rect) -> bool;

    /// Returns the window title, if readable.
    fn title(&self, handle: WindowHandle) -> Option<String>;

    /// Returns whether the window is minimized.
    fn is_minimized(&self, handle: WindowHandle) -> bool;

    /// Asks the host to focus the window. Fire-and-forget.
    fn request_focus(&self, handle: WindowHandle) -> bool;
}

/// Posts synthetic input events to the host.
pub trait InputSynthesizer: Send + Sync {
    /// Posts a pointer event at `point`.
    ///
    /// # Errors
    ///
    /// Returns an error if input synthesis is unavailable or the event was refused.
    fn post_pointer(&self, kind: PointerEventKind, point: Point, button_held: bool) -> PlatformResult<()>;

    /// Posts a key down or key up event.
    ///
    /// # Errors
    ///
    /// Returns an error if input synthesis is unavailable or the event was refused.
    fn post_key(&self, code: KeyCode, modifiers: Modifiers, down: bool) -> PlatformResult<()>;
}

/// Enumerates virtual desktops and exposes their switch shortcuts.
pub trait SpaceProvider: Send + Sync {
    /// Lists desktops in host order.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Unavailable`] if enumeration is not possible.
    fn list_spaces(&self) -> PlatformResult<Vec<SpaceId>>;

    /// Returns the desktop currently shown.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Unavailable`] if enumeration is not possible.
    fn active_space(&self) -> PlatformResult<SpaceId>;

    /// Looks up the host shortcut that switches to desktop `ordinal` (1-based).
    fn resolve_switch_shortcut(&self, ordinal: usize) -> Option<SwitchShortcut>;

    /// Returns whether the shortcut for `ordinal` is enabled in host settings.
    fn is_shortcut_enabled(&self, ordinal: usize) -> bool;

    /// Enables or disables the shortcut for `ordinal`. Returns `false` on failure.
    fn set_shortcut_enabled(&self, ordinal: usize, enabled: bool) -> bool;
}

// ============================================================================
// Capability Bundle
// ============================================================================

/// The set of host capabilities handed to the tiling manager.
#[derive(Clone)]
pub struct Capabilities {
    /// Window geometry and focus.
    pub windows: Arc<dyn WindowControl>,
    /// Virtual desktop enumeration and shortcuts.
    pub spaces: Arc<dyn SpaceProvider>,
    /// Synthetic input.
    pub input: Arc<dyn InputSynthesizer>,
}

impl Capabilities {
    /// Capabilities where every call reports [`PlatformError::Unavailable`].
    #[must_use]
    pub fn unavailable() -> Self {
        let fallback = Arc::new(unavailable::Unavailable);
        Self {
            windows: fallback.clone(),
            spaces: fallback.clone(),
            input: fallback,
        }
    }

    /// Capabilities backed by a single simulated desktop.
    #[must_use]
    pub fn simulated(desktop: &Arc<simulated::SimulatedDesktop>) -> Self {
        Self {
            windows: desktop.clone(),
            spaces: desktop.clone(),
            input: desktop.clone(),
        }
    }
}

impl fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capabilities").finish_non_exhaustive()
    }
}
