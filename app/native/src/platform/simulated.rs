//! In-memory desktop implementing every platform capability.
//!
//! The simulated desktop behaves like a small host window server: windows
//! live on numbered spaces, the desktop switch shortcuts (Control+1..9 by
//! default) change the active space, and a window held by the pointer while
//! the active space changes travels along with it. Every synthetic input event
//! is recorded with a timestamp so the migration protocol can be replayed and
//! inspected.
//!
//! Used by the `mwm simulate` command and by the test suites.

use std::collections::HashMap;

use parking_lot::Mutex;
use tokio::time::Instant;

use super::{
    Capability, InputSynthesizer, KeyCode, Modifiers, PlatformError, PlatformResult,
    PointerEventKind, SpaceId, SpaceProvider, SwitchShortcut, WindowControl, WindowSnapshot,
};
use crate::tiling::state::{Point, Rect, WindowHandle};

/// Virtual key codes for the digits 1-9 on an ANSI keyboard.
const DIGIT_KEY_CODES: [KeyCode; 9] = [18, 19, 20, 21, 23, 22, 26, 28, 25];

/// Base value for generated space ids.
const SPACE_ID_BASE: u64 = 0x100;

// ============================================================================
// Recorded Input
// ============================================================================

/// A synthetic input event as seen by the simulated host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Pointer event.
    Pointer {
        /// Event kind.
        kind: PointerEventKind,
        /// Screen location.
        point: Point,
        /// Whether the primary button is reported as held.
        button_held: bool,
    },
    /// Keyboard event.
    Key {
        /// Virtual key code.
        code: KeyCode,
        /// Held modifiers.
        modifiers: Modifiers,
        /// `true` for key down, `false` for key up.
        down: bool,
    },
}

impl InputEvent {
    /// Returns the pointer kind if this is a pointer event.
    #[must_use]
    pub const fn pointer_kind(&self) -> Option<PointerEventKind> {
        match self {
            Self::Pointer { kind, .. } => Some(*kind),
            Self::Key { .. } => None,
        }
    }
}

/// An input event with the instant it was posted.
#[derive(Debug, Clone, Copy)]
pub struct RecordedInput {
    /// When the event was posted.
    pub at: Instant,
    /// The event.
    pub event: InputEvent,
}

// ============================================================================
// Desktop State
// ============================================================================

#[derive(Debug, Clone)]
struct SimWindow {
    handle: WindowHandle,
    app_name: String,
    title: String,
    frame: Rect,
    is_minimized: bool,
    space: usize,
}

#[derive(Debug, Clone, Copy)]
struct ShortcutEntry {
    shortcut: SwitchShortcut,
    enabled: bool,
}

#[derive(Debug)]
struct Desktop {
    windows: Vec<SimWindow>,
    space_ids: Vec<SpaceId>,
    enumeration_available: bool,
    input_available: bool,
    active: usize,
    shortcuts: HashMap<usize, ShortcutEntry>,
    focused: Option<WindowHandle>,
    held: Option<WindowHandle>,
    events: Vec<RecordedInput>,
    list_calls: usize,
}

impl Desktop {
    fn window(&self, handle: WindowHandle) -> Option<&SimWindow> {
        self.windows.iter().find(|w| w.handle == handle)
    }

    fn window_mut(&mut self, handle: WindowHandle) -> Option<&mut SimWindow> {
        self.windows.iter_mut().find(|w| w.handle == handle)
    }

    /// Topmost visible window on the active space under `point`.
    fn window_at(&self, point: Point) -> Option<WindowHandle> {
        self.windows
            .iter()
            .rev()
            .find(|w| w.space == self.active && !w.is_minimized && w.frame.contains(point))
            .map(|w| w.handle)
    }

    fn ordinal_for_key(&self, code: KeyCode, modifiers: Modifiers) -> Option<usize> {
        self.shortcuts
            .iter()
            .find(|(_, entry)| {
                entry.enabled
                    && entry.shortcut.key_code == code
                    && entry.shortcut.modifiers == modifiers
            })
            .map(|(ordinal, _)| *ordinal)
    }
}

/// A fully in-memory host desktop.
#[derive(Debug)]
pub struct SimulatedDesktop {
    inner: Mutex<Desktop>,
}

impl SimulatedDesktop {
    /// Creates a desktop with `space_count` spaces, the first one active.
    ///
    /// Spaces 1-9 get an enabled Control+digit switch shortcut.
    #[must_use]
    pub fn new(space_count: usize) -> Self {
        let space_ids = (1..=space_count as u64).map(|n| SpaceId(SPACE_ID_BASE + n)).collect();
        let shortcuts = DIGIT_KEY_CODES
            .iter()
            .take(space_count)
            .enumerate()
            .map(|(index, &key_code)| {
                let entry = ShortcutEntry {
                    shortcut: SwitchShortcut { key_code, modifiers: Modifiers::CONTROL },
                    enabled: true,
                };
                (index + 1, entry)
            })
            .collect();

        Self {
            inner: Mutex::new(Desktop {
                windows: Vec::new(),
                space_ids,
                enumeration_available: true,
                input_available: true,
                active: 1,
                shortcuts,
                focused: None,
                held: None,
                events: Vec::new(),
                list_calls: 0,
            }),
        }
    }

    // ========================================================================
    // Scenario Setup
    // ========================================================================

    /// Adds a window to the active space.
    pub fn add_window(&self, handle: WindowHandle, app_name: &str, title: &str, frame: Rect) {
        let space = self.inner.lock().active;
        self.add_window_on(space, handle, app_name, title, frame);
    }

    /// Adds a window to the given space ordinal.
    pub fn add_window_on(
        &self,
        space: usize,
        handle: WindowHandle,
        app_name: &str,
        title: &str,
        frame: Rect,
    ) {
        self.inner.lock().windows.push(SimWindow {
            handle,
            app_name: app_name.to_string(),
            title: title.to_string(),
            frame,
            is_minimized: false,
            space,
        });
    }

    /// Closes a window.
    pub fn close_window(&self, handle: WindowHandle) {
        let mut desktop = self.inner.lock();
        desktop.windows.retain(|w| w.handle != handle);
        if desktop.focused == Some(handle) {
            desktop.focused = None;
        }
    }

    /// Marks a window as minimized or restored.
    pub fn set_minimized(&self, handle: WindowHandle, minimized: bool) {
        if let Some(window) = self.inner.lock().window_mut(handle) {
            window.is_minimized = minimized;
        }
    }

    /// Appends a new space at the end of the enumeration.
    pub fn add_space(&self) {
        let mut desktop = self.inner.lock();
        let next = desktop.space_ids.len() as u64 + 1;
        desktop.space_ids.push(SpaceId(SPACE_ID_BASE + next));
    }

    /// Removes the switch shortcut for `ordinal` entirely.
    pub fn remove_shortcut(&self, ordinal: usize) { self.inner.lock().shortcuts.remove(&ordinal); }

    /// Makes space enumeration available or unavailable.
    pub fn set_enumeration_available(&self, available: bool) {
        self.inner.lock().enumeration_available = available;
    }

    /// Makes input synthesis available or unavailable.
    pub fn set_input_available(&self, available: bool) {
        self.inner.lock().input_available = available;
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    /// Returns the visible, non-minimized and minimized windows of the active space.
    #[must_use]
    pub fn enumerate(&self) -> Vec<WindowSnapshot> {
        let desktop = self.inner.lock();
        desktop
            .windows
            .iter()
            .filter(|w| w.space == desktop.active)
            .map(|w| WindowSnapshot {
                handle: w.handle,
                app_name: w.app_name.clone(),
                title: w.title.clone(),
                frame: w.frame,
                is_minimized: w.is_minimized,
            })
            .collect()
    }

    /// Returns every recorded input event in posting order.
    #[must_use]
    pub fn events(&self) -> Vec<RecordedInput> { self.inner.lock().events.clone() }

    /// Returns the space ordinal a window lives on.
    #[must_use]
    pub fn space_of(&self, handle: WindowHandle) -> Option<usize> {
        self.inner.lock().window(handle).map(|w| w.space)
    }

    /// Returns the active space ordinal.
    #[must_use]
    pub fn active_ordinal(&self) -> usize { self.inner.lock().active }

    /// Returns the window that last received focus.
    #[must_use]
    pub fn focused(&self) -> Option<WindowHandle> { self.inner.lock().focused }

    /// Returns whether a window is currently held by the pointer.
    #[must_use]
    pub fn is_pointer_held(&self) -> bool { self.inner.lock().held.is_some() }

    /// Returns how many times the space list was enumerated.
    #[must_use]
    pub fn list_space_calls(&self) -> usize { self.inner.lock().list_calls }

    /// Returns the frame the host currently reports for a window.
    #[must_use]
    pub fn frame_of(&self, handle: WindowHandle) -> Option<Rect> {
        self.inner.lock().window(handle).map(|w| w.frame)
    }
}

// ============================================================================
// Capability Implementations
// ============================================================================

impl WindowControl for SimulatedDesktop {
    fn frame(&self, handle: WindowHandle) -> Option<Rect> { self.frame_of(handle) }

    fn set_frame(&self, handle: WindowHandle, frame: Rect) -> bool {
        self.inner.lock().window_mut(handle).map(|w| w.frame = frame).is_some()
    }

    fn title(&self, handle: WindowHandle) -> Option<String> {
        self.inner.lock().window(handle).map(|w| w.title.clone())
    }

    fn is_minimized(&self, handle: WindowHandle) -> bool {
        self.inner.lock().window(handle).is_some_and(|w| w.is_minimized)
    }

    fn request_focus(&self, handle: WindowHandle) -> bool {
        let mut desktop = self.inner.lock();
        if desktop.window(handle).is_none() {
            return false;
        }
        desktop.focused = Some(handle);
        true
    }
}

impl InputSynthesizer for SimulatedDesktop {
    fn post_pointer(&self, kind: PointerEventKind, point: Point, button_held: bool) -> PlatformResult<()> {
        let mut desktop = self.inner.lock();
        if !desktop.input_available {
            return Err(PlatformError::Unavailable(Capability::InputSynthesis));
        }

        desktop.events.push(RecordedInput {
            at: Instant::now(),
            event: InputEvent::Pointer { kind, point, button_held },
        });

        match kind {
            PointerEventKind::Down => {
                let target = desktop.window_at(point);
                desktop.held = target;
            }
            PointerEventKind::Dragged => {}
            PointerEventKind::Up => desktop.held = None,
        }
        Ok(())
    }

    fn post_key(&self, code: KeyCode, modifiers: Modifiers, down: bool) -> PlatformResult<()> {
        let mut desktop = self.inner.lock();
        if !desktop.input_available {
            return Err(PlatformError::Unavailable(Capability::InputSynthesis));
        }

        desktop.events.push(RecordedInput {
            at: Instant::now(),
            event: InputEvent::Key { code, modifiers, down },
        });

        if !down {
            return Ok(());
        }

        if let Some(ordinal) = desktop.ordinal_for_key(code, modifiers) {
            desktop.active = ordinal;
            if let Some(held) = desktop.held {
                if let Some(window) = desktop.window_mut(held) {
                    window.space = ordinal;
                }
            }
        }
        Ok(())
    }
}

impl SpaceProvider for SimulatedDesktop {
    fn list_spaces(&self) -> PlatformResult<Vec<SpaceId>> {
        let mut desktop = self.inner.lock();
        desktop.list_calls += 1;
        if !desktop.enumeration_available {
            return Err(PlatformError::Unavailable(Capability::SpaceEnumeration));
        }
        Ok(desktop.space_ids.clone())
    }

    fn active_space(&self) -> PlatformResult<SpaceId> {
        let desktop = self.inner.lock();
        if !desktop.enumeration_available {
            return Err(PlatformError::Unavailable(Capability::SpaceEnumeration));
        }
        desktop
            .space_ids
            .get(desktop.active - 1)
            .copied()
            .ok_or(PlatformError::Unavailable(Capability::SpaceEnumeration))
    }

    fn resolve_switch_shortcut(&self, ordinal: usize) -> Option<SwitchShortcut> {
        self.inner.lock().shortcuts.get(&ordinal).map(|entry| entry.shortcut)
    }

    fn is_shortcut_enabled(&self, ordinal: usize) -> bool {
        self.inner.lock().shortcuts.get(&ordinal).is_some_and(|entry| entry.enabled)
    }

    fn set_shortcut_enabled(&self, ordinal: usize, enabled: bool) -> bool {
        self.inner
            .lock()
            .shortcuts
            .get_mut(&ordinal)
            .map(|entry| entry.enabled = enabled)
            .is_some()
    }
}
