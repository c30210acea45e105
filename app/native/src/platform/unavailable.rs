//! Fallback capabilities for environments without a host binding.
//!
//! Every query answers "unknown" and every command fails, which puts the
//! tiling core in its degraded-but-alive mode.

use super::{
    Capability, InputSynthesizer, KeyCode, Modifiers, PlatformError, PlatformResult,
    PointerEventKind, SpaceId, SpaceProvider, SwitchShortcut, WindowControl,
};
use crate::tiling::state::{Point, Rect, WindowHandle};

/// A platform that exposes no capability at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unavailable;

impl WindowControl for Unavailable {
    fn frame(&self, _handle: WindowHandle) -> Option<Rect> { None }

    fn set_frame(&self, _handle: WindowHandle, _frame: Rect) -> bool { false }

    fn title(&self, _handle: WindowHandle) -> Option<String> { None }

    fn is_minimized(&self, _handle: WindowHandle) -> bool { false }

    fn request_focus(&self, _handle: WindowHandle) -> bool { false }
}

impl InputSynthesizer for Unavailable {
    fn post_pointer(&self, _kind: PointerEventKind, _point: Point, _held: bool) -> PlatformResult<()> {
        Err(PlatformError::Unavailable(Capability::InputSynthesis))
    }

    fn post_key(&self, _code: KeyCode, _modifiers: Modifiers, _down: bool) -> PlatformResult<()> {
        Err(PlatformError::Unavailable(Capability::InputSynthesis))
    }
}

impl SpaceProvider for Unavailable {
    fn list_spaces(&self) -> PlatformResult<Vec<SpaceId>> {
        Err(PlatformError::Unavailable(Capability::SpaceEnumeration))
    }

    fn active_space(&self) -> PlatformResult<SpaceId> {
        Err(PlatformError::Unavailable(Capability::SpaceEnumeration))
    }

    fn resolve_switch_shortcut(&self, _ordinal: usize) -> Option<SwitchShortcut> { None }

    fn is_shortcut_enabled(&self, _ordinal: usize) -> bool { false }

    fn set_shortcut_enabled(&self, _ordinal: usize, _enabled: bool) -> bool { false }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_everything_reports_unavailable() {
        let platform = Unavailable;
        assert_eq!(
            platform.list_spaces(),
            Err(PlatformError::Unavailable(Capability::SpaceEnumeration))
        );
        assert!(platform.resolve_switch_shortcut(1).is_none());
        assert!(
            platform
                .post_pointer(PointerEventKind::Down, Point::default(), true)
                .is_err()
        );
        assert!(!platform.set_frame(WindowHandle(1), Rect::default()));
    }
}
