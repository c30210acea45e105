//! State types for the tiling core.
//!
//! This module defines the geometric primitives and the window record shared
//! by the registry, the layout engine and the navigation controller.

use std::fmt;

use serde::{Deserialize, Serialize};

// ============================================================================
// Identifiers
// ============================================================================

/// Opaque identifier assigned by the [`WindowRegistry`](super::registry::WindowRegistry).
///
/// Ids start at 1 and grow monotonically; they are never reused within the
/// lifetime of a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(u64);

impl WindowId {
    /// Wraps a raw id value.
    #[must_use]
    pub const fn new(raw: u64) -> Self { Self(raw) }

    /// Returns the raw id value.
    #[must_use]
    pub const fn get(self) -> u64 { self.0 }
}

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.0) }
}

/// Opaque handle the host platform uses to address a window.
///
/// The core never owns the platform window; it only correlates this handle
/// with the [`WindowId`] it assigned on first sight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowHandle(pub u64);

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{:#x}", self.0) }
}

// ============================================================================
// Geometric Types
// ============================================================================

/// A point in 2D space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
}

impl Point {
    /// Creates a new point.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self { Self { x, y } }
}

/// A rectangle defined by origin point and size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// X coordinate of the origin (top-left corner).
    pub x: f64,
    /// Y coordinate of the origin (top-left corner).
    pub y: f64,
    /// Width of the rectangle.
    pub width: f64,
    /// Height of the rectangle.
    pub height: f64,
}

impl Rect {
    /// Creates a new rectangle.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Returns whether a point is inside the rectangle.
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    /// Shrinks the rectangle by `amount` on every side.
    ///
    /// No clamping is applied: an inset larger than half the size yields a
    /// negative width or height.
    #[must_use]
    pub fn inset(&self, amount: f64) -> Self {
        Self::new(
            self.x + amount,
            self.y + amount,
            amount.mul_add(-2.0, self.width),
            amount.mul_add(-2.0, self.height),
        )
    }

    /// Returns the point at `(dx, dy)` from the top-left corner.
    #[must_use]
    pub fn offset_from_origin(&self, dx: f64, dy: f64) -> Point { Point::new(self.x + dx, self.y + dy) }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}x{})", self.x, self.y, self.width, self.height)
    }
}

// ============================================================================
// Managed Window
// ============================================================================

/// A window under management.
///
/// Records are owned exclusively by the registry. Everything outside the
/// registry refers to them by [`WindowId`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedWindow {
    /// Registry-assigned id.
    pub id: WindowId,
    /// Name of the owning application (e.g., "Safari").
    pub app_name: String,
    /// Window title.
    pub title: String,
    /// Last known frame of the window.
    pub frame: Rect,
    /// Whether the window is excluded from tiling.
    pub is_floating: bool,
}

/// Window data without an id yet, as delivered by enumeration.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWindow {
    /// Name of the owning application.
    pub app_name: String,
    /// Window title.
    pub title: String,
    /// Current frame.
    pub frame: Rect,
    /// Whether the window starts floating.
    pub is_floating: bool,
}

impl NewWindow {
    /// Creates a tiled window description.
    #[must_use]
    pub fn tiled(app_name: impl Into<String>, title: impl Into<String>, frame: Rect) -> Self {
        Self {
            app_name: app_name.into(),
            title: title.into(),
            frame,
            is_floating: false,
        }
    }

    /// Converts the description into a record with the given id.
    #[must_use]
    pub fn into_managed(self, id: WindowId) -> ManagedWindow {
        ManagedWindow {
            id,
            app_name: self.app_name,
            title: self.title,
            frame: self.frame,
            is_floating: self.is_floating,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_inset() {
        let rect = Rect::new(0.0, 0.0, 1920.0, 1080.0);
        assert_eq!(rect.inset(10.0), Rect::new(10.0, 10.0, 1900.0, 1060.0));
        assert_eq!(rect.inset(0.0), rect);
    }

    #[test]
    fn test_rect_inset_can_go_negative() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        let shrunk = rect.inset(8.0);
        assert_eq!(shrunk.width, -6.0);
        assert_eq!(shrunk.height, -6.0);
    }

    #[test]
    fn test_rect_contains() {
        let rect = Rect::new(100.0, 100.0, 200.0, 100.0);
        assert!(rect.contains(Point::new(150.0, 120.0)));
        assert!(!rect.contains(Point::new(50.0, 120.0)));
    }

    #[test]
    fn test_offset_from_origin() {
        let rect = Rect::new(40.0, 60.0, 800.0, 600.0);
        assert_eq!(rect.offset_from_origin(100.0, 12.0), Point::new(140.0, 72.0));
    }

    #[test]
    fn test_window_id_display() {
        assert_eq!(WindowId::new(7).to_string(), "7");
        assert_eq!(WindowHandle(255).to_string(), "0xff");
    }

    #[test]
    fn test_new_window_into_managed() {
        let frame = Rect::new(0.0, 0.0, 100.0, 100.0);
        let managed = NewWindow::tiled("Safari", "Start Page", frame).into_managed(WindowId::new(3));
        assert_eq!(managed.id, WindowId::new(3));
        assert_eq!(managed.app_name, "Safari");
        assert!(!managed.is_floating);
    }
}
