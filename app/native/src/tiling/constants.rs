//! Internal constants for tiling tuning.
//!
//! # Organization
//!
//! Constants are grouped by functionality:
//! - `layout` - Default geometry and master ratio bounds
//! - `workspace` - Space enumeration caching
//! - `migration` - Drag-and-switch timing and grab point
//! - `actor` - Message channel sizing

/// Layout defaults and ratio bounds.
pub mod layout {
    /// Default gap between tiles (pixels).
    pub const DEFAULT_GAPS: u32 = 10;

    /// Default inset from the screen edges (pixels).
    pub const DEFAULT_PADDING: u32 = 10;

    /// Default master ratio.
    pub const DEFAULT_MASTER_RATIO: f64 = 0.5;

    /// Smallest allowed master ratio.
    pub const MASTER_RATIO_MIN: f64 = 0.10;

    /// Largest allowed master ratio.
    pub const MASTER_RATIO_MAX: f64 = 0.90;

    /// Ratio change per increase/decrease action.
    pub const MASTER_RATIO_STEP: f64 = 0.05;
}

/// Space enumeration caching.
pub mod workspace {
    /// How long an enumeration stays valid (ms).
    ///
    /// Space creation or deletion is noticed at most this late unless a
    /// refresh is forced.
    pub const CACHE_TTL_MS: u64 = 5_000;
}

/// Window migration timing.
pub mod migration {
    /// Delay between pointer-down and the switch shortcut (ms).
    ///
    /// The host needs to register the window as being dragged before the
    /// desktop switch happens, otherwise the window stays behind.
    pub const GRAB_DELAY_MS: u64 = 50;

    /// Delay between the switch shortcut and pointer-up (ms).
    ///
    /// Covers the desktop switch animation.
    pub const RELEASE_DELAY_MS: u64 = 400;

    /// Horizontal offset of the grab point from the frame's left edge (pixels).
    pub const GRAB_OFFSET_X: f64 = 100.0;

    /// Vertical offset of the grab point from the frame's top edge (pixels).
    ///
    /// Lands inside a standard title bar.
    pub const GRAB_OFFSET_Y: f64 = 12.0;
}

/// Actor sizing.
pub mod actor {
    /// Capacity of the tiling actor's message channel.
    pub const CHANNEL_CAPACITY: usize = 256;

    /// Default timeout for handle queries (ms).
    pub const QUERY_TIMEOUT_MS: u64 = 1_000;
}
