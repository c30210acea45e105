//! Layout engine for the tiling window manager.
//!
//! Layout is a pure function of the window order, the screen frame and the
//! [`LayoutConfig`]. It never touches the platform; the manager applies the
//! resulting [`LayoutCommand`]s.
//!
//! # Performance
//!
//! Layout results use `SmallVec` to avoid heap allocations for workspaces with
//! up to 16 windows (the common case).

mod master;

use serde::Serialize;
use smallvec::SmallVec;

use crate::tiling::constants::layout::{
    DEFAULT_GAPS, DEFAULT_MASTER_RATIO, DEFAULT_PADDING, MASTER_RATIO_MAX, MASTER_RATIO_MIN,
    MASTER_RATIO_STEP,
};
use crate::tiling::state::{Rect, WindowId};

// ============================================================================
// Layout Result
// ============================================================================

/// Inline capacity for layout results.
pub const LAYOUT_INLINE_CAP: usize = 16;

/// A target frame for one window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutCommand {
    /// Window to move.
    pub window_id: WindowId,
    /// Frame to apply.
    pub frame: Rect,
}

impl LayoutCommand {
    /// Creates a new command.
    #[must_use]
    pub const fn new(window_id: WindowId, frame: Rect) -> Self { Self { window_id, frame } }
}

/// Ordered layout commands, one per input window.
pub type LayoutResult = SmallVec<[LayoutCommand; LAYOUT_INLINE_CAP]>;

// ============================================================================
// Layout Config
// ============================================================================

/// Gap, padding and master ratio settings.
///
/// The ratio is always within `[MASTER_RATIO_MIN, MASTER_RATIO_MAX]`. Fields
/// are private so every mutation goes through a clamping setter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutConfig {
    gaps: u32,
    padding: u32,
    master_ratio: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self { Self::new(DEFAULT_GAPS, DEFAULT_PADDING, DEFAULT_MASTER_RATIO) }
}

impl LayoutConfig {
    /// Creates a config, clamping the ratio.
    #[must_use]
    pub fn new(gaps: u32, padding: u32, master_ratio: f64) -> Self {
        let mut config = Self { gaps, padding, master_ratio: DEFAULT_MASTER_RATIO };
        config.set(gaps, padding, master_ratio);
        config
    }

    /// Replaces all settings. The ratio is clamped; NaN falls back to the default.
    pub fn set(&mut self, gaps: u32, padding: u32, master_ratio: f64) {
        self.gaps = gaps;
        self.padding = padding;
        self.master_ratio = clamp_ratio(master_ratio);
    }

    /// Gap between master and stack and between stack slots, in pixels.
    #[must_use]
    pub const fn gaps(&self) -> u32 { self.gaps }

    /// Inset from the screen edges, in pixels.
    #[must_use]
    pub const fn padding(&self) -> u32 { self.padding }

    /// Fraction of the working width given to the master window.
    #[must_use]
    pub const fn master_ratio(&self) -> f64 { self.master_ratio }

    /// Grows the master area by one step. Returns the new ratio.
    pub fn increase_master_ratio(&mut self) -> f64 { self.adjust_master_ratio(MASTER_RATIO_STEP) }

    /// Shrinks the master area by one step. Returns the new ratio.
    pub fn decrease_master_ratio(&mut self) -> f64 { self.adjust_master_ratio(-MASTER_RATIO_STEP) }

    /// Adds `delta` to the ratio, rounding to two decimals and clamping.
    ///
    /// The ratio moves in hundredths, so a `delta` below 0.005 leaves it
    /// unchanged. Returns the new ratio.
    pub fn adjust_master_ratio(&mut self, delta: f64) -> f64 {
        let stepped = ((self.master_ratio + delta) * 100.0).round() / 100.0;
        self.master_ratio = clamp_ratio(stepped);
        self.master_ratio
    }
}

fn clamp_ratio(ratio: f64) -> f64 {
    if ratio.is_nan() {
        return DEFAULT_MASTER_RATIO;
    }
    ratio.clamp(MASTER_RATIO_MIN, MASTER_RATIO_MAX)
}

// ============================================================================
// Main Layout Function
// ============================================================================

/// Computes master/stack frames for `windows` in order.
///
/// Index 0 is the master; every other window goes to the stack. The output has
/// exactly one command per input id, in input order.
#[must_use]
pub fn compute(windows: &[WindowId], screen: &Rect, config: &LayoutConfig) -> LayoutResult {
    compute_with_limit(windows, screen, config, usize::MAX)
}

/// Like [`compute`], but emits at most `max_commands` commands.
#[must_use]
pub fn compute_with_limit(
    windows: &[WindowId],
    screen: &Rect,
    config: &LayoutConfig,
    max_commands: usize,
) -> LayoutResult {
    let mut result = master::layout(windows, screen, config);
    result.truncate(max_commands);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(count: u64) -> Vec<WindowId> { (1..=count).map(WindowId::new).collect() }

    fn screen() -> Rect { Rect::new(0.0, 0.0, 1920.0, 1080.0) }

    // ========================================================================
    // LayoutConfig
    // ========================================================================

    #[test]
    fn test_config_defaults() {
        let config = LayoutConfig::default();
        assert_eq!(config.gaps(), 10);
        assert_eq!(config.padding(), 10);
        assert!((config.master_ratio() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_config_clamps_ratio() {
        assert!((LayoutConfig::new(0, 0, 0.0).master_ratio() - 0.1).abs() < f64::EPSILON);
        assert!((LayoutConfig::new(0, 0, 1.5).master_ratio() - 0.9).abs() < f64::EPSILON);
        assert!((LayoutConfig::new(0, 0, f64::NAN).master_ratio() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_increase_ten_times_saturates_at_max() {
        let mut config = LayoutConfig::default();
        for _ in 0..10 {
            config.increase_master_ratio();
        }
        assert!((config.master_ratio() - 0.9).abs() < f64::EPSILON);
    }

    #[test]
    fn test_decrease_saturates_at_min() {
        let mut config = LayoutConfig::default();
        for _ in 0..20 {
            config.decrease_master_ratio();
        }
        assert!((config.master_ratio() - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn test_steps_land_on_exact_values() {
        let mut config = LayoutConfig::default();
        assert!((config.increase_master_ratio() - 0.55).abs() < f64::EPSILON);
        assert!((config.increase_master_ratio() - 0.6).abs() < f64::EPSILON);
        assert!((config.decrease_master_ratio() - 0.55).abs() < f64::EPSILON);
    }

    #[test]
    fn test_adjust_moves_in_hundredths() {
        let mut config = LayoutConfig::default();
        assert!((config.adjust_master_ratio(0.004) - 0.5).abs() < f64::EPSILON);
        assert!((config.adjust_master_ratio(-0.004) - 0.5).abs() < f64::EPSILON);
        assert!((config.adjust_master_ratio(0.02) - 0.52).abs() < f64::EPSILON);
        assert!((config.adjust_master_ratio(0.333) - 0.85).abs() < f64::EPSILON);
    }

    // ========================================================================
    // compute
    // ========================================================================

    #[test]
    fn test_compute_empty() {
        assert!(compute(&[], &screen(), &LayoutConfig::default()).is_empty());
    }

    #[test]
    fn test_compute_single_window_fills_working_area() {
        let result = compute(&ids(1), &screen(), &LayoutConfig::default());
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].frame, Rect::new(10.0, 10.0, 1900.0, 1060.0));
    }

    #[test]
    fn test_compute_two_windows_even_split() {
        let result = compute(&ids(2), &screen(), &LayoutConfig::default());
        assert_eq!(result[0].frame, Rect::new(10.0, 10.0, 945.0, 1060.0));
        assert_eq!(result[1].frame, Rect::new(965.0, 10.0, 945.0, 1060.0));
    }

    #[test]
    fn test_compute_three_windows_stack_split() {
        let result = compute(&ids(3), &screen(), &LayoutConfig::default());
        // (1060 - 10) / 2
        assert_eq!(result[1].frame, Rect::new(965.0, 10.0, 945.0, 525.0));
        assert_eq!(result[2].frame, Rect::new(965.0, 545.0, 945.0, 525.0));
    }

    #[test]
    fn test_compute_preserves_order_and_count() {
        let windows = vec![WindowId::new(9), WindowId::new(3), WindowId::new(7), WindowId::new(1)];
        let result = compute(&windows, &screen(), &LayoutConfig::default());
        let out: Vec<WindowId> = result.iter().map(|c| c.window_id).collect();
        assert_eq!(out, windows);
    }

    #[test]
    fn test_compute_no_padding_no_gaps() {
        let config = LayoutConfig::new(0, 0, 0.5);
        let result = compute(&ids(2), &screen(), &config);
        assert_eq!(result[0].frame, Rect::new(0.0, 0.0, 960.0, 1080.0));
        assert_eq!(result[1].frame, Rect::new(960.0, 0.0, 960.0, 1080.0));
    }

    #[test]
    fn test_compute_ratio_shifts_split() {
        let config = LayoutConfig::new(0, 0, 0.75);
        let result = compute(&ids(2), &screen(), &config);
        assert!((result[0].frame.width - 1440.0).abs() < f64::EPSILON);
        assert!((result[1].frame.x - 1440.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_compute_huge_stack_is_not_clamped() {
        // 200 stack slots with 10px gaps need more than 1060px of gaps alone.
        let result = compute(&ids(201), &screen(), &LayoutConfig::default());
        assert_eq!(result.len(), 201);
        assert!(result[1].frame.height < 0.0);
    }

    #[test]
    fn test_compute_with_limit_truncates() {
        let result = compute_with_limit(&ids(5), &screen(), &LayoutConfig::default(), 3);
        assert_eq!(result.len(), 3);
        assert_eq!(result[2].window_id, WindowId::new(3));
    }
}
