//! Master layout - one master window with remaining windows in a stack.
//!
//! ```text
//! ┌──────────┬─────┐
//! │          │  2  │
//! │  Master  ├─────┤
//! │          │  3  │
//! └──────────┴─────┘
//! ```
//!
//! The working area is the screen inset by `padding`. The master takes
//! `working.width * ratio - gaps / 2`; the stack takes the rest minus one gap
//! and is split into equal-height slots with `gaps` between them.

use super::{LayoutCommand, LayoutConfig, LayoutResult};
use crate::tiling::state::{Rect, WindowId};

#[allow(clippy::cast_precision_loss)] // Window counts won't exceed f64 precision
pub(super) fn layout(windows: &[WindowId], screen: &Rect, config: &LayoutConfig) -> LayoutResult {
    let mut result = LayoutResult::new();
    let Some((&master, stack)) = windows.split_first() else {
        return result;
    };

    let working = screen.inset(f64::from(config.padding()));

    if stack.is_empty() {
        result.push(LayoutCommand::new(master, working));
        return result;
    }

    let gaps = f64::from(config.gaps());
    let master_width = working.width.mul_add(config.master_ratio(), -gaps / 2.0);
    result.push(LayoutCommand::new(
        master,
        Rect::new(working.x, working.y, master_width, working.height),
    ));

    let stack_x = working.x + master_width + gaps;
    let stack_width = working.width - master_width - gaps;
    let stack_count = stack.len() as f64;
    let slot_height = gaps.mul_add(-(stack_count - 1.0), working.height) / stack_count;

    for (i, &id) in stack.iter().enumerate() {
        let y = (i as f64).mul_add(slot_height + gaps, working.y);
        result.push(LayoutCommand::new(id, Rect::new(stack_x, y, stack_width, slot_height)));
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stack_slots_are_contiguous_with_gaps() {
        let windows: Vec<WindowId> = (1..=4).map(WindowId::new).collect();
        let config = LayoutConfig::new(8, 0, 0.5);
        let result = layout(&windows, &Rect::new(0.0, 0.0, 1000.0, 616.0), &config);

        // (616 - 8 * 2) / 3 = 200
        for pair in result[1..].windows(2) {
            let (upper, lower) = (pair[0].frame, pair[1].frame);
            assert!((upper.height - 200.0).abs() < f64::EPSILON);
            assert!((lower.y - (upper.y + upper.height + 8.0)).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_master_and_stack_cover_working_width() {
        let windows: Vec<WindowId> = (1..=2).map(WindowId::new).collect();
        let config = LayoutConfig::new(12, 20, 0.65);
        let screen = Rect::new(100.0, 50.0, 1440.0, 900.0);
        let result = layout(&windows, &screen, &config);

        let master = result[0].frame;
        let stack = result[1].frame;
        let working = screen.inset(20.0);
        let covered = master.width + 12.0 + stack.width;
        assert!((covered - working.width).abs() < 1e-9);
        assert!((stack.x + stack.width - (working.x + working.width)).abs() < 1e-9);
    }
}
