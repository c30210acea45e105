//! Shared types for CLI commands.
//!
//! Argument types parsed by clap through their `FromStr` implementations.

use std::str::FromStr;

use crate::hotkey::Action;
use crate::tiling::Rect;

/// A screen frame given as `X,Y,W,H`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenFrame(Rect);

impl ScreenFrame {
    /// Returns the frame as a rectangle.
    #[must_use]
    pub const fn rect(self) -> Rect { self.0 }
}

impl Default for ScreenFrame {
    fn default() -> Self { Self(Rect::new(0.0, 0.0, 1920.0, 1080.0)) }
}

impl FromStr for ScreenFrame {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values: Vec<f64> = s
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<Result<_, _>>()
            .map_err(|_| format!("Invalid screen frame '{s}'. Expected X,Y,W,H."))?;

        match values.as_slice() {
            &[x, y, width, height] if values.iter().all(|v| v.is_finite()) => {
                Ok(Self(Rect::new(x, y, width, height)))
            }
            _ => Err(format!("Invalid screen frame '{s}'. Expected four numbers X,Y,W,H.")),
        }
    }
}

impl std::fmt::Display for ScreenFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{},{},{}", self.0.x, self.0.y, self.0.width, self.0.height)
    }
}

/// A comma-separated list of actions, e.g. `focus-right,move-left,promote`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionList(Vec<Action>);

impl ActionList {
    /// Returns the actions in order.
    #[must_use]
    pub fn actions(&self) -> &[Action] { &self.0 }
}

impl FromStr for ActionList {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::parse::<Action>)
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}
