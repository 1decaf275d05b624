//! Interpreter configuration.

use serde::{Deserialize, Serialize};

use crate::types::color::Color;

/// Resource budgets for one run. Programs may lower or raise them with
/// `limitCommand`, `limitRecurse`, `limitDepth` and `limits`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    /// Deepest allowed user-function call chain.
    pub max_depth: u64,
    /// Total calls made at depth > 1.
    pub max_recursions: u64,
    /// Total built-in commands executed.
    pub max_commands: u64,
}

impl Limits {
    /// Highest `max_depth` a program may ask for. Call chains run on the
    /// native stack.
    pub const DEPTH_CEILING: u64 = 1_000;

    pub fn set_depth(&mut self, depth: u64) {
        self.max_depth = depth.min(Self::DEPTH_CEILING);
    }

    pub fn clamped(mut self) -> Self {
        self.set_depth(self.max_depth);
        self
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_depth: 360,
            max_recursions: 888_888,
            max_commands: 88_888_888,
        }
    }
}

/// Starting values applied on every `reset`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    pub limits: Limits,
    /// Pen color after reset.
    pub color: Color,
    /// Pen thickness after reset.
    pub thickness: f64,
    /// Turtle glyph size; `show` without an argument restores it.
    pub glyph_size: f64,
    /// Text size for `label` without a size argument.
    pub label_size: f64,
    /// Grid size for `grid` without arguments.
    pub grid_size: f64,
    pub grid_divisions: u32,
    /// Seed for `color random`. `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
            color: Color::WHITE,
            thickness: 1.0,
            glyph_size: 10.0,
            label_size: 12.0,
            grid_size: 100.0,
            grid_divisions: 10,
            seed: None,
        }
    }
}
