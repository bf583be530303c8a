use serde::Serialize;
use std::fmt;

/// Series colors, assigned round-robin in legend order.
pub const PALETTE: [Color; 7] = [
    Color("#36a2eb"), // Blue
    Color("#ff6384"), // Red
    Color("#4bc0c0"), // Teal
    Color("#ff9f40"), // Orange
    Color("#9966ff"), // Purple
    Color("#ffcd56"), // Yellow
    Color("#c9cbcf"), // Grey
];

/// A CSS hex color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Color(&'static str);

impl Color {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Color of the series at `index` in legend order.
#[must_use]
pub fn color_for(index: usize) -> Color {
    PALETTE[index % PALETTE.len()]
}
