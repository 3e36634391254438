//! Tile model: identifiers, labels, placed tiles, and label-driven sizing.
//!
//! A tile's size is fixed when it is created and derives from the on-screen
//! width of its label text. Measuring text is the host's business, so it is
//! injected through [`TextMeasure`]; [`FixedAdvance`] is the stand-in used
//! when no real font metrics are available.

#[cfg(test)]
#[path = "tile_test.rs"]
mod tile_test;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_CHAR_ADVANCE, MIN_TILE_WIDTH, PLACEHOLDER_COLOR, PLACEHOLDER_TEXT, TILE_HEIGHT, TILE_PADDING_X};
use crate::geometry::{Footprint, Point, Size};

/// Registry-assigned tile identifier. Monotonic, never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TileId(pub u64);

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Element identity and display tint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Label {
    /// Element name; identity for toolbar uniqueness and lookups.
    pub text: String,
    /// Canonical `#rrggbb` tint.
    pub color: String,
}

impl Label {
    #[must_use]
    pub fn new(text: impl Into<String>, color: impl Into<String>) -> Self {
        Self { text: text.into(), color: color.into() }
    }

    /// The fixed label shown when two elements do not combine.
    #[must_use]
    pub fn placeholder() -> Self {
        Self::new(PLACEHOLDER_TEXT, PLACEHOLDER_COLOR)
    }
}

/// A tile placed on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub id: TileId,
    /// Center point in canvas coordinates.
    pub position: Point,
    pub size: Size,
    pub label: Label,
    /// Bumped on every accepted move; lets async completions detect staleness.
    pub version: u64,
}

impl Tile {
    #[must_use]
    pub fn footprint(&self) -> Footprint {
        Footprint::new(self.position, self.size)
    }
}

/// Measures the rendered width of a label.
pub trait TextMeasure {
    fn measure(&self, text: &str) -> f64;
}

impl<F> TextMeasure for F
where
    F: Fn(&str) -> f64,
{
    fn measure(&self, text: &str) -> f64 {
        self(text)
    }
}

/// Monospace approximation: a constant advance per character.
#[derive(Debug, Clone, Copy)]
pub struct FixedAdvance {
    pub advance: f64,
}

impl Default for FixedAdvance {
    fn default() -> Self {
        Self { advance: DEFAULT_CHAR_ADVANCE }
    }
}

impl TextMeasure for FixedAdvance {
    fn measure(&self, text: &str) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let chars = text.chars().count() as f64;
        chars * self.advance
    }
}

/// Tile size for `text`: padded measured width (at least the minimum) by the fixed height.
#[must_use]
pub fn tile_size(measure: &dyn TextMeasure, text: &str) -> Size {
    let width = (measure.measure(text) + 2.0 * TILE_PADDING_X).max(MIN_TILE_WIDTH);
    Size::new(width, TILE_HEIGHT)
}
