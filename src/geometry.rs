//! Pure geometry for tile placement: points, sizes, footprints, clamping,
//! overlap and proximity tests.
//!
//! Every tile is an axis-aligned box described by its center and size. The
//! canvas (container) spans `[0, width] × [0, height]` in the same space as
//! pointer positions. Nothing here holds state.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use serde::{Deserialize, Serialize};

/// A point in canvas-local coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Point halfway between `self` and `other`.
    #[must_use]
    pub fn midpoint(self, other: Point) -> Point {
        Point { x: (self.x + other.x) / 2.0, y: (self.y + other.y) / 2.0 }
    }
}

/// Width and height of a tile or of the container.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// The box a tile occupies: center position plus size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Footprint {
    pub center: Point,
    pub size: Size,
}

impl Footprint {
    #[must_use]
    pub fn new(center: Point, size: Size) -> Self {
        Self { center, size }
    }

    /// Whether `pt` lies inside the box (edges inclusive).
    #[must_use]
    pub fn contains_point(&self, pt: Point) -> bool {
        (pt.x - self.center.x).abs() <= self.size.width / 2.0
            && (pt.y - self.center.y).abs() <= self.size.height / 2.0
    }
}

/// Clamp `pos` so a tile of `size` lies fully inside `container`.
///
/// An axis on which the tile is larger than the container is centered; the
/// resulting footprint is then not contained and the registry rejects it.
#[must_use]
pub fn clamp_to_bounds(pos: Point, size: Size, container: Size) -> Point {
    Point {
        x: clamp_axis(pos.x, size.width, container.width),
        y: clamp_axis(pos.y, size.height, container.height),
    }
}

fn clamp_axis(value: f64, extent: f64, limit: f64) -> f64 {
    let half = extent / 2.0;
    let lo = half;
    let hi = limit - half;
    if lo > hi {
        return limit / 2.0;
    }
    value.clamp(lo, hi)
}

/// Whether `footprint` lies fully inside `container` (edges inclusive).
#[must_use]
pub fn contains(container: Size, footprint: Footprint) -> bool {
    let half_w = footprint.size.width / 2.0;
    let half_h = footprint.size.height / 2.0;
    footprint.center.x - half_w >= 0.0
        && footprint.center.x + half_w <= container.width
        && footprint.center.y - half_h >= 0.0
        && footprint.center.y + half_h <= container.height
}

/// Whether two footprints overlap, widened by `margin` on both axes.
///
/// Strict comparison: boxes that only touch along an edge do not overlap.
#[must_use]
pub fn overlaps(a: Footprint, b: Footprint, margin: f64) -> bool {
    let reach_x = (a.size.width + b.size.width) / 2.0 + margin;
    let reach_y = (a.size.height + b.size.height) / 2.0 + margin;
    (a.center.x - b.center.x).abs() < reach_x && (a.center.y - b.center.y).abs() < reach_y
}

/// Whether two centers are closer than `threshold`.
#[must_use]
pub fn within_proximity(a: Point, b: Point, threshold: f64) -> bool {
    a.distance(b) < threshold
}
