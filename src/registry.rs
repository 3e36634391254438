//! Tile registry: the owned set of placed tiles.
//!
//! DESIGN
//! ======
//! All mutation goes through `insert`, `move_tile`, `replace` and `clear`, and
//! each of them checks the full placement rule before touching state. At any
//! observable point the tiles are pairwise non-overlapping and every tile's
//! box lies inside the container. A rejected operation leaves the registry
//! exactly as it was.
//!
//! Ids come from a counter that `clear` does not reset, so a stale id held by
//! an in-flight merge can never alias a newer tile.

#[cfg(test)]
#[path = "registry_test.rs"]
mod registry_test;

use std::collections::BTreeMap;
use std::f64::consts::TAU;

use tracing::debug;

use crate::consts::{PLACEMENT_MARGIN, SETTLE_STEP};
use crate::geometry::{self, Footprint, Point, Size};
use crate::tile::{Label, Tile, TileId};

// =============================================================================
// TYPES
// =============================================================================

/// Why a placement was refused.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum Rejected {
    #[error("tile not found: {0}")]
    UnknownTile(TileId),
    #[error("cannot merge tile {0} with itself")]
    SameTile(TileId),
    #[error("footprint leaves the container")]
    OutOfBounds,
    #[error("footprint overlaps tile {with}")]
    Overlap { with: TileId },
    #[error("no free position for the merged tile")]
    NoRoom,
}

/// In-memory store of placed tiles bounded by a container.
#[derive(Debug, Clone)]
pub struct TileRegistry {
    tiles: BTreeMap<TileId, Tile>,
    bounds: Size,
    margin: f64,
    next_id: u64,
}

impl TileRegistry {
    /// Create an empty registry for a container of `bounds`.
    #[must_use]
    pub fn new(bounds: Size) -> Self {
        Self::with_margin(bounds, PLACEMENT_MARGIN)
    }

    /// Create an empty registry with a custom placement margin.
    #[must_use]
    pub fn with_margin(bounds: Size, margin: f64) -> Self {
        Self { tiles: BTreeMap::new(), bounds, margin, next_id: 1 }
    }

    // =========================================================================
    // MUTATIONS
    // =========================================================================

    /// Place a new tile at `pos`.
    ///
    /// # Errors
    ///
    /// `OutOfBounds` if the box is not fully inside the container, `Overlap`
    /// if it would overlap an existing tile.
    pub fn insert(&mut self, pos: Point, size: Size, label: Label) -> Result<Tile, Rejected> {
        self.check_placement(Footprint::new(pos, size), &[])?;
        let tile = Tile { id: self.allocate_id(), position: pos, size, label, version: 1 };
        self.tiles.insert(tile.id, tile.clone());
        Ok(tile)
    }

    /// Move tile `id` to `pos`. Only the position (and version) change; a
    /// move to the current position is accepted without a version bump.
    ///
    /// # Errors
    ///
    /// `UnknownTile`, `OutOfBounds`, or `Overlap` with any other tile.
    pub fn move_tile(&mut self, id: TileId, pos: Point) -> Result<(), Rejected> {
        let current = self.tiles.get(&id).ok_or(Rejected::UnknownTile(id))?;
        if current.position == pos {
            return Ok(());
        }
        let size = current.size;
        self.check_placement(Footprint::new(pos, size), &[id])?;
        if let Some(tile) = self.tiles.get_mut(&id) {
            tile.position = pos;
            tile.version += 1;
        }
        Ok(())
    }

    /// Remove tiles `a` and `b` and place a new tile in one step.
    ///
    /// The result is clamped into the container; if it would overlap a
    /// surviving tile it settles at the nearest free position to `pos`.
    ///
    /// # Errors
    ///
    /// `SameTile` / `UnknownTile` when the sources are not two live tiles,
    /// `NoRoom` when no free position exists. Nothing changes on error.
    pub fn replace(&mut self, a: TileId, b: TileId, label: Label, size: Size, pos: Point) -> Result<Tile, Rejected> {
        if a == b {
            return Err(Rejected::SameTile(a));
        }
        for id in [a, b] {
            if !self.tiles.contains_key(&id) {
                return Err(Rejected::UnknownTile(id));
            }
        }

        let position = self.find_free_position(pos, size, &[a, b]).ok_or(Rejected::NoRoom)?;
        if position != pos {
            debug!(from = ?pos, to = ?position, "merge result settled");
        }

        self.tiles.remove(&a);
        self.tiles.remove(&b);
        let tile = Tile { id: self.allocate_id(), position, size, label, version: 1 };
        self.tiles.insert(tile.id, tile.clone());
        Ok(tile)
    }

    /// Remove every tile. The id counter keeps counting.
    pub fn clear(&mut self) {
        self.tiles.clear();
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    #[must_use]
    pub fn get(&self, id: TileId) -> Option<&Tile> {
        self.tiles.get(&id)
    }

    #[must_use]
    pub fn contains_tile(&self, id: TileId) -> bool {
        self.tiles.contains_key(&id)
    }

    /// Tiles in ascending id order (oldest first).
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    #[must_use]
    pub fn bounds(&self) -> Size {
        self.bounds
    }

    /// Check that `footprint` could be placed, ignoring the tiles in `ignore`.
    ///
    /// # Errors
    ///
    /// `OutOfBounds` or `Overlap` naming the lowest conflicting id.
    pub fn check_placement(&self, footprint: Footprint, ignore: &[TileId]) -> Result<(), Rejected> {
        if !geometry::contains(self.bounds, footprint) {
            return Err(Rejected::OutOfBounds);
        }
        let conflict = self
            .tiles
            .values()
            .filter(|t| !ignore.contains(&t.id))
            .find(|t| geometry::overlaps(footprint, t.footprint(), self.margin));
        match conflict {
            Some(t) => Err(Rejected::Overlap { with: t.id }),
            None => Ok(()),
        }
    }

    /// Nearest acceptable center to `pos` for a box of `size`, searching
    /// outward in rings. Tiles in `ignore` are treated as absent.
    #[must_use]
    pub fn find_free_position(&self, pos: Point, size: Size, ignore: &[TileId]) -> Option<Point> {
        let start = geometry::clamp_to_bounds(pos, size, self.bounds);
        if self.check_placement(Footprint::new(start, size), ignore).is_ok() {
            return Some(start);
        }

        let max_radius = self.bounds.width.hypot(self.bounds.height);
        let mut radius = SETTLE_STEP;
        while radius <= max_radius {
            let circumference = TAU * radius;
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let samples = ((circumference / SETTLE_STEP).ceil() as usize).max(8);
            for i in 0..samples {
                #[allow(clippy::cast_precision_loss)]
                let angle = TAU * i as f64 / samples as f64;
                let candidate = geometry::clamp_to_bounds(
                    Point::new(start.x + radius * angle.cos(), start.y + radius * angle.sin()),
                    size,
                    self.bounds,
                );
                if self.check_placement(Footprint::new(candidate, size), ignore).is_ok() {
                    return Some(candidate);
                }
            }
            radius += SETTLE_STEP;
        }
        None
    }

    fn allocate_id(&mut self) -> TileId {
        let id = TileId(self.next_id);
        self.next_id += 1;
        id
    }
}
