#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::geometry::Point;
use crate::registry::TileRegistry;
use crate::tile::TileId;

/// Test which tile (if any) is under `pt`.
///
/// Newer tiles are drawn above older ones, so the highest matching id wins.
#[must_use]
pub fn hit_test(pt: Point, registry: &TileRegistry) -> Option<TileId> {
    registry
        .tiles()
        .filter(|tile| tile.footprint().contains_point(pt))
        .map(|tile| tile.id)
        .max()
}
