//! Shared numeric constants for the placement and merge engine.

// ── Tile metrics ────────────────────────────────────────────────

/// Fixed tile height in canvas pixels.
pub const TILE_HEIGHT: f64 = 32.0;

/// Horizontal padding added on each side of the measured label width.
pub const TILE_PADDING_X: f64 = 12.0;

/// Narrowest a tile may be, regardless of label length.
pub const MIN_TILE_WIDTH: f64 = 32.0;

/// Advance width per character used by the default text measurer.
pub const DEFAULT_CHAR_ADVANCE: f64 = 8.0;

// ── Placement ───────────────────────────────────────────────────

/// Extra separation required between tiles at placement time.
pub const PLACEMENT_MARGIN: f64 = 0.0;

/// Center distance below which a drag release triggers merge evaluation.
pub const MERGE_PROXIMITY: f64 = 40.0;

/// Random candidates tried before a toolbar spawn gives up.
pub const SPAWN_ATTEMPTS: usize = 100;

/// Radial step of the free-slot search used to settle merge results.
pub const SETTLE_STEP: f64 = 4.0;

// ── Placeholder ─────────────────────────────────────────────────

/// Glyph shown when two elements have no known combination.
pub const PLACEHOLDER_TEXT: &str = "❓";

/// Neutral tint of the placeholder tile.
pub const PLACEHOLDER_COLOR: &str = "#9e9e9e";
