//! Merge resolution: partner selection, pending tickets, result composition.
//!
//! DESIGN
//! ======
//! A drag release near another tile issues a `MergeTicket` and the lookup
//! runs asynchronously. Both source tiles stay in the registry until the
//! completion arrives. Each ticket pins the id and version of both sources;
//! if either tile has since moved, merged, or been cleared, the completion is
//! stale and is dropped instead of reconciled.

#[cfg(test)]
#[path = "merge_test.rs"]
mod merge_test;

use std::collections::BTreeMap;

use crate::color::blend_hex_colors;
use crate::geometry::{self, Point, Size};
use crate::registry::TileRegistry;
use crate::tile::{Label, TextMeasure, Tile, TileId, tile_size};

// =============================================================================
// PARTNER SELECTION
// =============================================================================

/// Nearest tile other than `dragged` whose center is within `threshold` of
/// `release`. Equal distances resolve to the lowest id.
#[must_use]
pub fn find_partner(registry: &TileRegistry, dragged: TileId, release: Point, threshold: f64) -> Option<TileId> {
    registry
        .tiles()
        .filter(|t| t.id != dragged)
        .filter(|t| geometry::within_proximity(release, t.position, threshold))
        .map(|t| (release.distance(t.position), t.id))
        .min_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)))
        .map(|(_, id)| id)
}

// =============================================================================
// TICKETS
// =============================================================================

/// Snapshot of a merge source at the moment the ticket was issued.
#[derive(Debug, Clone, PartialEq)]
pub struct TileRef {
    pub id: TileId,
    pub version: u64,
    pub text: String,
}

impl TileRef {
    fn of(tile: &Tile) -> Self {
        Self { id: tile.id, version: tile.version, text: tile.label.text.clone() }
    }

    /// Whether the registry still holds this tile, unmoved.
    fn is_current(&self, registry: &TileRegistry) -> bool {
        registry.get(self.id).is_some_and(|t| t.version == self.version)
    }
}

/// An in-flight combination lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeTicket {
    pub ticket: u64,
    pub dragged: TileRef,
    pub other: TileRef,
    /// Where the pointer was released; the dragged tile's fallback destination.
    pub release: Point,
}

impl MergeTicket {
    /// Lookup request shape: dragged element first.
    #[must_use]
    pub fn elements(&self) -> (&str, &str) {
        (&self.dragged.text, &self.other.text)
    }

    /// Whether both sources are still live and unmoved.
    #[must_use]
    pub fn is_current(&self, registry: &TileRegistry) -> bool {
        self.dragged.is_current(registry) && self.other.is_current(registry)
    }
}

/// Tickets awaiting their lookup completion.
#[derive(Debug, Default)]
pub struct PendingMerges {
    tickets: BTreeMap<u64, MergeTicket>,
    next_ticket: u64,
}

impl PendingMerges {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new ticket for `dragged` released at `release` near `other`.
    pub fn issue(&mut self, dragged: &Tile, other: &Tile, release: Point) -> MergeTicket {
        self.next_ticket += 1;
        let ticket =
            MergeTicket { ticket: self.next_ticket, dragged: TileRef::of(dragged), other: TileRef::of(other), release };
        self.tickets.insert(ticket.ticket, ticket.clone());
        ticket
    }

    /// Remove and return a ticket. `None` if it was never issued or was dropped.
    pub fn take(&mut self, ticket: u64) -> Option<MergeTicket> {
        self.tickets.remove(&ticket)
    }

    /// Drop every outstanding ticket; their completions become no-ops.
    pub fn clear(&mut self) {
        self.tickets.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }
}

// =============================================================================
// COMPLETION
// =============================================================================

/// What the combination lookup reported for a ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// The pair combines into this element.
    Combined(String),
    /// The service knows no combination for the pair.
    NoCombination,
    /// The lookup could not be completed.
    Failed(String),
}

/// Label, size and position of the tile replacing two merge sources.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedTile {
    pub label: Label,
    pub size: Size,
    pub position: Point,
    /// Set when no combination was found; placeholders never reach the toolbar.
    pub placeholder: bool,
}

/// Compose the replacement for `dragged` and `other`.
///
/// `result` is the combined element text, or `None` for the placeholder.
/// The tint blends both parents, the position is their midpoint, and the size
/// follows the new label.
#[must_use]
pub fn compose(dragged: &Tile, other: &Tile, result: Option<&str>, measure: &dyn TextMeasure) -> MergedTile {
    let label = match result {
        Some(text) => Label::new(text, blend_hex_colors(&dragged.label.color, &other.label.color)),
        None => Label::placeholder(),
    };
    let size = tile_size(measure, &label.text);
    MergedTile { label, size, position: dragged.position.midpoint(other.position), placeholder: result.is_none() }
}
