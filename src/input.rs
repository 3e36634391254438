//! Input model: the drag state machine.
//!
//! `DragState` is the gesture tracked between pointer-down and pointer-up.
//! Only one tile can be held at a time; the variant makes a second
//! concurrent drag unrepresentable. The engine drives the transitions and
//! turns them into registry mutations.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::geometry::Point;
use crate::tile::TileId;

/// Internal state for the drag state machine.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// A tile is held and follows the pointer.
    Dragging {
        /// Id of the held tile.
        id: TileId,
        /// Pointer position at the latest event; used as the release point
        /// when the pointer leaves the container.
        last_pointer: Point,
    },
}

impl DragState {
    /// Id of the held tile, if any.
    #[must_use]
    pub fn held(&self) -> Option<TileId> {
        match self {
            Self::Idle => None,
            Self::Dragging { id, .. } => Some(*id),
        }
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging { .. })
    }

    /// `Idle → Dragging`. Returns false (and changes nothing) if a drag is
    /// already in progress.
    pub fn begin(&mut self, id: TileId, pointer: Point) -> bool {
        if self.is_dragging() {
            return false;
        }
        *self = Self::Dragging { id, last_pointer: pointer };
        true
    }

    /// Record a pointer move, returning the held tile.
    pub fn track(&mut self, pointer: Point) -> Option<TileId> {
        match self {
            Self::Idle => None,
            Self::Dragging { id, last_pointer } => {
                *last_pointer = pointer;
                Some(*id)
            }
        }
    }

    /// `Dragging → Idle`, yielding the held tile and the release point.
    pub fn release(&mut self, pointer: Option<Point>) -> Option<(TileId, Point)> {
        let released = match *self {
            Self::Idle => None,
            Self::Dragging { id, last_pointer } => Some((id, pointer.unwrap_or(last_pointer))),
        };
        *self = Self::Idle;
        released
    }
}
