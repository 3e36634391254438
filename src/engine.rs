//! Engine core: turns pointer and toolbar input into registry mutations.
//!
//! `EngineCore` owns every piece of sandbox state: the tile registry, the
//! drag state machine, the toolbar catalog and the merge tickets awaiting a
//! lookup. Input handlers return [`Action`]s for the host to process; a
//! `LookupRequested` action is the host's cue to run the combination lookup
//! and feed the answer back through [`EngineCore::complete_merge`].

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use crate::catalog::{self, ToolbarCatalog, ToolbarEntry};
use crate::consts::{MERGE_PROXIMITY, PLACEMENT_MARGIN, SPAWN_ATTEMPTS};
use crate::geometry::{self, Point, Size};
use crate::hit::hit_test;
use crate::input::DragState;
use crate::merge::{self, LookupOutcome, MergeTicket, PendingMerges};
use crate::registry::{Rejected, TileRegistry};
use crate::tile::{FixedAdvance, Label, TextMeasure, Tile, TileId, tile_size};

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    TileCreated(Tile),
    TileMoved { id: TileId, position: Point },
    LookupRequested(MergeTicket),
    TilesMerged { consumed: [TileId; 2], created: Tile },
    ToolbarEntryAdded(ToolbarEntry),
    MergeDiscarded { ticket: u64 },
    Cleared,
}

/// Tunables for the placement and merge rules.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    /// Release distance that triggers merge evaluation.
    pub merge_proximity: f64,
    /// Extra separation enforced between tiles.
    pub placement_margin: f64,
    /// Random candidates tried per toolbar spawn.
    pub spawn_attempts: usize,
    /// Fixed RNG seed for reproducible spawns; OS entropy when absent.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            merge_proximity: MERGE_PROXIMITY,
            placement_margin: PLACEMENT_MARGIN,
            spawn_attempts: SPAWN_ATTEMPTS,
            seed: None,
        }
    }
}

/// Core engine state.
pub struct EngineCore {
    registry: TileRegistry,
    drag: DragState,
    catalog: ToolbarCatalog,
    pending: PendingMerges,
    config: EngineConfig,
    measure: Box<dyn TextMeasure + Send>,
    rng: StdRng,
}

impl EngineCore {
    /// Engine for a container of `bounds` with default rules and text metrics.
    #[must_use]
    pub fn new(bounds: Size) -> Self {
        Self::with_config(bounds, EngineConfig::default(), Box::new(FixedAdvance::default()))
    }

    #[must_use]
    pub fn with_config(bounds: Size, config: EngineConfig, measure: Box<dyn TextMeasure + Send>) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            registry: TileRegistry::with_margin(bounds, config.placement_margin),
            drag: DragState::Idle,
            catalog: ToolbarCatalog::new(),
            pending: PendingMerges::new(),
            config,
            measure,
            rng,
        }
    }

    /// Seed the toolbar with the host's starting elements.
    #[must_use]
    pub fn with_toolbar(mut self, seeds: impl IntoIterator<Item = Label>) -> Self {
        self.catalog = ToolbarCatalog::with_entries(seeds);
        self
    }

    // --- Pointer input ---

    /// Pointer pressed at `pt`. Grabs the tile under the pointer, or places
    /// the selected toolbar element on empty canvas. Ignored mid-drag.
    pub fn on_pointer_down(&mut self, pt: Point) -> Vec<Action> {
        if let Some(held) = self.drag.held() {
            debug!(tile = %held, "pointer down ignored while dragging");
            return Vec::new();
        }
        if let Some(id) = hit_test(pt, &self.registry) {
            self.drag.begin(id, pt);
            debug!(tile = %id, "drag started");
            return Vec::new();
        }
        match self.catalog.selected().map(ToolbarEntry::label) {
            Some(label) => {
                let size = tile_size(self.measure.as_ref(), &label.text);
                let pos = geometry::clamp_to_bounds(pt, size, self.registry.bounds());
                self.place(pos, size, label).into_iter().collect()
            }
            None => Vec::new(),
        }
    }

    /// Pointer moved to `pt`. The held tile follows if the clamped position is free.
    pub fn on_pointer_move(&mut self, pt: Point) -> Vec<Action> {
        let Some(id) = self.drag.track(pt) else {
            return Vec::new();
        };
        self.relocate(id, pt).into_iter().collect()
    }

    /// Pointer released at `pt`: resolve the drop, then return to idle.
    pub fn on_pointer_up(&mut self, pt: Point) -> Vec<Action> {
        match self.drag.release(Some(pt)) {
            Some((id, release)) => self.resolve_drop(id, release),
            None => Vec::new(),
        }
    }

    /// Pointer left the container: treated as a release at the last pointer position.
    pub fn on_pointer_leave(&mut self) -> Vec<Action> {
        match self.drag.release(None) {
            Some((id, release)) => self.resolve_drop(id, release),
            None => Vec::new(),
        }
    }

    // --- Toolbar ---

    /// Spawn the toolbar element `text` at a random free position.
    /// Unknown elements and exhausted attempts are silent no-ops.
    pub fn spawn(&mut self, text: &str) -> Vec<Action> {
        let Some(label) = self.catalog.get(text).map(ToolbarEntry::label) else {
            debug!(element = text, "spawn of unknown element ignored");
            return Vec::new();
        };
        let size = tile_size(self.measure.as_ref(), &label.text);
        match catalog::spawn_position(&self.registry, size, self.config.spawn_attempts, &mut self.rng) {
            Some(pos) => self.place(pos, size, label).into_iter().collect(),
            None => {
                debug!(element = text, attempts = self.config.spawn_attempts, "no room to spawn");
                Vec::new()
            }
        }
    }

    /// Choose the element placed by canvas clicks (`None` to deselect).
    pub fn select(&mut self, text: Option<&str>) -> bool {
        self.catalog.select(text)
    }

    // --- Merge completion ---

    /// Apply the lookup answer for `ticket`.
    ///
    /// Unknown tickets and tickets whose sources have moved or vanished are
    /// discarded. A failed lookup keeps both tiles and drops the dragged one
    /// at its release point instead.
    pub fn complete_merge(&mut self, ticket: u64, outcome: LookupOutcome) -> Vec<Action> {
        let Some(ticket) = self.pending.take(ticket) else {
            debug!(ticket, "completion for unknown ticket ignored");
            return Vec::new();
        };
        if !ticket.is_current(&self.registry) {
            info!(ticket = ticket.ticket, "stale merge discarded");
            return vec![Action::MergeDiscarded { ticket: ticket.ticket }];
        }

        let result = match outcome {
            LookupOutcome::Combined(text) => Some(text),
            LookupOutcome::NoCombination => None,
            LookupOutcome::Failed(reason) => {
                warn!(ticket = ticket.ticket, %reason, "combination lookup failed, merge aborted");
                return self.relocate(ticket.dragged.id, ticket.release).into_iter().collect();
            }
        };

        let (Some(dragged), Some(other)) = (self.registry.get(ticket.dragged.id), self.registry.get(ticket.other.id))
        else {
            return vec![Action::MergeDiscarded { ticket: ticket.ticket }];
        };
        let merged = merge::compose(dragged, other, result.as_deref(), self.measure.as_ref());

        let placeholder = merged.placeholder;
        let created = match self.registry.replace(
            ticket.dragged.id,
            ticket.other.id,
            merged.label,
            merged.size,
            merged.position,
        ) {
            Ok(tile) => tile,
            Err(err) => {
                warn!(ticket = ticket.ticket, error = %err, "merged tile does not fit, merge aborted");
                return self.relocate(ticket.dragged.id, ticket.release).into_iter().collect();
            }
        };

        info!(
            first = ticket.dragged.text.as_str(),
            second = ticket.other.text.as_str(),
            result = created.label.text.as_str(),
            "elements merged"
        );
        let mut actions = Vec::new();
        if !placeholder && self.catalog.register(&created.label) {
            actions.push(Action::ToolbarEntryAdded(ToolbarEntry::from(&created.label)));
        }
        actions.insert(0, Action::TilesMerged { consumed: [ticket.dragged.id, ticket.other.id], created });
        actions
    }

    // --- Session ---

    /// Remove every tile and forget outstanding merges. The toolbar is kept.
    pub fn clear(&mut self) -> Vec<Action> {
        self.registry.clear();
        self.pending.clear();
        self.drag = DragState::Idle;
        vec![Action::Cleared]
    }

    /// Current score: the number of tiles on the canvas.
    #[must_use]
    pub fn score(&self) -> usize {
        self.registry.len()
    }

    // --- Queries ---

    #[must_use]
    pub fn registry(&self) -> &TileRegistry {
        &self.registry
    }

    #[must_use]
    pub fn catalog(&self) -> &ToolbarCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn drag(&self) -> DragState {
        self.drag
    }

    #[must_use]
    pub fn pending(&self) -> &PendingMerges {
        &self.pending
    }

    #[must_use]
    pub fn tile(&self, id: TileId) -> Option<&Tile> {
        self.registry.get(id)
    }

    // --- Internals ---

    fn place(&mut self, pos: Point, size: Size, label: Label) -> Option<Action> {
        match self.registry.insert(pos, size, label) {
            Ok(tile) => Some(Action::TileCreated(tile)),
            Err(err) => {
                debug!(error = %err, "placement rejected");
                None
            }
        }
    }

    /// Move `id` to `pt` clamped into the container; rejection is silent.
    fn relocate(&mut self, id: TileId, pt: Point) -> Option<Action> {
        let tile = self.registry.get(id)?;
        let candidate = geometry::clamp_to_bounds(pt, tile.size, self.registry.bounds());
        let before = tile.position;
        match self.registry.move_tile(id, candidate) {
            Ok(()) if candidate != before => Some(Action::TileMoved { id, position: candidate }),
            Ok(()) => None,
            Err(err) => {
                log_rejection(id, err);
                None
            }
        }
    }

    fn resolve_drop(&mut self, id: TileId, release: Point) -> Vec<Action> {
        let partner = merge::find_partner(&self.registry, id, release, self.config.merge_proximity);
        let (Some(partner), Some(dragged)) = (partner, self.registry.get(id)) else {
            return self.relocate(id, release).into_iter().collect();
        };
        let Some(other) = self.registry.get(partner) else {
            return Vec::new();
        };
        let ticket = self.pending.issue(dragged, other, release);
        debug!(ticket = ticket.ticket, dragged = %id, other = %partner, "merge lookup requested");
        vec![Action::LookupRequested(ticket)]
    }
}

fn log_rejection(id: TileId, err: Rejected) {
    debug!(tile = %id, error = %err, "move rejected");
}
