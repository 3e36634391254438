#![allow(clippy::float_cmp)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::*;

// =============================================================
// Helpers
// =============================================================

fn water() -> Label {
    Label::new("Water", "#0077ff")
}

fn fire() -> Label {
    Label::new("Fire", "#ff4d4d")
}

fn engine() -> EngineCore {
    let config = EngineConfig { seed: Some(42), ..EngineConfig::default() };
    EngineCore::with_config(Size::new(400.0, 300.0), config, Box::new(FixedAdvance::default()))
        .with_toolbar([water(), fire()])
}

/// Place `text` with a canvas click at `pt` and return the new tile.
fn click_place(core: &mut EngineCore, text: &str, pt: Point) -> Tile {
    assert!(core.select(Some(text)));
    let actions = core.on_pointer_down(pt);
    core.select(None);
    match actions.as_slice() {
        [Action::TileCreated(tile)] => tile.clone(),
        other => panic!("expected TileCreated, got {other:?}"),
    }
}

/// Water at (100,100) and Fire at (170,100), then drag Water onto Fire.
fn water_dropped_on_fire(core: &mut EngineCore) -> (Tile, Tile, MergeTicket) {
    let w = click_place(core, "Water", Point::new(100.0, 100.0));
    let f = click_place(core, "Fire", Point::new(170.0, 100.0));
    core.on_pointer_down(w.position);
    core.on_pointer_move(Point::new(150.0, 100.0));
    let ticket = expect_lookup(core.on_pointer_up(Point::new(160.0, 100.0)));
    (w, f, ticket)
}

fn expect_lookup(actions: Vec<Action>) -> MergeTicket {
    match actions.as_slice() {
        [Action::LookupRequested(ticket)] => ticket.clone(),
        other => panic!("expected LookupRequested, got {other:?}"),
    }
}

fn assert_invariant(core: &EngineCore) {
    let tiles: Vec<&Tile> = core.registry().tiles().collect();
    for (i, a) in tiles.iter().enumerate() {
        assert!(geometry::contains(core.registry().bounds(), a.footprint()));
        for b in &tiles[i + 1..] {
            assert!(!geometry::overlaps(a.footprint(), b.footprint(), 0.0), "{} overlaps {}", a.id, b.id);
        }
    }
}

// =============================================================
// Placement clicks
// =============================================================

#[test]
fn click_without_selection_does_nothing() {
    let mut core = engine();
    assert!(core.on_pointer_down(Point::new(50.0, 50.0)).is_empty());
    assert_eq!(core.score(), 0);
}

#[test]
fn click_places_selected_element_clamped() {
    let mut core = engine();
    let tile = click_place(&mut core, "Water", Point::new(0.0, 0.0));
    assert_eq!(tile.position, Point::new(32.0, 16.0));
    assert_eq!(tile.label, water());
}

#[test]
fn click_onto_existing_tile_starts_drag_instead_of_placing() {
    let mut core = engine();
    let tile = click_place(&mut core, "Water", Point::new(100.0, 100.0));
    core.select(Some("Fire"));
    assert!(core.on_pointer_down(Point::new(105.0, 100.0)).is_empty());
    assert_eq!(core.drag().held(), Some(tile.id));
    assert_eq!(core.score(), 1);
}

#[test]
fn overlapping_placement_is_silently_refused() {
    let mut core = engine();
    click_place(&mut core, "Water", Point::new(100.0, 100.0));
    core.select(Some("Fire"));
    assert!(core.on_pointer_down(Point::new(150.0, 110.0)).is_empty());
    assert_eq!(core.score(), 1);
}

// =============================================================
// Drag controller
// =============================================================

#[test]
fn drag_moves_tile_with_pointer() {
    let mut core = engine();
    let tile = click_place(&mut core, "Water", Point::new(100.0, 100.0));
    core.on_pointer_down(tile.position);
    let actions = core.on_pointer_move(Point::new(200.0, 150.0));
    assert_eq!(actions, vec![Action::TileMoved { id: tile.id, position: Point::new(200.0, 150.0) }]);
    assert_eq!(core.tile(tile.id).unwrap().position, Point::new(200.0, 150.0));
}

#[test]
fn drag_clamps_at_container_edge() {
    let mut core = engine();
    let tile = click_place(&mut core, "Water", Point::new(100.0, 100.0));
    core.on_pointer_down(tile.position);
    core.on_pointer_move(Point::new(-40.0, 500.0));
    assert_eq!(core.tile(tile.id).unwrap().position, Point::new(32.0, 284.0));
}

#[test]
fn blocked_move_is_a_silent_no_op() {
    let mut core = engine();
    let w = click_place(&mut core, "Water", Point::new(100.0, 100.0));
    click_place(&mut core, "Fire", Point::new(170.0, 100.0));
    core.on_pointer_down(w.position);
    assert!(core.on_pointer_move(Point::new(150.0, 100.0)).is_empty());
    assert_eq!(core.tile(w.id).unwrap().position, Point::new(100.0, 100.0));
    assert!(core.drag().is_dragging());
}

#[test]
fn move_without_drag_is_ignored() {
    let mut core = engine();
    let w = click_place(&mut core, "Water", Point::new(100.0, 100.0));
    assert!(core.on_pointer_move(Point::new(200.0, 200.0)).is_empty());
    assert_eq!(core.tile(w.id).unwrap().position, w.position);
}

#[test]
fn pointer_down_while_dragging_is_ignored() {
    let mut core = engine();
    let w = click_place(&mut core, "Water", Point::new(100.0, 100.0));
    click_place(&mut core, "Fire", Point::new(300.0, 100.0));
    core.on_pointer_down(w.position);
    core.select(Some("Fire"));
    assert!(core.on_pointer_down(Point::new(300.0, 100.0)).is_empty());
    assert!(core.on_pointer_down(Point::new(200.0, 250.0)).is_empty());
    assert_eq!(core.drag().held(), Some(w.id));
    assert_eq!(core.score(), 2);
}

#[test]
fn release_away_from_others_relocates_and_idles() {
    let mut core = engine();
    let w = click_place(&mut core, "Water", Point::new(100.0, 100.0));
    core.on_pointer_down(w.position);
    let actions = core.on_pointer_up(Point::new(250.0, 200.0));
    assert_eq!(actions, vec![Action::TileMoved { id: w.id, position: Point::new(250.0, 200.0) }]);
    assert_eq!(core.drag(), DragState::Idle);
}

#[test]
fn pointer_leave_releases_at_last_pointer() {
    let mut core = engine();
    let w = click_place(&mut core, "Water", Point::new(100.0, 100.0));
    core.on_pointer_down(w.position);
    core.on_pointer_move(Point::new(200.0, 120.0));
    core.on_pointer_leave();
    assert_eq!(core.drag(), DragState::Idle);
    assert_eq!(core.tile(w.id).unwrap().position, Point::new(200.0, 120.0));
}

#[test]
fn pointer_up_while_idle_is_ignored() {
    let mut core = engine();
    assert!(core.on_pointer_up(Point::new(10.0, 10.0)).is_empty());
    assert!(core.on_pointer_leave().is_empty());
}

// =============================================================
// Merge resolution
// =============================================================

#[test]
fn drop_near_other_tile_requests_lookup_and_keeps_both() {
    let mut core = engine();
    let (w, f, ticket) = water_dropped_on_fire(&mut core);
    assert_eq!(ticket.elements(), ("Water", "Fire"));
    assert_eq!(ticket.dragged.id, w.id);
    assert_eq!(ticket.other.id, f.id);
    assert_eq!(core.drag(), DragState::Idle);
    assert_eq!(core.pending().len(), 1);
    assert!(core.tile(w.id).is_some());
    assert!(core.tile(f.id).is_some());
}

#[test]
fn lookup_hit_replaces_both_with_blended_midpoint_tile() {
    let mut core = engine();
    let (w, f, ticket) = water_dropped_on_fire(&mut core);
    let actions = core.complete_merge(ticket.ticket, LookupOutcome::Combined("Steam".into()));

    let [Action::TilesMerged { consumed, created }, Action::ToolbarEntryAdded(entry)] = actions.as_slice() else {
        panic!("unexpected actions {actions:?}");
    };
    assert_eq!(*consumed, [w.id, f.id]);
    assert_eq!(created.label, Label::new("Steam", "#8062a6"));
    assert_eq!(created.position, Point::new(135.0, 100.0));
    assert_eq!(created.size, tile_size(&FixedAdvance::default(), "Steam"));
    assert_eq!(entry.text, "Steam");

    assert_eq!(core.score(), 1);
    assert!(core.catalog().contains("Steam"));
    assert!(core.pending().is_empty());
}

#[test]
fn known_result_does_not_grow_toolbar() {
    let mut core = engine();
    let (_, _, ticket) = water_dropped_on_fire(&mut core);
    let actions = core.complete_merge(ticket.ticket, LookupOutcome::Combined("Water".into()));
    assert_eq!(actions.len(), 1);
    assert_eq!(core.catalog().len(), 2);
}

#[test]
fn no_combination_yields_placeholder() {
    let mut core = engine();
    let (w, f, ticket) = water_dropped_on_fire(&mut core);
    let actions = core.complete_merge(ticket.ticket, LookupOutcome::NoCombination);
    let [Action::TilesMerged { created, .. }] = actions.as_slice() else {
        panic!("unexpected actions {actions:?}");
    };
    assert_eq!(created.label, Label::placeholder());
    assert_eq!(created.position, Point::new(135.0, 100.0));
    assert!(core.tile(w.id).is_none());
    assert!(core.tile(f.id).is_none());
    assert_eq!(core.catalog().len(), 2);
}

#[test]
fn question_mark_element_reaches_toolbar() {
    let mut core = engine();
    let (_, _, ticket) = water_dropped_on_fire(&mut core);
    let actions = core.complete_merge(ticket.ticket, LookupOutcome::Combined("❓".into()));
    let entry = ToolbarEntry::from(&Label::new("❓", "#8062a6"));
    assert!(actions.contains(&Action::ToolbarEntryAdded(entry)));
    assert!(core.catalog().contains("❓"));
}

#[test]
fn with_toolbar_collapses_duplicate_seeds() {
    let core = EngineCore::new(Size::new(400.0, 300.0)).with_toolbar([water(), fire(), water()]);
    let texts: Vec<&str> = core.catalog().entries().iter().map(|e| e.text.as_str()).collect();
    assert_eq!(texts, ["Water", "Fire"]);
}

#[test]
fn lookup_failure_preserves_tiles_and_relocates_dragged() {
    let mut core = engine();
    let w = click_place(&mut core, "Water", Point::new(100.0, 100.0));
    let f = click_place(&mut core, "Fire", Point::new(170.0, 100.0));
    core.on_pointer_down(w.position);
    let ticket = expect_lookup(core.on_pointer_up(Point::new(160.0, 135.0)));
    let actions = core.complete_merge(ticket.ticket, LookupOutcome::Failed("connection refused".into()));
    assert_eq!(actions, vec![Action::TileMoved { id: w.id, position: Point::new(160.0, 135.0) }]);
    assert_eq!(core.tile(f.id).unwrap().position, f.position);
    assert_eq!(core.score(), 2);
    assert_eq!(core.catalog().len(), 2);
}

#[test]
fn lookup_failure_with_blocked_release_leaves_everything() {
    let mut core = engine();
    let (w, f, ticket) = water_dropped_on_fire(&mut core);
    assert!(core.complete_merge(ticket.ticket, LookupOutcome::Failed("timeout".into())).is_empty());
    assert_eq!(core.tile(w.id).unwrap().position, w.position);
    assert_eq!(core.tile(f.id).unwrap().position, f.position);
}

#[test]
fn completion_after_source_moved_is_discarded() {
    let mut core = engine();
    let (w, f, ticket) = water_dropped_on_fire(&mut core);
    core.on_pointer_down(f.position);
    core.on_pointer_move(Point::new(300.0, 250.0));
    core.on_pointer_up(Point::new(300.0, 250.0));

    let actions = core.complete_merge(ticket.ticket, LookupOutcome::Combined("Steam".into()));
    assert_eq!(actions, vec![Action::MergeDiscarded { ticket: ticket.ticket }]);
    assert!(core.tile(w.id).is_some());
    assert!(core.tile(f.id).is_some());
    assert!(!core.catalog().contains("Steam"));
}

#[test]
fn redragging_pending_tile_is_permitted() {
    let mut core = engine();
    let (w, _, _) = water_dropped_on_fire(&mut core);
    core.on_pointer_down(w.position);
    assert_eq!(core.drag().held(), Some(w.id));
}

#[test]
fn completion_after_clear_is_a_no_op() {
    let mut core = engine();
    let (_, _, ticket) = water_dropped_on_fire(&mut core);
    assert_eq!(core.clear(), vec![Action::Cleared]);
    assert!(core.complete_merge(ticket.ticket, LookupOutcome::Combined("Steam".into())).is_empty());
    assert_eq!(core.score(), 0);
    assert!(!core.catalog().contains("Steam"));
}

#[test]
fn duplicate_completion_is_ignored() {
    let mut core = engine();
    let (_, _, ticket) = water_dropped_on_fire(&mut core);
    core.complete_merge(ticket.ticket, LookupOutcome::NoCombination);
    assert!(core.complete_merge(ticket.ticket, LookupOutcome::NoCombination).is_empty());
}

#[test]
fn competing_tickets_only_first_completion_wins() {
    let mut core = engine();
    let w = click_place(&mut core, "Water", Point::new(100.0, 100.0));
    let f = click_place(&mut core, "Fire", Point::new(170.0, 100.0));
    let e = click_place(&mut core, "Water", Point::new(240.0, 100.0));

    core.on_pointer_down(w.position);
    let first = expect_lookup(core.on_pointer_up(Point::new(160.0, 100.0)));
    core.on_pointer_down(e.position);
    let second = expect_lookup(core.on_pointer_up(Point::new(180.0, 100.0)));
    assert_eq!(second.other.id, f.id);

    core.complete_merge(second.ticket, LookupOutcome::Combined("Steam".into()));
    let actions = core.complete_merge(first.ticket, LookupOutcome::Combined("Steam".into()));
    assert_eq!(actions, vec![Action::MergeDiscarded { ticket: first.ticket }]);
    assert_eq!(core.score(), 2);
    assert_invariant(&core);
}

// =============================================================
// Spawn / clear / score
// =============================================================

#[test]
fn spawn_places_known_element() {
    let mut core = engine();
    let actions = core.spawn("Fire");
    let [Action::TileCreated(tile)] = actions.as_slice() else {
        panic!("unexpected actions {actions:?}");
    };
    assert_eq!(tile.label, fire());
    assert_eq!(core.score(), 1);
}

#[test]
fn spawn_unknown_element_is_ignored() {
    let mut core = engine();
    assert!(core.spawn("Plasma").is_empty());
}

#[test]
fn spawn_on_full_canvas_is_silent() {
    let config = EngineConfig { seed: Some(1), ..EngineConfig::default() };
    let mut core = EngineCore::with_config(Size::new(64.0, 32.0), config, Box::new(FixedAdvance::default()))
        .with_toolbar([water()]);
    assert_eq!(core.spawn("Water").len(), 1);
    assert!(core.spawn("Water").is_empty());
    assert_eq!(core.score(), 1);
}

#[test]
fn clear_resets_tiles_drag_and_pending_but_keeps_toolbar() {
    let mut core = engine();
    let (w, _, _) = water_dropped_on_fire(&mut core);
    core.on_pointer_down(w.position);
    assert!(core.drag().is_dragging());
    core.clear();
    assert_eq!(core.score(), 0);
    assert_eq!(core.drag(), DragState::Idle);
    assert!(core.pending().is_empty());
    assert_eq!(core.catalog().len(), 2);
    assert!(core.tile(w.id).is_none());
}

// =============================================================
// Invariant under random input
// =============================================================

#[test]
fn random_sessions_preserve_invariant() {
    let mut core = engine();
    let mut rng = StdRng::seed_from_u64(2024);
    let mut tickets = Vec::new();
    for _ in 0..3_000 {
        let pt = Point::new(rng.random_range(-30.0..430.0), rng.random_range(-30.0..330.0));
        let actions = match rng.random_range(0..8) {
            0 => core.spawn(if rng.random_bool(0.5) { "Water" } else { "Fire" }),
            1 => core.on_pointer_down(pt),
            2 | 3 => core.on_pointer_move(pt),
            4 => core.on_pointer_up(pt),
            5 => core.on_pointer_leave(),
            6 => match tickets.pop() {
                Some(ticket) => core.complete_merge(ticket, LookupOutcome::Combined("Steam".into())),
                None => Vec::new(),
            },
            _ => {
                core.select(Some("Water"));
                let actions = core.on_pointer_down(pt);
                core.select(None);
                actions
            }
        };
        for action in actions {
            if let Action::LookupRequested(ticket) = action {
                tickets.push(ticket.ticket);
            }
        }
        assert_invariant(&core);
    }
}
