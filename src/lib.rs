//! Element-merging sandbox.
//!
//! Tiles labelled with elements ("Water", "Fire") sit on a bounded 2D
//! canvas. Dropping one tile next to another asks a remote service what the
//! pair makes; the answer replaces both tiles with a single new one and is
//! added to the toolbar for later spawning. Tiles never overlap and never
//! leave the canvas.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Testable [`engine::EngineCore`] turning input into [`engine::Action`]s |
//! | [`registry`] | Tile store enforcing the bounds and no-overlap rules |
//! | [`tile`] | Tile, label and text-measure types |
//! | [`geometry`] | Points, sizes, footprints and the overlap predicates |
//! | [`input`] | Drag state machine |
//! | [`hit`] | Hit-testing pointer positions against tiles |
//! | [`merge`] | Merge partner search, tickets and result composition |
//! | [`catalog`] | Toolbar entries and random spawn placement |
//! | [`color`] | Hex color parsing and blending |
//! | [`remote`] | HTTP clients for combination lookup and score submission |
//! | [`runtime`] | Single-owner session task driving an engine |
//! | [`server`] | Axum element server backing the two endpoints, with optional generation |
//! | [`config`] | Environment-driven configuration |
//! | [`consts`] | Shared numeric constants (tile metrics, thresholds, etc.) |

pub mod catalog;
pub mod color;
pub mod config;
pub mod consts;
pub mod engine;
pub mod geometry;
pub mod hit;
pub mod input;
pub mod merge;
pub mod registry;
pub mod remote;
pub mod runtime;
pub mod server;
pub mod tile;
