//! Shared type definitions for the Tycoon economy engine.
//!
//! This crate is the single source of truth for the data the engine and the
//! browser client exchange. Types are exported to `TypeScript` via `ts-rs`
//! so the rendering layer can consume snapshots and build actions.
//!
//! # Modules
//!
//! - [`enums`] -- Demand-curve strategies and scheduler state
//! - [`structs`] -- [`Commodity`] and the aggregate [`GameState`]
//! - [`actions`] -- The [`Action`] variants the reducer accepts

pub mod actions;
pub mod enums;
pub mod structs;

pub use actions::Action;
pub use enums::{DemandCurve, SchedulerState};
pub use structs::{Commodity, GameState};
