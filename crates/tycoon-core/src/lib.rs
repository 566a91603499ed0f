//! Reducer, market clearing, and tick scheduling for the Tycoon economy.
//!
//! Game state only changes by dispatching an [`Action`] through the
//! [`Reducer`]. A `TICK` grows the labor pool, clears the market for every
//! unlocked commodity, settles capital and savings, and recomputes unrest.
//! The [`Store`] hosts the live state, drives the periodic tick
//! [`Scheduler`], and notifies registered observers.
//!
//! # Modules
//!
//! - [`catalog`] -- Commodity catalog validation, instantiation, and demand
//!   curve evaluation.
//! - [`config`] -- Configuration loading from `tycoon-config.yaml` into
//!   strongly-typed structs.
//! - [`invariants`] -- Checks for price, wage, unrest, ticker, and workforce
//!   rules across transitions.
//! - [`market`] -- Per-tick production and sales.
//! - [`numeric`] -- Decimal helpers shared by the tick phases.
//! - [`population`] -- Periodic labor pool growth.
//! - [`reducer`] -- The pure action reducer.
//! - [`scheduler`] -- Cancellable periodic tick trigger.
//! - [`store`] -- Dispatch host, observers, and state snapshots.
//! - [`treasury`] -- Capital, savings, and unrest settlement.
//!
//! [`Action`]: tycoon_types::Action
//! [`Reducer`]: reducer::Reducer
//! [`Store`]: store::Store
//! [`Scheduler`]: scheduler::Scheduler

pub mod catalog;
pub mod config;
pub mod invariants;
pub mod market;
pub mod numeric;
pub mod population;
pub mod reducer;
pub mod scheduler;
pub mod store;
pub mod treasury;
