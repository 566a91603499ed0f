//! Enumeration types shared by the engine and the browser client.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// DemandCurve
// ---------------------------------------------------------------------------

/// How a commodity's per-tick demand is derived from price and population.
///
/// Demand curves are a closed set of strategies with numeric parameters so
/// that catalogs can be loaded from configuration and compared for equality.
/// Evaluation lives in `tycoon-core::catalog`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum DemandCurve {
    /// Necessity goods: demand scales with population and rises as the price
    /// drops below `saturation_price`.
    ///
    /// `per_capita * population * (saturation_price + 1 - price)` while
    /// `price <= saturation_price`, otherwise `per_capita * population`.
    Staple {
        /// Units demanded per head at the saturation price.
        #[ts(as = "String")]
        per_capita: Decimal,
        /// Price at or below which demand starts climbing.
        #[ts(as = "String")]
        saturation_price: Decimal,
    },
    /// Price-elastic goods: `max(1, floor(scale * population / price))`.
    ///
    /// A zero price is treated as one cent.
    Elastic {
        /// Demand multiplier applied to population.
        #[ts(as = "String")]
        scale: Decimal,
    },
    /// Constant demand regardless of price and population.
    Fixed {
        /// Units demanded every tick.
        quantity: u64,
    },
    /// Demand equals the units another commodity sold this tick.
    ///
    /// The source commodity must precede this one in catalog order.
    SalesOf {
        /// Name of the commodity whose sales drive demand.
        commodity: String,
    },
}

// ---------------------------------------------------------------------------
// SchedulerState
// ---------------------------------------------------------------------------

/// Whether the periodic tick trigger is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum SchedulerState {
    /// No ticks are produced. Initial state.
    #[default]
    Stopped,
    /// Ticks are produced every `ms_per_tick` milliseconds.
    Running,
}

impl SchedulerState {
    /// Return `true` when the simulation is advancing on its own.
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }
}
