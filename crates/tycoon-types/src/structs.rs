//! Core entity structs: commodities and the aggregate game state.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{DemandCurve, SchedulerState};

// ---------------------------------------------------------------------------
// Commodity
// ---------------------------------------------------------------------------

/// A tradeable good worked by the shared labor pool.
///
/// Commodities are created from the catalog at game start and never removed.
/// The clearing step mutates `inventory`, `demand` and `num_sold` every tick;
/// player actions mutate `labor_assigned` and `price`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Commodity {
    /// Unique display name, also the key used by actions.
    pub name: String,
    /// Labor units needed to produce one unit of output.
    #[ts(as = "String")]
    pub labor_required: Decimal,
    /// Workers currently assigned to this commodity.
    pub labor_assigned: u64,
    /// Sale price per unit.
    #[ts(as = "String")]
    pub price: Decimal,
    /// Units produced but not yet sold.
    pub inventory: u64,
    /// Demand computed on the last tick.
    pub demand: u64,
    /// Units sold on the last tick.
    pub num_sold: u64,
    /// Whether the player can see and work this commodity.
    pub unlocked: bool,
    /// Strategy used to compute demand each tick.
    pub demand_curve: DemandCurve,
}

// ---------------------------------------------------------------------------
// GameState
// ---------------------------------------------------------------------------

/// The aggregate root threaded through the reducer.
///
/// Each reduction yields a new value; snapshots handed to observers are
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct GameState {
    /// Ticks elapsed since the game started.
    pub tick: u64,
    /// Owner's money. May go negative.
    #[ts(as = "String")]
    pub capital: Decimal,
    /// Unassigned workers.
    pub labor: u64,
    /// Wage paid per assigned worker per tick.
    #[ts(as = "String")]
    pub wages: Decimal,
    /// Money held by the workforce. May go negative.
    #[ts(as = "String")]
    pub labor_savings: Decimal,
    /// Socioeconomic stress index in `[0, 100]`.
    #[ts(as = "String")]
    pub unrest: Decimal,
    /// Status messages, most recent first.
    pub ticker: Vec<String>,
    /// Whether the periodic tick trigger is active.
    pub scheduler: SchedulerState,
    /// Commodities in catalog order.
    pub commodities: Vec<Commodity>,
    /// Set once a collaborator ends the run, holding the reason.
    pub game_over: Option<String>,
}

impl GameState {
    /// Workers assigned across all commodities.
    pub fn assigned_labor(&self) -> u64 {
        self.commodities
            .iter()
            .fold(0_u64, |acc, c| acc.saturating_add(c.labor_assigned))
    }

    /// Total workforce: the unassigned pool plus every assigned worker.
    pub fn total_population(&self) -> u64 {
        self.labor.saturating_add(self.assigned_labor())
    }

    /// Look up a commodity by name.
    pub fn commodity(&self, name: &str) -> Option<&Commodity> {
        self.commodities.iter().find(|c| c.name == name)
    }

    /// Look up a commodity by name for mutation.
    pub fn commodity_mut(&mut self, name: &str) -> Option<&mut Commodity> {
        self.commodities.iter_mut().find(|c| c.name == name)
    }

    /// Whether a collaborator has ended the run.
    pub const fn is_over(&self) -> bool {
        self.game_over.is_some()
    }
}
