//! Actions accepted by the reducer.
//!
//! The wire shape matches the browser client's dispatch calls: a
//! `SCREAMING_SNAKE_CASE` `type` tag with camelCase payload fields, e.g.
//! `{"type":"INCREMENT_LABOR","name":"Bread","laborChange":1}`. Tags this
//! crate does not know deserialize to [`Action::Unrecognized`] so that
//! collaborators added later never break the reducer.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A state transition request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "bindings/")]
pub enum Action {
    /// Advance the simulation by one step.
    Tick,
    /// Move workers between the unassigned pool and a commodity.
    /// Positive values assign, negative values unassign.
    #[serde(rename_all = "camelCase")]
    IncrementLabor {
        /// Target commodity.
        name: String,
        /// Signed number of workers to move.
        labor_change: i64,
    },
    /// Adjust a commodity's price.
    #[serde(rename_all = "camelCase")]
    IncrementPrice {
        /// Target commodity.
        name: String,
        /// Signed price delta.
        #[ts(as = "String")]
        price_change: Decimal,
    },
    /// Adjust the wage paid to every assigned worker.
    #[serde(rename_all = "camelCase")]
    IncrementWages {
        /// Signed wage delta.
        #[ts(as = "String")]
        wage_change: Decimal,
    },
    /// Begin periodic ticking.
    StartTick,
    /// Cancel periodic ticking.
    StopTick,
    /// Push a status message onto the ticker. Dispatched by event collaborators.
    AppendTicker {
        /// Message text.
        message: String,
    },
    /// Make a commodity visible and workable. Dispatched by event collaborators.
    Unlock {
        /// Target commodity.
        name: String,
    },
    /// End the run. Dispatched by the game-over collaborator.
    EndGame {
        /// Human-readable reason, also pushed to the ticker.
        reason: String,
    },
    /// Any tag this engine does not understand. Always a no-op.
    /// Never sent by clients, so it is left out of the `TypeScript` union.
    #[serde(other)]
    #[ts(skip)]
    Unrecognized,
}

impl Action {
    /// Short label for logging.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Tick => "TICK",
            Self::IncrementLabor { .. } => "INCREMENT_LABOR",
            Self::IncrementPrice { .. } => "INCREMENT_PRICE",
            Self::IncrementWages { .. } => "INCREMENT_WAGES",
            Self::StartTick => "START_TICK",
            Self::StopTick => "STOP_TICK",
            Self::AppendTicker { .. } => "APPEND_TICKER",
            Self::Unlock { .. } => "UNLOCK",
            Self::EndGame { .. } => "END_GAME",
            Self::Unrecognized => "UNRECOGNIZED",
        }
    }
}
