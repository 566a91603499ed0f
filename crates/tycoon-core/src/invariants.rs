//! Invariant verification for state transitions.
//!
//! The reducer upholds these rules by construction; the checks exist so the
//! store and the property tests can catch a regression the moment it
//! happens rather than several ticks later.
//!
//! Workforce conservation per action:
//!
//! ```text
//! TICK:            assigned(after) == assigned(before)
//!                  population(after) >= population(before)
//! everything else: population(after) == population(before)
//! ```
//!
//! State rules: prices and wages are non-negative, unrest lies in
//! `[0, 100]`, the ticker respects its cap, and no more workers are
//! assigned than exist.

use rust_decimal::Decimal;
use tycoon_types::{Action, GameState};

/// A broken invariant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Violation {
    /// A commodity's price is negative.
    #[error("commodity {0} has a negative price")]
    NegativePrice(String),

    /// Wages are negative.
    #[error("wages are negative")]
    NegativeWages,

    /// Unrest left the percentage range.
    #[error("unrest {0} is outside 0..=100")]
    UnrestOutOfRange(Decimal),

    /// The ticker holds more messages than allowed.
    #[error("ticker holds {len} messages, cap is {max}")]
    TickerOverflow {
        /// Messages held.
        len: usize,
        /// Configured cap.
        max: usize,
    },

    /// Workers appeared or vanished outside labor growth.
    #[error("workforce changed from {before} to {after} on {action}")]
    WorkforceChanged {
        /// Total population before the action.
        before: u64,
        /// Total population after the action.
        after: u64,
        /// The action's tag.
        action: &'static str,
    },

    /// A tick changed how many workers are assigned.
    #[error("tick changed assigned labor from {before} to {after}")]
    AssignmentChangedOnTick {
        /// Assigned labor before the tick.
        before: u64,
        /// Assigned labor after the tick.
        after: u64,
    },
}

/// Check the rules every individual state must satisfy.
pub fn check_state(state: &GameState, max_ticker_length: usize) -> Vec<Violation> {
    let mut violations = Vec::new();

    for commodity in &state.commodities {
        if commodity.price < Decimal::ZERO {
            violations.push(Violation::NegativePrice(commodity.name.clone()));
        }
    }
    if state.wages < Decimal::ZERO {
        violations.push(Violation::NegativeWages);
    }
    if state.unrest < Decimal::ZERO || state.unrest > Decimal::ONE_HUNDRED {
        violations.push(Violation::UnrestOutOfRange(state.unrest));
    }
    if state.ticker.len() > max_ticker_length {
        violations.push(Violation::TickerOverflow {
            len: state.ticker.len(),
            max: max_ticker_length,
        });
    }

    violations
}

/// Check workforce conservation across one reduction.
pub fn check_transition(before: &GameState, after: &GameState, action: &Action) -> Vec<Violation> {
    let mut violations = Vec::new();
    let pop_before = before.total_population();
    let pop_after = after.total_population();

    if matches!(action, Action::Tick) {
        let assigned_before = before.assigned_labor();
        let assigned_after = after.assigned_labor();
        if assigned_before != assigned_after {
            violations.push(Violation::AssignmentChangedOnTick {
                before: assigned_before,
                after: assigned_after,
            });
        }
        if pop_after < pop_before {
            violations.push(Violation::WorkforceChanged {
                before: pop_before,
                after: pop_after,
                action: action.kind(),
            });
        }
    } else if pop_before != pop_after {
        violations.push(Violation::WorkforceChanged {
            before: pop_before,
            after: pop_after,
            action: action.kind(),
        });
    }

    violations
}
