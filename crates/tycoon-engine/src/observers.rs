//! Observers the headless engine registers on the store.
//!
//! [`TickLog`] reports each completed tick and every new ticker message.
//! [`TickLimit`] stops the scheduler once the configured tick budget is
//! spent, in the same dispatch as the final tick.

use tracing::info;
use tycoon_core::store::Observer;
use tycoon_types::{Action, GameState};

/// Logs a one-line summary whenever the tick counter advances.
#[derive(Debug, Default)]
pub struct TickLog {
    last_tick: u64,
    last_headline: Option<String>,
}

impl TickLog {
    /// Create a log that treats the initial state as already reported.
    pub const fn new() -> Self {
        Self {
            last_tick: 0,
            last_headline: None,
        }
    }
}

impl Observer for TickLog {
    fn observe(&mut self, state: &GameState) -> Vec<Action> {
        let headline = state.ticker.first();
        if headline != self.last_headline.as_ref() {
            if let Some(message) = headline {
                info!(tick = state.tick, message = %message, "Ticker");
            }
            self.last_headline = headline.cloned();
        }

        if state.tick != self.last_tick {
            self.last_tick = state.tick;
            info!(
                tick = state.tick,
                capital = %state.capital,
                labor = state.labor,
                assigned = state.assigned_labor(),
                wages = %state.wages,
                labor_savings = %state.labor_savings,
                unrest = %state.unrest,
                "Tick"
            );
        }
        Vec::new()
    }
}

/// Stops the scheduler after `max_ticks` ticks. A limit of 0 never stops.
#[derive(Debug)]
pub struct TickLimit {
    max_ticks: u64,
}

impl TickLimit {
    /// Create a limit of `max_ticks` ticks.
    pub const fn new(max_ticks: u64) -> Self {
        Self { max_ticks }
    }

    /// Whether `state` has used up the tick budget.
    pub const fn reached(&self, state: &GameState) -> bool {
        self.max_ticks > 0 && state.tick >= self.max_ticks
    }
}

impl Observer for TickLimit {
    fn observe(&mut self, state: &GameState) -> Vec<Action> {
        if self.reached(state) && state.scheduler.is_running() {
            info!(max_ticks = self.max_ticks, "Tick limit reached");
            vec![Action::StopTick]
        } else {
            Vec::new()
        }
    }
}
