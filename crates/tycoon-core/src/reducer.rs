//! The action reducer: the single place game state changes.
//!
//! [`Reducer::reduce`] is total. Every action, including tags this engine
//! does not know, yields a valid next state, and invalid requests (driving a
//! count or price below zero, naming a missing commodity) leave the state
//! untouched. Collaborators that dispatch programmatically and need to tell
//! a rejection from a success can call [`Reducer::apply`] instead, which
//! also returns an [`Outcome`].
//!
//! A `TICK` runs the phases in fixed order:
//!
//! 1. advance the tick counter
//! 2. grow the labor pool ([`population`])
//! 3. clear every unlocked commodity ([`market`])
//! 4. settle capital and savings, derive unrest ([`treasury`])
//! 5. push any messages produced this tick onto the ticker

use rust_decimal::Decimal;
use tracing::debug;
use tycoon_types::{Action, GameState, SchedulerState};

use crate::catalog;
use crate::config::{ConfigError, GameConfig};
use crate::market;
use crate::population;
use crate::treasury;

/// Why an action left the state unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    /// No commodity has the given name.
    #[error("unknown commodity: {0}")]
    UnknownCommodity(String),

    /// The commodity exists but is not unlocked yet.
    #[error("commodity {0} is locked")]
    LockedCommodity(String),

    /// Not enough unassigned workers to fill the request.
    #[error("requested {requested} workers but only {available} are unassigned")]
    InsufficientLabor {
        /// Workers requested.
        requested: u64,
        /// Workers in the unassigned pool.
        available: u64,
    },

    /// Not enough workers on the commodity to unassign.
    #[error("cannot unassign {requested} workers from {name}: only {assigned} assigned")]
    InsufficientAssigned {
        /// Target commodity.
        name: String,
        /// Workers requested.
        requested: u64,
        /// Workers currently assigned.
        assigned: u64,
    },

    /// The price change would make the price negative.
    #[error("price of {0} cannot go below zero")]
    NegativePrice(String),

    /// The wage change would make wages negative.
    #[error("wages cannot go below zero")]
    NegativeWages,

    /// The run has ended.
    #[error("the game is over")]
    GameOver,

    /// A counter would overflow.
    #[error("arithmetic overflow")]
    Overflow,
}

/// What happened when an action was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The action was valid and its effect is in the returned state.
    Applied,
    /// The action was invalid; the returned state equals the input.
    Rejected(Rejection),
    /// The action is not handled by the engine; the returned state equals
    /// the input.
    Ignored,
}

/// Applies actions to game state under a fixed configuration.
#[derive(Debug, Clone)]
pub struct Reducer {
    config: GameConfig,
}

impl Reducer {
    /// Create a reducer after validating the configuration.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] from [`GameConfig::validate`].
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration this reducer was built from.
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    /// The state a new game starts in.
    pub fn initial_state(&self) -> GameState {
        let initial = &self.config.initial;
        GameState {
            tick: 0,
            capital: initial.capital,
            labor: initial.labor,
            wages: initial.wages,
            labor_savings: initial.labor_savings,
            unrest: initial.unrest,
            ticker: Vec::new(),
            scheduler: SchedulerState::Stopped,
            commodities: catalog::instantiate(&self.config.commodities),
            game_over: None,
        }
    }

    /// Produce the next state, silently ignoring invalid actions.
    pub fn reduce(&self, state: &GameState, action: &Action) -> GameState {
        let (next, outcome) = self.apply(state, action);
        if let Outcome::Rejected(reason) = &outcome {
            debug!(action = action.kind(), reason = %reason, "Action rejected");
        }
        next
    }

    /// Produce the next state and report whether the action took effect.
    pub fn apply(&self, state: &GameState, action: &Action) -> (GameState, Outcome) {
        let result = match action {
            Action::Tick => self.tick(state),
            Action::IncrementLabor { name, labor_change } => {
                increment_labor(state, name, *labor_change)
            }
            Action::IncrementPrice { name, price_change } => {
                increment_price(state, name, *price_change)
            }
            Action::IncrementWages { wage_change } => increment_wages(state, *wage_change),
            Action::StartTick => {
                if state.is_over() {
                    Err(Rejection::GameOver)
                } else {
                    Ok(with_scheduler(state, SchedulerState::Running))
                }
            }
            Action::StopTick => Ok(with_scheduler(state, SchedulerState::Stopped)),
            Action::AppendTicker { message } => {
                let mut next = state.clone();
                self.push_ticker(&mut next, message.clone());
                Ok(next)
            }
            Action::Unlock { name } => unlock(state, name),
            Action::EndGame { reason } => {
                if state.is_over() {
                    return (state.clone(), Outcome::Ignored);
                }
                let mut next = with_scheduler(state, SchedulerState::Stopped);
                next.game_over = Some(reason.clone());
                self.push_ticker(&mut next, reason.clone());
                Ok(next)
            }
            Action::Unrecognized => return (state.clone(), Outcome::Ignored),
        };

        match result {
            Ok(next) => (next, Outcome::Applied),
            Err(reason) => (state.clone(), Outcome::Rejected(reason)),
        }
    }

    fn tick(&self, state: &GameState) -> Result<GameState, Rejection> {
        if state.is_over() {
            return Err(Rejection::GameOver);
        }

        let mut next = state.clone();
        next.tick = next.tick.checked_add(1).ok_or(Rejection::Overflow)?;

        // --- Population ---
        let growth = population::grow_labor(&next, &self.config.growth);
        next.labor = next.labor.saturating_add(growth);

        // --- Market ---
        let population = next.total_population();
        let report = market::clear_market(&mut next.commodities, population);

        // --- Treasury & unrest ---
        let settlement = treasury::settle(&mut next, &report, &self.config.savings);
        next.unrest = treasury::compute_unrest(&next, &self.config.unrest);

        // --- Ticker ---
        if growth > 0 {
            self.push_ticker(&mut next, growth_message(growth));
        }

        debug!(
            tick = next.tick,
            growth,
            population,
            produced = report.produced,
            sold = report.sold,
            revenue = %report.revenue,
            wage_bill = %settlement.wage_bill,
            capital = %next.capital,
            labor_savings = %next.labor_savings,
            unrest = %next.unrest,
            "Tick complete"
        );

        Ok(next)
    }

    fn push_ticker(&self, state: &mut GameState, message: String) {
        state.ticker.insert(0, message);
        state.ticker.truncate(self.config.max_ticker_length);
    }
}

fn growth_message(growth: u64) -> String {
    if growth == 1 {
        "1 new worker joined the labor pool".to_owned()
    } else {
        format!("{growth} new workers joined the labor pool")
    }
}

fn with_scheduler(state: &GameState, scheduler: SchedulerState) -> GameState {
    let mut next = state.clone();
    next.scheduler = scheduler;
    next
}

fn increment_labor(state: &GameState, name: &str, change: i64) -> Result<GameState, Rejection> {
    let mut next = state.clone();
    let pool = next.labor;
    let commodity = next
        .commodity_mut(name)
        .ok_or_else(|| Rejection::UnknownCommodity(name.to_owned()))?;
    if !commodity.unlocked {
        return Err(Rejection::LockedCommodity(name.to_owned()));
    }

    let amount = change.unsigned_abs();
    let (pool, assigned) = if change >= 0 {
        let pool = pool
            .checked_sub(amount)
            .ok_or(Rejection::InsufficientLabor {
                requested: amount,
                available: pool,
            })?;
        let assigned = commodity
            .labor_assigned
            .checked_add(amount)
            .ok_or(Rejection::Overflow)?;
        (pool, assigned)
    } else {
        let assigned = commodity.labor_assigned.checked_sub(amount).ok_or_else(|| {
            Rejection::InsufficientAssigned {
                name: name.to_owned(),
                requested: amount,
                assigned: commodity.labor_assigned,
            }
        })?;
        let pool = pool.checked_add(amount).ok_or(Rejection::Overflow)?;
        (pool, assigned)
    };

    commodity.labor_assigned = assigned;
    next.labor = pool;
    Ok(next)
}

fn increment_price(
    state: &GameState,
    name: &str,
    change: Decimal,
) -> Result<GameState, Rejection> {
    let mut next = state.clone();
    let commodity = next
        .commodity_mut(name)
        .ok_or_else(|| Rejection::UnknownCommodity(name.to_owned()))?;
    let price = commodity
        .price
        .checked_add(change)
        .ok_or(Rejection::Overflow)?;
    if price < Decimal::ZERO {
        return Err(Rejection::NegativePrice(name.to_owned()));
    }
    commodity.price = price;
    Ok(next)
}

fn increment_wages(state: &GameState, change: Decimal) -> Result<GameState, Rejection> {
    let wages = state
        .wages
        .checked_add(change)
        .ok_or(Rejection::Overflow)?;
    if wages < Decimal::ZERO {
        return Err(Rejection::NegativeWages);
    }
    let mut next = state.clone();
    next.wages = wages;
    Ok(next)
}

fn unlock(state: &GameState, name: &str) -> Result<GameState, Rejection> {
    let mut next = state.clone();
    let commodity = next
        .commodity_mut(name)
        .ok_or_else(|| Rejection::UnknownCommodity(name.to_owned()))?;
    commodity.unlocked = true;
    Ok(next)
}
