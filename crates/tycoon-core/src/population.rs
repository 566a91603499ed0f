//! Labor pool growth.
//!
//! Growth is stepwise: nothing happens on most ticks, and on every
//! `period`-th tick the pool gains `max(1, floor(population² * rate))`
//! workers. The quadratic term accelerates late-game growth. New workers
//! always join the unassigned pool.

use rust_decimal::Decimal;
use tycoon_types::GameState;

use crate::config::GrowthConfig;
use crate::numeric::floor_to_u64;

/// Workers added to the unassigned pool on `state.tick`.
///
/// `state.tick` must already hold the number of the tick being processed.
/// Tick 0 (the initial state) never grows.
pub fn grow_labor(state: &GameState, config: &GrowthConfig) -> u64 {
    if state.tick == 0 || config.period == 0 {
        return 0;
    }
    if state.tick.checked_rem(config.period) != Some(0) {
        return 0;
    }

    let population = Decimal::from(state.total_population());
    population
        .checked_mul(population)
        .and_then(|sq| sq.checked_mul(config.rate))
        .map_or(u64::MAX, floor_to_u64)
        .max(1)
}
