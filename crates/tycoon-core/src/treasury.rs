//! Treasury and unrest: the two aggregate scalars settled after clearing.
//!
//! Capital receives every sale and pays the wage bill (`wages * assigned
//! labor`). Workforce savings follow the configured [`SavingsPolicy`].
//! Unrest is recomputed from scratch each tick and is never set directly.

use rust_decimal::Decimal;
use tycoon_types::GameState;

use crate::config::{SavingsPolicy, UnrestConfig};
use crate::market::ClearingReport;
use crate::numeric::clamp_percent;

/// Money movements for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Settlement {
    /// Wages paid to assigned workers.
    pub wage_bill: Decimal,
    /// Change applied to capital.
    pub capital_delta: Decimal,
    /// Change applied to workforce savings.
    pub savings_delta: Decimal,
}

/// Wages owed for the current assignment.
pub fn wage_bill(state: &GameState) -> Decimal {
    state
        .wages
        .saturating_mul(Decimal::from(state.assigned_labor()))
}

/// Apply revenue, wages and savings for one tick.
pub fn settle(
    state: &mut GameState,
    report: &ClearingReport,
    policy: &SavingsPolicy,
) -> Settlement {
    let wage_bill = wage_bill(state);
    let capital_delta = report.revenue.saturating_sub(wage_bill);
    let savings_delta = match policy {
        SavingsPolicy::Circulating => wage_bill.saturating_sub(report.revenue),
        SavingsPolicy::FractionOfWages { fraction } => wage_bill.saturating_mul(*fraction),
    };

    state.capital = state.capital.saturating_add(capital_delta);
    state.labor_savings = state.labor_savings.saturating_add(savings_delta);

    Settlement {
        wage_bill,
        capital_delta,
        savings_delta,
    }
}

/// Sum of prices of unlocked goods that anyone currently wants.
///
/// This is the basket a worker's wage is measured against.
pub fn cost_of_living(state: &GameState) -> Decimal {
    state
        .commodities
        .iter()
        .filter(|c| c.unlocked && c.demand > 0)
        .fold(Decimal::ZERO, |acc, c| acc.saturating_add(c.price))
}

/// Derive the unrest index in `[0, 100]`.
///
/// Combines the unemployed share of the population, the relative shortfall
/// of wages against [`cost_of_living`], and whether the workforce is in debt.
/// An empty population contributes no unemployment pressure and a zero cost
/// of living contributes no wage pressure.
pub fn compute_unrest(state: &GameState, weights: &UnrestConfig) -> Decimal {
    let population = state.total_population();
    let unemployment = if population == 0 {
        Decimal::ZERO
    } else {
        Decimal::from(state.labor)
            .checked_div(Decimal::from(population))
            .unwrap_or(Decimal::ZERO)
    };

    let living = cost_of_living(state);
    let wage_gap = if living > Decimal::ZERO && state.wages < living {
        living
            .saturating_sub(state.wages)
            .checked_div(living)
            .unwrap_or(Decimal::ZERO)
    } else {
        Decimal::ZERO
    };

    let debt = if state.labor_savings < Decimal::ZERO {
        Decimal::ONE
    } else {
        Decimal::ZERO
    };

    let pressure = unemployment
        .saturating_mul(weights.unemployment_weight)
        .saturating_add(wage_gap.saturating_mul(weights.wage_weight))
        .saturating_add(debt.saturating_mul(weights.debt_weight));

    clamp_percent(pressure.saturating_mul(Decimal::ONE_HUNDRED)).round_dp(2)
}

#[cfg(test)]
mod tests {
    use tycoon_types::SchedulerState;

    use super::*;
    use crate::catalog::{default_catalog, instantiate};

    fn state(labor: u64, bread_workers: u64) -> GameState {
        let mut commodities = instantiate(&default_catalog());
        if let Some(bread) = commodities.first_mut() {
            bread.labor_assigned = bread_workers;
        }
        GameState {
            tick: 1,
            capital: Decimal::from(1_000_u32),
            labor,
            wages: Decimal::TEN,
            labor_savings: Decimal::from(100_u32),
            unrest: Decimal::ZERO,
            ticker: Vec::new(),
            scheduler: SchedulerState::Stopped,
            commodities,
            game_over: None,
        }
    }

    #[test]
    fn capital_gains_revenue_and_pays_wages() {
        let mut s = state(7, 3);
        let report = ClearingReport {
            revenue: Decimal::from(50_u32),
            produced: 30,
            sold: 25,
        };
        let settlement = settle(&mut s, &report, &SavingsPolicy::Circulating);
        assert_eq!(settlement.wage_bill, Decimal::from(30_u32));
        assert_eq!(s.capital, Decimal::from(1_020_u32));
        // Workers earn 30 and spend 50.
        assert_eq!(s.labor_savings, Decimal::from(80_u32));
    }

    #[test]
    fn capital_may_go_negative() {
        let mut s = state(0, 10);
        s.capital = Decimal::TEN;
        let _ = settle(&mut s, &ClearingReport::default(), &SavingsPolicy::Circulating);
        assert_eq!(s.capital, Decimal::from(-90_i32));
    }

    #[test]
    fn fraction_policy_banks_share_of_wages() {
        let mut s = state(0, 4);
        let policy = SavingsPolicy::FractionOfWages {
            fraction: Decimal::new(5, 1),
        };
        let report = ClearingReport {
            revenue: Decimal::from(500_u32),
            ..ClearingReport::default()
        };
        let _ = settle(&mut s, &report, &policy);
        assert_eq!(s.labor_savings, Decimal::from(120_u32));
    }

    #[test]
    fn full_employment_at_living_wage_is_calm() {
        let s = state(0, 10);
        assert_eq!(compute_unrest(&s, &UnrestConfig::default()), Decimal::ZERO);
    }

    #[test]
    fn unemployment_drives_unrest() {
        // Half the workforce idle: 0.5 * 0.5 * 100
        let s = state(5, 5);
        assert_eq!(compute_unrest(&s, &UnrestConfig::default()), Decimal::from(25_u32));
    }

    #[test]
    fn low_wages_drive_unrest() {
        let mut s = state(0, 10);
        // Only Bread is unlocked and wanted: living cost 2.
        s.wages = Decimal::ONE;
        // (2 - 1) / 2 * 0.5 * 100
        assert_eq!(compute_unrest(&s, &UnrestConfig::default()), Decimal::from(25_u32));
    }

    #[test]
    fn debt_and_idleness_are_clamped_to_one_hundred() {
        let mut s = state(10, 0);
        s.wages = Decimal::ZERO;
        s.labor_savings = Decimal::NEGATIVE_ONE;
        let weights = UnrestConfig {
            unemployment_weight: Decimal::ONE,
            wage_weight: Decimal::ONE,
            debt_weight: Decimal::ONE,
        };
        assert_eq!(compute_unrest(&s, &weights), Decimal::ONE_HUNDRED);
    }

    #[test]
    fn empty_population_has_no_unemployment_pressure() {
        let s = state(0, 0);
        assert_eq!(compute_unrest(&s, &UnrestConfig::default()), Decimal::ZERO);
    }
}
