//! Market clearing: labor becomes output, output meets demand.
//!
//! Each unlocked commodity clears once per tick, in catalog order:
//!
//! 1. production = `floor(labor_assigned / labor_required)` (0 when no labor
//!    is required, so a zero requirement can never divide by zero)
//! 2. demand from the commodity's curve at its current price
//! 3. available = inventory + production
//! 4. sold = `min(available, demand)`
//! 5. inventory = available - sold
//! 6. revenue = sold * price
//! 7. `num_sold` = sold
//!
//! Locked commodities are skipped. Clearing never touches `labor_assigned`
//! or `price`.

use rust_decimal::Decimal;
use tracing::debug;
use tycoon_types::Commodity;

use crate::catalog;
use crate::numeric::floor_to_u64;

/// Totals from one clearing pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClearingReport {
    /// Money received across all commodities.
    pub revenue: Decimal,
    /// Units produced across all commodities.
    pub produced: u64,
    /// Units sold across all commodities.
    pub sold: u64,
}

/// Units a commodity's assigned labor produces this tick.
pub fn production(commodity: &Commodity) -> u64 {
    if commodity.labor_required <= Decimal::ZERO {
        return 0;
    }
    Decimal::from(commodity.labor_assigned)
        .checked_div(commodity.labor_required)
        .map_or(u64::MAX, floor_to_u64)
}

/// Clear every unlocked commodity in place.
///
/// `population` is the total workforce used by demand curves. Sales-driven
/// curves see the values already written earlier in this pass.
pub fn clear_market(commodities: &mut [Commodity], population: u64) -> ClearingReport {
    let mut report = ClearingReport::default();

    for idx in 0..commodities.len() {
        let Some(current) = commodities.get(idx) else {
            continue;
        };
        if !current.unlocked {
            continue;
        }
        let demand = catalog::evaluate_demand(
            &current.demand_curve,
            current.price,
            population,
            commodities,
        );
        let produced = production(current);

        let Some(commodity) = commodities.get_mut(idx) else {
            continue;
        };
        let available = commodity.inventory.saturating_add(produced);
        let sold = available.min(demand);
        let revenue = Decimal::from(sold).saturating_mul(commodity.price);

        commodity.inventory = available.saturating_sub(sold);
        commodity.demand = demand;
        commodity.num_sold = sold;

        debug!(
            commodity = %commodity.name,
            produced,
            demand,
            sold,
            inventory = commodity.inventory,
            revenue = %revenue,
            "Commodity cleared"
        );

        report.revenue = report.revenue.saturating_add(revenue);
        report.produced = report.produced.saturating_add(produced);
        report.sold = report.sold.saturating_add(sold);
    }

    report
}
