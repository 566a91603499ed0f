//! The commodity catalog: static definitions and demand-curve evaluation.
//!
//! The catalog is loaded once at startup (see [`crate::config`]) and never
//! changes. Catalog order is evaluation order: a [`DemandCurve::SalesOf`]
//! curve reads the *current* tick's sales of its source commodity, so the
//! source must clear first. [`validate`] enforces that ordering along with
//! the other structural rules, and any violation refuses startup.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use tycoon_types::{Commodity, DemandCurve};

use crate::config::CommodityConfig;
use crate::numeric::floor_to_u64;

/// Errors describing a malformed catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// The catalog has no commodities.
    #[error("catalog is empty")]
    Empty,

    /// A commodity has a blank name.
    #[error("commodity at position {position} has an empty name")]
    EmptyName {
        /// Zero-based catalog position.
        position: usize,
    },

    /// Two commodities share a name.
    #[error("duplicate commodity name: {0}")]
    DuplicateName(String),

    /// A numeric field that must be non-negative is negative.
    #[error("commodity {name}: {field} must not be negative")]
    NegativeValue {
        /// The offending commodity.
        name: String,
        /// The offending field.
        field: &'static str,
    },

    /// A sales-driven curve names a commodity that does not exist.
    #[error("commodity {name}: demand source {source_name} does not exist")]
    UnknownSalesSource {
        /// The dependent commodity.
        name: String,
        /// The missing source.
        source_name: String,
    },

    /// A sales-driven curve names a commodity that does not clear before it.
    #[error("commodity {name}: demand source {source_name} must precede it in the catalog")]
    SalesSourceOutOfOrder {
        /// The dependent commodity.
        name: String,
        /// The source listed at or after the dependent.
        source_name: String,
    },
}

/// Check the structural rules every catalog must satisfy.
///
/// # Errors
///
/// Returns the first [`CatalogError`] found, in catalog order.
pub fn validate(entries: &[CommodityConfig]) -> Result<(), CatalogError> {
    if entries.is_empty() {
        return Err(CatalogError::Empty);
    }

    let mut seen: BTreeSet<&str> = BTreeSet::new();
    let all: BTreeSet<&str> = entries.iter().map(|e| e.name.as_str()).collect();

    for (position, entry) in entries.iter().enumerate() {
        if entry.name.trim().is_empty() {
            return Err(CatalogError::EmptyName { position });
        }
        if entry.labor_required < Decimal::ZERO {
            return Err(negative(&entry.name, "labor_required"));
        }
        if entry.price < Decimal::ZERO {
            return Err(negative(&entry.name, "price"));
        }
        match &entry.demand_curve {
            DemandCurve::Staple {
                per_capita,
                saturation_price,
            } => {
                if *per_capita < Decimal::ZERO {
                    return Err(negative(&entry.name, "per_capita"));
                }
                if *saturation_price < Decimal::ZERO {
                    return Err(negative(&entry.name, "saturation_price"));
                }
            }
            DemandCurve::Elastic { scale } => {
                if *scale < Decimal::ZERO {
                    return Err(negative(&entry.name, "scale"));
                }
            }
            DemandCurve::Fixed { .. } => {}
            DemandCurve::SalesOf { commodity } => {
                if !all.contains(commodity.as_str()) {
                    return Err(CatalogError::UnknownSalesSource {
                        name: entry.name.clone(),
                        source_name: commodity.clone(),
                    });
                }
                if !seen.contains(commodity.as_str()) {
                    return Err(CatalogError::SalesSourceOutOfOrder {
                        name: entry.name.clone(),
                        source_name: commodity.clone(),
                    });
                }
            }
        }
        if !seen.insert(entry.name.as_str()) {
            return Err(CatalogError::DuplicateName(entry.name.clone()));
        }
    }
    Ok(())
}

fn negative(name: &str, field: &'static str) -> CatalogError {
    CatalogError::NegativeValue {
        name: name.to_owned(),
        field,
    }
}

/// Build the starting commodity list from catalog entries.
pub fn instantiate(entries: &[CommodityConfig]) -> Vec<Commodity> {
    entries
        .iter()
        .map(|entry| Commodity {
            name: entry.name.clone(),
            labor_required: entry.labor_required,
            labor_assigned: 0,
            price: entry.price,
            inventory: entry.inventory,
            demand: entry.demand,
            num_sold: 0,
            unlocked: entry.unlocked,
            demand_curve: entry.demand_curve.clone(),
        })
        .collect()
}

/// Evaluate a demand curve.
///
/// `market` is the commodity list as it stands mid-clearing; sales-driven
/// curves read their source's `num_sold` from it. The result is always a
/// whole, non-negative unit count. Arithmetic overflow saturates.
pub fn evaluate_demand(
    curve: &DemandCurve,
    price: Decimal,
    population: u64,
    market: &[Commodity],
) -> u64 {
    let pop = Decimal::from(population);
    match curve {
        DemandCurve::Staple {
            per_capita,
            saturation_price,
        } => {
            let base = per_capita.checked_mul(pop);
            let demand = if price <= *saturation_price {
                let premium = saturation_price
                    .checked_add(Decimal::ONE)
                    .and_then(|p| p.checked_sub(price));
                base.zip(premium).and_then(|(b, p)| b.checked_mul(p))
            } else {
                base
            };
            demand.map_or(u64::MAX, floor_to_u64)
        }
        DemandCurve::Elastic { scale } => {
            let effective_price = if price > Decimal::ZERO {
                price
            } else {
                Decimal::new(1, 2)
            };
            scale
                .checked_mul(pop)
                .and_then(|n| n.checked_div(effective_price))
                .map_or(u64::MAX, floor_to_u64)
                .max(1)
        }
        DemandCurve::Fixed { quantity } => *quantity,
        DemandCurve::SalesOf { commodity } => market
            .iter()
            .find(|c| &c.name == commodity)
            .map_or(0, |c| c.num_sold),
    }
}

/// Button step for a raw quantity: 1 below 100, then one power of ten per
/// extra digit (100..=999 -> 10, 1000..=9999 -> 100).
///
/// Presentation helper only; the simulation never reads it. The step rule
/// is assumed; the game config names the hook without defining it.
pub fn step_multiplier(value: u64) -> u64 {
    let mut multiplier: u64 = 1;
    let mut remaining = value / 100;
    while remaining > 0 {
        multiplier = multiplier.saturating_mul(10);
        remaining /= 10;
    }
    multiplier
}

/// Assign/unassign step for a commodity's labor buttons.
pub fn assign_multiplier(commodity: &Commodity) -> u64 {
    step_multiplier(commodity.labor_assigned)
}

/// Raise/lower step for a commodity's price buttons.
pub fn price_multiplier(commodity: &Commodity) -> u64 {
    step_multiplier(floor_to_u64(commodity.price))
}

/// The shipped nine-commodity catalog.
pub fn default_catalog() -> Vec<CommodityConfig> {
    vec![
        entry(
            "Bread",
            Decimal::new(1, 1),
            Decimal::TWO,
            1,
            true,
            DemandCurve::Staple {
                per_capita: Decimal::TWO,
                saturation_price: Decimal::from(5_u32),
            },
        ),
        entry(
            "Shirts",
            Decimal::ONE,
            Decimal::from(5_u32),
            1,
            false,
            elastic(Decimal::ONE),
        ),
        entry(
            "Pants",
            Decimal::TWO,
            Decimal::from(5_u32),
            1,
            false,
            elastic(Decimal::ONE),
        ),
        entry(
            "Pocket Watches",
            Decimal::TEN,
            Decimal::from(15_u32),
            1,
            false,
            DemandCurve::Fixed { quantity: 1 },
        ),
        entry(
            "Gold",
            Decimal::TEN,
            Decimal::ZERO,
            0,
            false,
            DemandCurve::Fixed { quantity: 0 },
        ),
        entry(
            "Cars",
            Decimal::from(40_u32),
            Decimal::from(50_u32),
            1,
            false,
            elastic(Decimal::TWO),
        ),
        entry(
            "Oil",
            Decimal::TWO,
            Decimal::from(5_u32),
            1,
            false,
            DemandCurve::SalesOf {
                commodity: "Cars".to_owned(),
            },
        ),
        entry(
            "Research",
            Decimal::from(20_u32),
            Decimal::ZERO,
            0,
            false,
            DemandCurve::Fixed { quantity: 0 },
        ),
        entry(
            "Smart Phones",
            Decimal::from(30_u32),
            Decimal::from(75_u32),
            0,
            false,
            elastic(Decimal::from(5_u32)),
        ),
    ]
}

fn entry(
    name: &str,
    labor_required: Decimal,
    price: Decimal,
    demand: u64,
    unlocked: bool,
    demand_curve: DemandCurve,
) -> CommodityConfig {
    CommodityConfig {
        name: name.to_owned(),
        labor_required,
        price,
        inventory: 0,
        demand,
        unlocked,
        demand_curve,
    }
}

fn elastic(scale: Decimal) -> DemandCurve {
    DemandCurve::Elastic { scale }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn staple() -> DemandCurve {
        DemandCurve::Staple {
            per_capita: Decimal::TWO,
            saturation_price: Decimal::from(5_u32),
        }
    }

    #[test]
    fn default_catalog_is_valid() {
        let catalog = default_catalog();
        assert!(validate(&catalog).is_ok());
        let unlocked: Vec<&str> = catalog
            .iter()
            .filter(|c| c.unlocked)
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(unlocked, vec!["Bread"]);
    }

    #[test]
    fn staple_demand_rises_as_price_falls() {
        // 2 * 10 * (6 - 2)
        assert_eq!(evaluate_demand(&staple(), Decimal::TWO, 10, &[]), 80);
        // 2 * 10 * (6 - 5)
        assert_eq!(evaluate_demand(&staple(), Decimal::from(5_u32), 10, &[]), 20);
        // Above saturation: flat 2 * 10
        assert_eq!(evaluate_demand(&staple(), Decimal::from(9_u32), 10, &[]), 20);
    }

    #[test]
    fn staple_demand_with_no_population_is_zero() {
        assert_eq!(evaluate_demand(&staple(), Decimal::TWO, 0, &[]), 0);
    }

    #[test]
    fn elastic_demand_floors_and_has_a_floor_of_one() {
        let curve = elastic(Decimal::ONE);
        assert_eq!(evaluate_demand(&curve, Decimal::from(3_u32), 10, &[]), 3);
        assert_eq!(evaluate_demand(&curve, Decimal::from(50_u32), 10, &[]), 1);
        assert_eq!(evaluate_demand(&curve, Decimal::from(5_u32), 0, &[]), 1);
    }

    #[test]
    fn elastic_demand_at_zero_price_uses_one_cent() {
        let curve = elastic(Decimal::TWO);
        // 2 * 10 / 0.01
        assert_eq!(evaluate_demand(&curve, Decimal::ZERO, 10, &[]), 2000);
    }

    #[test]
    fn sales_of_reads_source_num_sold() {
        let mut market = instantiate(&default_catalog());
        if let Some(cars) = market.iter_mut().find(|c| c.name == "Cars") {
            cars.num_sold = 7;
        }
        let oil = DemandCurve::SalesOf {
            commodity: "Cars".to_owned(),
        };
        assert_eq!(evaluate_demand(&oil, Decimal::from(5_u32), 10, &market), 7);
        let ghost = DemandCurve::SalesOf {
            commodity: "Boats".to_owned(),
        };
        assert_eq!(evaluate_demand(&ghost, Decimal::ONE, 10, &market), 0);
    }

    #[test]
    fn empty_catalog_is_rejected() {
        assert_eq!(validate(&[]), Err(CatalogError::Empty));
    }

    #[test]
    fn sales_source_must_precede_dependent() {
        let catalog = vec![
            entry(
                "Oil",
                Decimal::TWO,
                Decimal::ONE,
                1,
                true,
                DemandCurve::SalesOf {
                    commodity: "Cars".to_owned(),
                },
            ),
            entry("Cars", Decimal::TEN, Decimal::TEN, 1, true, elastic(Decimal::ONE)),
        ];
        assert!(matches!(
            validate(&catalog),
            Err(CatalogError::SalesSourceOutOfOrder { .. })
        ));
    }

    #[test]
    fn self_referential_sales_is_rejected() {
        let catalog = vec![entry(
            "Oil",
            Decimal::TWO,
            Decimal::ONE,
            1,
            true,
            DemandCurve::SalesOf {
                commodity: "Oil".to_owned(),
            },
        )];
        assert!(matches!(
            validate(&catalog),
            Err(CatalogError::SalesSourceOutOfOrder { .. })
        ));
    }

    #[test]
    fn unknown_sales_source_is_rejected() {
        let catalog = vec![entry(
            "Oil",
            Decimal::TWO,
            Decimal::ONE,
            1,
            true,
            DemandCurve::SalesOf {
                commodity: "Cars".to_owned(),
            },
        )];
        assert!(matches!(
            validate(&catalog),
            Err(CatalogError::UnknownSalesSource { .. })
        ));
    }

    #[test]
    fn negative_price_is_rejected() {
        let catalog = vec![entry(
            "Bread",
            Decimal::ONE,
            Decimal::NEGATIVE_ONE,
            1,
            true,
            staple(),
        )];
        assert_eq!(
            validate(&catalog),
            Err(CatalogError::NegativeValue {
                name: "Bread".to_owned(),
                field: "price",
            })
        );
    }

    #[test]
    fn blank_name_is_rejected() {
        let catalog = vec![entry(" ", Decimal::ONE, Decimal::ONE, 1, true, staple())];
        assert_eq!(validate(&catalog), Err(CatalogError::EmptyName { position: 0 }));
    }

    #[test]
    fn step_multiplier_grows_per_digit() {
        assert_eq!(step_multiplier(0), 1);
        assert_eq!(step_multiplier(99), 1);
        assert_eq!(step_multiplier(100), 10);
        assert_eq!(step_multiplier(999), 10);
        assert_eq!(step_multiplier(1_000), 100);
        assert_eq!(step_multiplier(25_000), 1_000);
    }

    #[test]
    fn price_multiplier_uses_whole_price() {
        let mut market = instantiate(&default_catalog());
        let bread = market.first_mut().unwrap();
        bread.price = Decimal::new(1505, 1);
        assert_eq!(price_multiplier(bread), 10);
        bread.labor_assigned = 42;
        assert_eq!(assign_multiplier(bread), 1);
    }
}
