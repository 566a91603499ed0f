//! Decimal-to-integer conversions shared by the tick phases.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Floor a decimal into a unit count.
///
/// Negative values become 0; values beyond `u64::MAX` saturate.
pub fn floor_to_u64(value: Decimal) -> u64 {
    if value <= Decimal::ZERO {
        return 0;
    }
    value.floor().to_u64().unwrap_or(u64::MAX)
}

/// Clamp a decimal to the percentage range `[0, 100]`.
pub fn clamp_percent(value: Decimal) -> Decimal {
    value.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
}
