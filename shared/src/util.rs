use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Flat delivery charge added to every order, in major currency units
pub const DELIVERY_CHARGES: Decimal = Decimal::from_parts(50, 0, 0, false, 0);

/// Upper bound for a catalog price, in major currency units
pub const MAX_PRICE: Decimal = Decimal::from_parts(10_000_000, 0, 0, false, 0);

/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Convert a major-unit amount to minor units (x100), rounding half away from zero.
///
/// Returns `None` if the result does not fit in an i64.
pub fn to_minor_units(amount: Decimal) -> Option<i64> {
    amount
        .checked_mul(Decimal::ONE_HUNDRED)?
        .round_dp_with_strategy(0, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}
