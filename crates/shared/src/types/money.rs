//! Currency rounding helpers.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Every stored amount is a `rust_decimal::Decimal` with two decimal places.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places used for every stored amount.
pub const CURRENCY_SCALE: u32 = 2;

/// Rounds an amount to two decimal places, half away from zero.
///
/// This is the "half-up" rule used for tax components.
#[must_use]
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Returns true if the amount has no more than two decimal places.
#[must_use]
pub fn is_currency_scale(amount: Decimal) -> bool {
    amount.normalize().scale() <= CURRENCY_SCALE
}
