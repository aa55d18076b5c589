//! Monetary helpers.
//!
//! Amounts are `rust_decimal::Decimal` end to end (catalog, engine and
//! `NUMERIC` columns) so totals never pick up floating point drift.

use rust_decimal::prelude::*;

/// Monetary amount in the hotel currency.
pub type Money = Decimal;

/// Number of decimal places kept on stored amounts.
pub const MONEY_SCALE: u32 = 2;

/// Round to cents, half away from zero.
pub fn round_money(value: Money) -> Money {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// `unit_price × quantity`, rounded to cents.
pub fn line_total(unit_price: Money, quantity: u32) -> Money {
    round_money(unit_price * Decimal::from(quantity))
}

/// Whether an amount fits a `NUMERIC(12, 2)` column.
pub fn is_storable(amount: Money) -> bool {
    amount >= Decimal::ZERO && amount <= Decimal::new(999_999_999_999, MONEY_SCALE)
}

/// Exact sum of already-rounded amounts.
pub fn sum<I>(amounts: I) -> Money
where
    I: IntoIterator<Item = Money>,
{
    amounts.into_iter().fold(Decimal::ZERO, |acc, a| acc + a)
}
