//! Derived totals calculator.
//!
//! Each line subtotal is rounded to two decimals before summation and the
//! sum is rounded again. Totals are always recomputed from the lines, never
//! adjusted incrementally.

use rust_decimal::Decimal;

use crate::cart::LineItem;
use crate::types::{Quantity, round_money};

/// `quantity × unit_price`, rounded to two decimals.
#[must_use]
pub fn line_subtotal(quantity: Quantity, unit_price: Decimal) -> Decimal {
    round_money(unit_price * Decimal::from(quantity.get()))
}

/// Total of the given lines: `round(sum(round(subtotal)))`.
#[must_use]
pub fn cart_total<'a>(items: impl IntoIterator<Item = &'a LineItem>) -> Decimal {
    round_money(
        items
            .into_iter()
            .map(|item| round_money(item.subtotal()))
            .sum(),
    )
}
