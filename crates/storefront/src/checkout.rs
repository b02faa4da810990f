//! Checkout totals.

use rust_decimal::{Decimal, RoundingStrategy};

/// Flat shipping charge per order.
pub const FLAT_SHIPPING: Decimal = Decimal::from_parts(500, 0, 0, false, 2);

/// Sales tax rate applied to the discounted subtotal.
pub const TAX_RATE: Decimal = Decimal::from_parts(8, 0, 0, false, 2);

/// Order totals shown at checkout, all rounded to cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutSummary {
    pub subtotal: Decimal,
    /// Discount actually applied (never more than the subtotal)
    pub discount: Decimal,
    pub discounted_subtotal: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    pub grand_total: Decimal,
}

impl CheckoutSummary {
    /// Totals for `subtotal` less a coupon `discount`.
    #[must_use]
    pub fn compute(subtotal: Decimal, discount: Decimal) -> Self {
        let subtotal = cents(subtotal.max(Decimal::ZERO));
        let discount = cents(discount.max(Decimal::ZERO)).min(subtotal);
        let discounted_subtotal = subtotal - discount;
        let tax = cents(discounted_subtotal * TAX_RATE);

        Self {
            subtotal,
            discount,
            discounted_subtotal,
            shipping: FLAT_SHIPPING,
            tax,
            grand_total: discounted_subtotal + FLAT_SHIPPING + tax,
        }
    }
}

fn cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
