//! Cart and checkout arithmetic.
//!
//! Product prices are per 100 g and quantities are grams, so a line costs
//! `price * grams / 100`. Tax is not charged.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{Cart, Order};
use crate::types::{ShippingMethod, grams_to_units};

/// Flat fee for express delivery.
const EXPRESS_FEE: i64 = 500;

/// Cost of one cart or order line.
#[must_use]
pub fn line_total(unit_price: Decimal, grams: i32) -> Decimal {
    unit_price * grams_to_units(grams)
}

/// Sum of `(unit_price, grams)` lines.
pub fn subtotal<I>(lines: I) -> Decimal
where
    I: IntoIterator<Item = (Decimal, i32)>,
{
    lines
        .into_iter()
        .map(|(price, grams)| line_total(price, grams))
        .sum()
}

#[must_use]
pub fn shipping_fee(method: ShippingMethod) -> Decimal {
    match method {
        ShippingMethod::Standard => Decimal::ZERO,
        ShippingMethod::Express => Decimal::from(EXPRESS_FEE),
    }
}

/// Checkout summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

impl OrderTotals {
    #[must_use]
    pub fn new(subtotal: Decimal, method: ShippingMethod) -> Self {
        let shipping = shipping_fee(method);
        let tax = Decimal::ZERO;
        Self {
            subtotal,
            shipping,
            tax,
            total: subtotal + shipping + tax,
        }
    }

    /// Totals for a server-side cart at current product prices.
    #[must_use]
    pub fn for_cart(cart: &Cart, method: ShippingMethod) -> Self {
        let sub = subtotal(
            cart.items
                .iter()
                .map(|item| (item.product.price, item.quantity)),
        );
        Self::new(sub, method)
    }

    /// Totals for a placed order at the prices it was bought at.
    #[must_use]
    pub fn for_order(order: &Order) -> Self {
        let sub = subtotal(order.items.iter().map(|item| (item.price, item.quantity)));
        Self::new(sub, order.shipping_method)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_line_total_uses_hundred_gram_units() {
        assert_eq!(line_total(Decimal::from(400), 250), Decimal::from(1000));
        assert_eq!(line_total(Decimal::from(400), 100), Decimal::from(400));
        assert_eq!(line_total(Decimal::from(400), 0), Decimal::ZERO);
    }

    #[test]
    fn test_subtotal_sums_lines() {
        let lines = [(Decimal::from(300), 200), (Decimal::from(150), 50)];
        assert_eq!(subtotal(lines), Decimal::from(675));
    }

    #[test]
    fn test_express_adds_fee() {
        let totals = OrderTotals::new(Decimal::from(1000), ShippingMethod::Express);
        assert_eq!(totals.shipping, Decimal::from(500));
        assert_eq!(totals.tax, Decimal::ZERO);
        assert_eq!(totals.total, Decimal::from(1500));
    }

    #[test]
    fn test_standard_is_free() {
        let totals = OrderTotals::new(Decimal::from(80), ShippingMethod::Standard);
        assert_eq!(totals.total, Decimal::from(80));
    }
}
