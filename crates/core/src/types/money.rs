//! Money and quantity helpers.
//!
//! Prices are Kenyan shillings held as [`Decimal`]. Cart and order
//! quantities are integer grams; a product's `price` is per 100 g.

use rust_decimal::{Decimal, RoundingStrategy};

/// Grams in one priced unit.
pub const GRAMS_PER_UNIT: i32 = 100;

/// Quantity added when a shopper clicks "add to cart" without choosing one.
pub const DEFAULT_ADD_QUANTITY: i32 = GRAMS_PER_UNIT;

/// Currency label used on invoices and in the UI.
pub const CURRENCY: &str = "Ksh";

/// Convert a gram quantity into priced units (`grams / 100`).
#[must_use]
pub fn grams_to_units(grams: i32) -> Decimal {
    Decimal::from(grams) / Decimal::from(GRAMS_PER_UNIT)
}

/// Format an amount as `Ksh 1234.50`.
#[must_use]
pub fn format_ksh(amount: Decimal) -> String {
    format!(
        "{CURRENCY} {:.2}",
        amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    )
}

/// Format a gram quantity for display, e.g. `250g` or `1.5kg`.
#[must_use]
pub fn format_grams(grams: i32) -> String {
    if grams >= 1000 {
        let kg = (Decimal::from(grams) / Decimal::from(1000)).normalize();
        format!("{kg}kg")
    } else {
        format!("{grams}g")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grams_to_units() {
        assert_eq!(grams_to_units(250), Decimal::new(25, 1));
        assert_eq!(grams_to_units(100), Decimal::ONE);
        assert_eq!(grams_to_units(0), Decimal::ZERO);
    }

    #[test]
    fn test_format_ksh_two_places() {
        assert_eq!(format_ksh(Decimal::from(450)), "Ksh 450.00");
        assert_eq!(format_ksh(Decimal::new(12_345, 3)), "Ksh 12.35");
    }

    #[test]
    fn test_format_grams() {
        assert_eq!(format_grams(250), "250g");
        assert_eq!(format_grams(1500), "1.5kg");
        assert_eq!(format_grams(2000), "2kg");
    }
}
