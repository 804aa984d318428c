//! Plain-text order invoices.

use core::fmt::Write as _;

use crate::models::Order;
use crate::pricing::OrderTotals;
use crate::types::{format_ksh, grams_to_units};

/// Download name for an order's invoice.
#[must_use]
pub fn invoice_filename(order: &Order) -> String {
    format!("invoice-{}.txt", order.id)
}

/// Units of a line with at least one decimal place (`1.0`, `2.5`).
fn invoice_quantity(grams: i32) -> String {
    let units = grams_to_units(grams).normalize();
    if units.scale() == 0 {
        format!("{units}.0")
    } else {
        units.to_string()
    }
}

/// Render the invoice text for an order.
///
/// Line prices are the prices the order was placed at. Shipping follows the
/// order's shipping method.
#[must_use]
pub fn render_invoice(order: &Order) -> String {
    let totals = OrderTotals::for_order(order);
    let rule = "-".repeat(50);
    let mut out = String::new();

    // Writing to a String cannot fail.
    let _ = writeln!(out, "SPICE HUB - INVOICE");
    let _ = writeln!(out, "{}", "=".repeat(50));
    let _ = writeln!(out);
    let _ = writeln!(out, "Order ID: {}", order.id);
    let _ = writeln!(out, "Date: {}", order.created_at.format("%Y-%m-%d %H:%M:%S"));
    let _ = writeln!(out, "Status: {}", order.status.label());
    let _ = writeln!(out);
    let _ = writeln!(out, "SHIPPING ADDRESS:");
    let _ = writeln!(out, "City: {}", order.city);
    let _ = writeln!(out, "Area: {}", order.area);
    let address = if order.address.trim().is_empty() {
        "N/A"
    } else {
        order.address.as_str()
    };
    let _ = writeln!(out, "Address: {address}");
    let _ = writeln!(out, "Phone: {}", order.phone_number);
    let _ = writeln!(out);
    let _ = writeln!(out, "ORDER ITEMS:");
    let _ = writeln!(out, "{rule}");

    for item in &order.items {
        let _ = writeln!(out, "{}", item.display_name());
        let _ = writeln!(
            out,
            "  Quantity: {} x {} = {}",
            invoice_quantity(item.quantity),
            format_ksh(item.price),
            format_ksh(item.line_total()),
        );
        let _ = writeln!(out);
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{rule}");
    let _ = writeln!(out, "Subtotal: {}", format_ksh(totals.subtotal));
    let _ = writeln!(out, "Shipping: {}", format_ksh(totals.shipping));
    let _ = writeln!(out, "TOTAL: {}", format_ksh(totals.total));
    let _ = writeln!(out);
    let _ = writeln!(out, "Payment Method: {}", order.payment_method());

    if let Some(code) = order.mpesa_code.as_deref().filter(|c| !c.is_empty()) {
        let _ = writeln!(out, "M-Pesa Code: {code}");
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "Thank you for shopping with Spice Hub!");

    out.trim().to_owned()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::models::OrderItem;
    use crate::types::{OrderId, OrderItemId, OrderStatus, ProductId, ShippingMethod, UserId};
    use chrono::TimeZone;
    use rust_decimal::Decimal;

    fn order(method: ShippingMethod, pay_on_delivery: bool, code: Option<&str>) -> Order {
        Order {
            id: OrderId::new(),
            user_id: UserId::new(),
            status: OrderStatus::Shipped,
            total_amount: Decimal::from(1000),
            shipping_method: method,
            city: "Nairobi".into(),
            area: "Kilimani".into(),
            address: String::new(),
            phone_number: "0700000000".into(),
            apartment: "A1".into(),
            pay_on_delivery,
            paid: false,
            mpesa_code: code.map(str::to_owned),
            additional_note: None,
            internal_notes: None,
            created_at: chrono::Utc.with_ymd_and_hms(2025, 5, 4, 13, 5, 9).unwrap(),
            items: vec![OrderItem {
                id: OrderItemId::new(),
                product_id: ProductId::new(),
                container: Some("jar".into()),
                name: Some("Cardamom".into()),
                image: None,
                quantity: 250,
                price: Decimal::from(400),
            }],
        }
    }

    #[test]
    fn test_invoice_lines() {
        let text = render_invoice(&order(ShippingMethod::Standard, true, None));
        assert!(text.starts_with("SPICE HUB - INVOICE"));
        assert!(text.contains("Date: 2025-05-04 13:05:09"));
        assert!(text.contains("Status: Shipped"));
        assert!(text.contains("Address: N/A"));
        assert!(text.contains("  Quantity: 2.5 x Ksh 400.00 = Ksh 1000.00"));
        assert!(text.contains("Shipping: Ksh 0.00"));
        assert!(text.contains("TOTAL: Ksh 1000.00"));
        assert!(text.contains("Payment Method: Pay on Delivery"));
        assert!(!text.contains("M-Pesa Code"));
        assert!(text.ends_with("Thank you for shopping with Spice Hub!"));
    }

    #[test]
    fn test_invoice_express_and_mpesa() {
        let text = render_invoice(&order(ShippingMethod::Express, false, Some("QWE123")));
        assert!(text.contains("Shipping: Ksh 500.00"));
        assert!(text.contains("TOTAL: Ksh 1500.00"));
        assert!(text.contains("Payment Method: M-Pesa"));
        assert!(text.contains("M-Pesa Code: QWE123"));
    }

    #[test]
    fn test_invoice_whole_quantities_keep_a_decimal() {
        let mut o = order(ShippingMethod::Standard, true, None);
        o.items[0].quantity = 100;
        let text = render_invoice(&o);
        assert!(text.contains("  Quantity: 1.0 x Ksh 400.00 = Ksh 400.00\n\n\n---"));
        assert_eq!(invoice_quantity(1250), "12.5");
    }

    #[test]
    fn test_invoice_filename() {
        let o = order(ShippingMethod::Standard, true, None);
        assert_eq!(invoice_filename(&o), format!("invoice-{}.txt", o.id));
    }
}
