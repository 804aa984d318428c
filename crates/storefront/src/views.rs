//! Display data for templates.
//!
//! Templates only see pre-formatted strings; prices are rendered as
//! `Ksh 1234.00` and quantities as `250g`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use spice_hub_client::CartLine;
use spice_hub_core::listing::Countdown;
use spice_hub_core::models::{Order, OrderItem, Product, ProductSummary, Sale};
use spice_hub_core::pricing::OrderTotals;
use spice_hub_core::{format_grams, format_ksh};

use crate::models::{CurrentUser, FlashMessage};

/// Chrome shared by every page: header, cart badge, and toasts.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub user: Option<CurrentUser>,
    pub cart_count: usize,
    pub flash: Vec<FlashMessage>,
}

impl Layout {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user
            .as_ref()
            .is_some_and(|u| u.role == spice_hub_core::UserRole::Admin)
    }
}

/// Product tile on listing pages.
#[derive(Debug, Clone)]
pub struct ProductCard {
    pub id: String,
    pub name: String,
    pub price: String,
    pub original_price: Option<String>,
    pub image: Option<String>,
    pub category: Option<String>,
    pub rating: String,
    pub review_count: i32,
    pub is_sale: bool,
    pub is_new: bool,
    pub in_wishlist: bool,
}

impl ProductCard {
    #[must_use]
    pub fn from_product(product: &Product, in_wishlist: bool) -> Self {
        Self {
            original_price: product
                .original_price
                .filter(|original| *original > product.price)
                .map(format_ksh),
            ..Self::from_summary(&product.summary(), in_wishlist)
        }
    }

    #[must_use]
    pub fn from_summary(product: &ProductSummary, in_wishlist: bool) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            price: format_ksh(product.price),
            original_price: None,
            image: product.main_image.clone(),
            category: product.category.as_ref().map(|c| c.name.clone()),
            rating: format!("{:.1}", product.rating),
            review_count: product.review_count,
            is_sale: product.is_sale,
            is_new: product.is_new,
            in_wishlist,
        }
    }
}

/// Cart line on the cart and checkout pages.
#[derive(Debug, Clone)]
pub struct CartLineView {
    /// Line key to post back on update and remove.
    pub key: String,
    pub product_id: String,
    pub name: String,
    pub image: Option<String>,
    pub container: Option<String>,
    pub grams: i32,
    pub quantity: String,
    pub unit_price: String,
    pub line_total: String,
}

impl From<&CartLine> for CartLineView {
    fn from(line: &CartLine) -> Self {
        Self {
            key: line.key.clone(),
            product_id: line.product.id.to_string(),
            name: line.product.name.clone(),
            image: line.product.main_image.clone(),
            container: line.container.clone(),
            grams: line.quantity,
            quantity: format_grams(line.quantity),
            unit_price: format_ksh(line.product.price),
            line_total: format_ksh(line.line_total()),
        }
    }
}

/// Formatted checkout or order totals.
#[derive(Debug, Clone)]
pub struct TotalsView {
    pub subtotal: String,
    pub shipping: String,
    pub tax: String,
    pub total: String,
    pub free_shipping: bool,
}

impl From<OrderTotals> for TotalsView {
    fn from(totals: OrderTotals) -> Self {
        Self {
            subtotal: format_ksh(totals.subtotal),
            shipping: format_ksh(totals.shipping),
            tax: format_ksh(totals.tax),
            total: format_ksh(totals.total),
            free_shipping: totals.shipping == Decimal::ZERO,
        }
    }
}

/// Running sale shown as a banner.
#[derive(Debug, Clone)]
pub struct SaleBanner {
    pub name: String,
    pub text: Option<String>,
    pub image: Option<String>,
    pub discount: String,
    pub countdown: Countdown,
}

impl SaleBanner {
    #[must_use]
    pub fn new(sale: &Sale, now: DateTime<Utc>) -> Self {
        Self {
            name: sale.name.clone(),
            text: sale.banner_text.clone().or_else(|| sale.description.clone()),
            image: sale.banner_image.clone(),
            discount: format!("{}%", sale.discount_percentage.normalize()),
            countdown: Countdown::until(sale.end_date, now),
        }
    }
}

/// Order line on confirmation, tracking, and account pages.
#[derive(Debug, Clone)]
pub struct OrderItemView {
    pub name: String,
    pub image: Option<String>,
    pub container: Option<String>,
    pub quantity: String,
    pub unit_price: String,
    pub line_total: String,
}

impl From<&OrderItem> for OrderItemView {
    fn from(item: &OrderItem) -> Self {
        Self {
            name: item.display_name().to_string(),
            image: item.image.clone(),
            container: item.container.clone(),
            quantity: format_grams(item.quantity),
            unit_price: format_ksh(item.price),
            line_total: format_ksh(item.line_total()),
        }
    }
}

/// Order summary row or header.
#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: String,
    pub reference: String,
    pub placed_on: String,
    pub status: String,
    pub status_key: String,
    pub paid: bool,
    pub payment_method: String,
    pub shipping_method: String,
    pub delivery_address: String,
    pub phone_number: String,
    pub total: String,
    pub items: Vec<OrderItemView>,
    pub totals: TotalsView,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        let mut address = vec![order.address.as_str()];
        if !order.apartment.is_empty() {
            address.push(order.apartment.as_str());
        }
        address.push(order.area.as_str());
        address.push(order.city.as_str());

        Self {
            id: order.id.to_string(),
            reference: order.reference(),
            placed_on: order.created_at.format("%b %-d, %Y").to_string(),
            status: order.status.label().to_string(),
            status_key: order.status.as_str().to_string(),
            paid: order.paid,
            payment_method: order.payment_method().label().to_string(),
            shipping_method: order.shipping_method.as_str().to_string(),
            delivery_address: address
                .into_iter()
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(", "),
            phone_number: order.phone_number.clone(),
            total: format_ksh(order.total_amount),
            items: order.items.iter().map(OrderItemView::from).collect(),
            totals: OrderTotals::for_order(order).into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use spice_hub_core::ProductId;
    use spice_hub_core::ShippingMethod;

    fn summary() -> ProductSummary {
        ProductSummary {
            id: ProductId::new(),
            name: "Black Pepper".into(),
            price: Decimal::from(180),
            main_image: None,
            category: None,
            rating: 4.5,
            review_count: 3,
            is_sale: true,
            is_new: false,
        }
    }

    #[test]
    fn test_product_card_formats_price_and_rating() {
        let card = ProductCard::from_summary(&summary(), true);
        assert_eq!(card.price, "Ksh 180.00");
        assert_eq!(card.rating, "4.5");
        assert!(card.in_wishlist);
        assert!(card.original_price.is_none());
    }

    #[test]
    fn test_cart_line_view() {
        let line = CartLine {
            key: "guest-x-jar".into(),
            product: summary(),
            container: Some("jar".into()),
            quantity: 250,
        };
        let view = CartLineView::from(&line);
        assert_eq!(view.quantity, "250g");
        assert_eq!(view.unit_price, "Ksh 180.00");
        assert_eq!(view.line_total, "Ksh 450.00");
    }

    #[test]
    fn test_totals_view_express() {
        let view = TotalsView::from(OrderTotals::new(Decimal::from(1000), ShippingMethod::Express));
        assert_eq!(view.shipping, "Ksh 500.00");
        assert_eq!(view.total, "Ksh 1500.00");
        assert!(!view.free_shipping);
    }
}
