//! Checkout: review the cart, enter delivery details, place the order.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::Query,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use spice_hub_client::CartLine;
use spice_hub_core::models::{NewOrder, NewOrderItem, ShippingAddress};
use spice_hub_core::pricing::OrderTotals;
use spice_hub_core::{OrderStatus, ShippingMethod, UserId, format_ksh, pricing::shipping_fee};

use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{RequireAuth, Shopper};
use crate::routes::products::SelectOption;
use crate::views::{CartLineView, Layout, TotalsView};

#[derive(Debug, Default, Deserialize)]
pub struct CheckoutQuery {
    pub shipping: Option<String>,
}

fn parse_method(value: Option<&str>) -> ShippingMethod {
    value.and_then(|s| s.parse().ok()).unwrap_or_default()
}

#[derive(Template, WebTemplate)]
#[template(path = "checkout.html")]
pub struct CheckoutTemplate {
    pub layout: Layout,
    pub lines: Vec<CartLineView>,
    pub totals: TotalsView,
    pub shipping_methods: Vec<SelectOption>,
    pub city: String,
    pub area: String,
}

/// Display the checkout form. Guests are sent to sign in first and an
/// empty cart goes back to the cart page.
#[instrument(skip(user, shopper), fields(user_id = %user.user_id))]
pub async fn show(
    RequireAuth(user): RequireAuth,
    shopper: Shopper,
    Query(query): Query<CheckoutQuery>,
) -> Response {
    let (cart, address) = tokio::join!(
        shopper.cart(),
        shopper.api().get_user_shipping_address(user.user_id),
    );
    if cart.count() == 0 {
        shopper.flash.info("Your cart is empty.").await;
        return Redirect::to("/cart").into_response();
    }
    let address: Option<ShippingAddress> = shopper
        .or_default(address, "We couldn't load your saved address.")
        .await;

    let method = parse_method(query.shipping.as_deref());
    let lines: Vec<CartLineView> = cart.items().iter().map(CartLineView::from).collect();
    let (city, area) = address.map(|a| (a.city, a.area)).unwrap_or_default();

    CheckoutTemplate {
        totals: OrderTotals::new(cart.subtotal(), method).into(),
        shipping_methods: ShippingMethod::ALL
            .iter()
            .map(|m| SelectOption {
                value: m.as_str().to_string(),
                label: format!("{} ({})", shipping_label(*m), format_ksh(shipping_fee(*m))),
                selected: *m == method,
            })
            .collect(),
        city,
        area,
        layout: shopper.layout_with_count(lines.len()).await,
        lines,
    }
    .into_response()
}

const fn shipping_label(method: ShippingMethod) -> &'static str {
    match method {
        ShippingMethod::Standard => "Standard delivery",
        ShippingMethod::Express => "Express delivery",
    }
}

/// Delivery and payment details.
#[derive(Debug, Default, Deserialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub shipping_method: Option<String>,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub area: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub apartment: String,
    #[serde(default)]
    pub phone_number: String,
    /// `delivery` or `mpesa`.
    #[serde(default)]
    pub payment: String,
    #[serde(default)]
    pub mpesa_code: Option<String>,
    #[serde(default)]
    pub additional_note: Option<String>,
}

fn trimmed(value: Option<&String>) -> Option<String> {
    value
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

fn valid_phone(phone: &str) -> bool {
    let digits = phone.strip_prefix('+').unwrap_or(phone);
    (9..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
}

impl CheckoutForm {
    /// Check the form, returning every problem found.
    #[must_use]
    pub fn validate(&self) -> Vec<&'static str> {
        let mut errors = Vec::new();
        if self.city.trim().is_empty() {
            errors.push("City is required.");
        }
        if self.area.trim().is_empty() {
            errors.push("Area is required.");
        }
        if !valid_phone(self.phone_number.trim()) {
            errors.push("Enter a valid phone number.");
        }
        match self.payment.as_str() {
            "delivery" => {}
            "mpesa" => {
                if trimmed(self.mpesa_code.as_ref()).is_none() {
                    errors.push("Enter the M-Pesa transaction code.");
                }
            }
            _ => errors.push("Choose a payment method."),
        }
        errors
    }

    /// Build the order for `user_id` from the cart lines.
    #[must_use]
    pub fn into_order(self, user_id: UserId, lines: &[CartLine]) -> NewOrder {
        let method = parse_method(self.shipping_method.as_deref());
        let subtotal = spice_hub_core::pricing::subtotal(
            lines.iter().map(|l| (l.product.price, l.quantity)),
        );
        let pay_on_delivery = self.payment == "delivery";
        NewOrder {
            user_id,
            status: OrderStatus::Pending,
            total_amount: OrderTotals::new(subtotal, method).total,
            shipping_method: method,
            mpesa_code: if pay_on_delivery {
                None
            } else {
                trimmed(self.mpesa_code.as_ref())
            },
            additional_note: trimmed(self.additional_note.as_ref()),
            city: self.city.trim().to_string(),
            area: self.area.trim().to_string(),
            address: self.address.trim().to_string(),
            phone_number: self.phone_number.trim().to_string(),
            apartment: self.apartment.trim().to_string(),
            pay_on_delivery,
            paid: false,
            internal_notes: None,
            items: lines
                .iter()
                .map(|line| NewOrderItem {
                    product_id: line.product.id,
                    container: line.container.clone(),
                    name: Some(line.product.name.clone()),
                    image: line.product.main_image.clone(),
                    quantity: line.quantity,
                    price: line.product.price,
                })
                .collect(),
        }
    }
}

/// Place the order, empty the cart, and show the confirmation.
///
/// # Errors
///
/// Returns an error if the session cannot be written.
#[instrument(skip(user, shopper, form), fields(user_id = %user.user_id))]
pub async fn place_order(
    RequireAuth(user): RequireAuth,
    shopper: Shopper,
    Form(form): Form<CheckoutForm>,
) -> Result<Redirect> {
    let mut cart = shopper.cart().await;
    let lines = cart.items();
    if lines.is_empty() {
        shopper.flash.info("Your cart is empty.").await;
        return Ok(Redirect::to("/cart"));
    }

    let errors = form.validate();
    if !errors.is_empty() {
        for error in errors {
            shopper.flash.error(error).await;
        }
        return Ok(Redirect::to("/checkout"));
    }

    let order = form.into_order(user.user_id, &lines);
    let order = match shopper.api().create_order(&order).await {
        Ok(order) => order,
        Err(e) => {
            shopper.report(&e, &e.user_message()).await;
            return Ok(Redirect::to("/checkout"));
        }
    };

    let order_id = order.id.to_string();
    add_breadcrumb("checkout", "Order placed", Some(&[("order_id", &order_id)]));
    tracing::info!(order_id = %order.id, total = %order.total_amount, "Order placed");

    if let Err(e) = cart.clear().await {
        shopper
            .report(&e, "Your order was placed but we couldn't empty your cart.")
            .await;
    }
    shopper.save_cart(&cart).await?;
    shopper
        .flash
        .success(format!("Order {} placed. Thank you!", order.reference()))
        .await;
    Ok(Redirect::to(&format!("/orders/{}/confirmation", order.id)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use rust_decimal::Decimal;

    use spice_hub_core::ProductId;
    use spice_hub_core::models::ProductSummary;

    use super::*;

    fn form() -> CheckoutForm {
        CheckoutForm {
            shipping_method: Some("express".into()),
            city: " Nairobi ".into(),
            area: "Westlands".into(),
            address: "Ring Road".into(),
            apartment: String::new(),
            phone_number: "0712345678".into(),
            payment: "delivery".into(),
            mpesa_code: Some("QX12".into()),
            additional_note: Some("  ".into()),
        }
    }

    fn line(price: i64, grams: i32) -> CartLine {
        CartLine {
            key: "k".into(),
            product: ProductSummary {
                id: ProductId::new(),
                name: "Cumin".into(),
                price: Decimal::from(price),
                main_image: None,
                category: None,
                rating: 0.0,
                review_count: 0,
                is_sale: false,
                is_new: false,
            },
            container: Some("Jar".into()),
            quantity: grams,
        }
    }

    #[test]
    fn test_valid_form_has_no_errors() {
        assert!(form().validate().is_empty());
    }

    #[test]
    fn test_validation_errors() {
        let bad = CheckoutForm {
            payment: "mpesa".into(),
            mpesa_code: None,
            phone_number: "07-12".into(),
            ..CheckoutForm::default()
        };
        let errors = bad.validate();
        assert!(errors.contains(&"City is required."));
        assert!(errors.contains(&"Area is required."));
        assert!(errors.contains(&"Enter a valid phone number."));
        assert!(errors.contains(&"Enter the M-Pesa transaction code."));
    }

    #[test]
    fn test_phone_numbers() {
        assert!(valid_phone("0712345678"));
        assert!(valid_phone("+254712345678"));
        assert!(!valid_phone("12345"));
        assert!(!valid_phone("0712 345 678"));
    }

    #[test]
    fn test_into_order_is_pending_and_unpaid() {
        let user_id = UserId::new();
        let lines = [line(200, 250)];
        let order = form().into_order(user_id, &lines);

        assert_eq!(order.user_id, user_id);
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(!order.paid);
        assert!(order.pay_on_delivery);
        assert_eq!(order.mpesa_code, None);
        assert_eq!(order.additional_note, None);
        assert_eq!(order.city, "Nairobi");
        assert_eq!(order.shipping_method, ShippingMethod::Express);
        assert_eq!(
            order.total_amount,
            OrderTotals::new(Decimal::from(500), ShippingMethod::Express).total
        );
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].quantity, 250);
        assert_eq!(order.items[0].container.as_deref(), Some("Jar"));
    }
}
