//! Account route handlers.
//!
//! These routes require authentication.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Form, response::Redirect};
use serde::Deserialize;
use tracing::instrument;

use spice_hub_core::models::{NewShippingAddress, ShippingAddressUpdate};

use crate::filters;
use crate::middleware::{RequireAuth, Shopper};
use crate::models::CurrentUser;
use crate::views::{Layout, OrderView};

/// Country used when the form leaves it blank.
const DEFAULT_COUNTRY: &str = "Kenya";

#[derive(Debug, Clone)]
pub struct AddressView {
    pub country: String,
    pub city: String,
    pub area: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "account.html")]
pub struct AccountTemplate {
    pub layout: Layout,
    pub profile: CurrentUser,
    pub orders: Vec<OrderView>,
    pub address: Option<AddressView>,
}

/// Profile, order history, and saved address.
#[instrument(skip(user, shopper), fields(user_id = %user.user_id))]
pub async fn show(RequireAuth(user): RequireAuth, shopper: Shopper) -> AccountTemplate {
    let api = shopper.api();
    let (orders, address) = tokio::join!(
        api.list_user_orders(user.user_id),
        api.get_user_shipping_address(user.user_id),
    );
    let mut orders = shopper
        .or_default(orders, "We couldn't load your orders.")
        .await;
    let address = shopper
        .or_default(address, "We couldn't load your address.")
        .await;
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    AccountTemplate {
        orders: orders.iter().map(OrderView::from).collect(),
        address: address.map(|a| AddressView {
            country: a.country,
            city: a.city,
            area: a.area,
        }),
        layout: shopper.layout().await,
        profile: user,
    }
}

#[derive(Debug, Deserialize)]
pub struct ShippingForm {
    #[serde(default)]
    pub country: String,
    pub city: String,
    pub area: String,
}

/// Create or replace the saved shipping address.
#[instrument(skip(user, shopper, form), fields(user_id = %user.user_id))]
pub async fn save_shipping(
    RequireAuth(user): RequireAuth,
    shopper: Shopper,
    Form(form): Form<ShippingForm>,
) -> Redirect {
    let city = form.city.trim();
    let area = form.area.trim();
    if city.is_empty() || area.is_empty() {
        shopper.flash.error("City and area are required.").await;
        return Redirect::to("/account");
    }
    let country = match form.country.trim() {
        "" => DEFAULT_COUNTRY,
        country => country,
    };

    let api = shopper.api();
    let existing = match api.get_user_shipping_address(user.user_id).await {
        Ok(existing) => existing,
        Err(e) => {
            shopper.report(&e, &e.user_message()).await;
            return Redirect::to("/account");
        }
    };
    let result = match existing {
        Some(address) => {
            let update = ShippingAddressUpdate {
                country: Some(country.to_string()),
                city: Some(city.to_string()),
                area: Some(area.to_string()),
            };
            api.update_shipping_address(address.id, &update).await
        }
        None => {
            let address = NewShippingAddress {
                country: country.to_string(),
                city: city.to_string(),
                area: area.to_string(),
                user_id: user.user_id,
            };
            api.create_shipping_address(&address).await
        }
    };

    match result {
        Ok(_) => shopper.flash.success("Shipping address saved.").await,
        Err(e) => shopper.report(&e, &e.user_message()).await,
    }
    Redirect::to("/account")
}
