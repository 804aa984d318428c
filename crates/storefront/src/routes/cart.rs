//! Cart route handlers.
//!
//! Every mutation is a plain form post that redirects back, so the cart
//! works without JavaScript. Guest carts are written back to the session
//! after each change.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Form, response::Redirect};
use serde::Deserialize;
use tracing::instrument;

use spice_hub_core::{DEFAULT_ADD_QUANTITY, ProductId, format_grams, format_ksh};

use crate::error::Result;
use crate::filters;
use crate::middleware::Shopper;
use crate::routes::safe_redirect;
use crate::views::{CartLineView, Layout};

#[derive(Template, WebTemplate)]
#[template(path = "cart.html")]
pub struct CartTemplate {
    pub layout: Layout,
    pub lines: Vec<CartLineView>,
    pub subtotal: String,
}

/// Display the cart.
#[instrument(skip(shopper))]
pub async fn show(shopper: Shopper) -> CartTemplate {
    let cart = shopper.cart().await;
    let lines: Vec<CartLineView> = cart.items().iter().map(CartLineView::from).collect();
    CartTemplate {
        subtotal: format_ksh(cart.subtotal()),
        layout: shopper.layout_with_count(lines.len()).await,
        lines,
    }
}

/// Add-to-cart form. `quantity` is in grams.
#[derive(Debug, Deserialize)]
pub struct AddForm {
    pub product_id: ProductId,
    #[serde(default)]
    pub quantity: Option<i32>,
    #[serde(default)]
    pub container: Option<String>,
    #[serde(default)]
    pub redirect_to: Option<String>,
}

impl AddForm {
    /// Grams to add; missing or non-positive means the default.
    #[must_use]
    pub fn grams(&self) -> i32 {
        self.quantity
            .filter(|q| *q > 0)
            .unwrap_or(DEFAULT_ADD_QUANTITY)
    }

    /// Chosen container, ignoring a blank selection.
    #[must_use]
    pub fn container(&self) -> Option<String> {
        self.container
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_owned)
    }
}

/// Add a product to the cart.
///
/// # Errors
///
/// Returns an error if the session cannot be written.
#[instrument(skip(shopper, form), fields(product_id = %form.product_id))]
pub async fn add(shopper: Shopper, Form(form): Form<AddForm>) -> Result<Redirect> {
    let back = safe_redirect(form.redirect_to.as_deref(), "/cart").to_string();

    let product = match shopper.api().get_product(form.product_id).await {
        Ok(product) => product,
        Err(e) => {
            shopper.report(&e, &e.user_message()).await;
            return Ok(Redirect::to(&back));
        }
    };
    if product.stock <= 0 {
        shopper
            .flash
            .error(format!("{} is out of stock.", product.name))
            .await;
        return Ok(Redirect::to(&back));
    }

    let grams = form.grams();
    let mut cart = shopper.cart().await;
    match cart.add_item(product.summary(), grams, form.container()).await {
        Ok(()) => {
            shopper.save_cart(&cart).await?;
            tracing::info!(grams, "Added to cart");
            shopper
                .flash
                .success(format!(
                    "Added {} of {} to your cart.",
                    format_grams(grams),
                    product.name
                ))
                .await;
        }
        Err(e) => shopper.report(&e, &e.user_message()).await,
    }
    Ok(Redirect::to(&back))
}

/// Quantity change for one line.
#[derive(Debug, Deserialize)]
pub struct UpdateForm {
    pub key: String,
    pub quantity: i32,
}

/// Change a line's quantity. Zero or less removes the line.
///
/// # Errors
///
/// Returns an error if the session cannot be written.
#[instrument(skip(shopper, form), fields(key = %form.key))]
pub async fn update(shopper: Shopper, Form(form): Form<UpdateForm>) -> Result<Redirect> {
    let mut cart = shopper.cart().await;
    let result = if form.quantity > 0 {
        cart.update_quantity(&form.key, form.quantity).await
    } else {
        cart.remove(&form.key).await
    };
    match result {
        Ok(()) => shopper.save_cart(&cart).await?,
        Err(e) => shopper.report(&e, &e.user_message()).await,
    }
    Ok(Redirect::to("/cart"))
}

/// Line to remove.
#[derive(Debug, Deserialize)]
pub struct RemoveForm {
    pub key: String,
}

/// Remove a line from the cart.
///
/// # Errors
///
/// Returns an error if the session cannot be written.
#[instrument(skip(shopper, form), fields(key = %form.key))]
pub async fn remove(shopper: Shopper, Form(form): Form<RemoveForm>) -> Result<Redirect> {
    let mut cart = shopper.cart().await;
    match cart.remove(&form.key).await {
        Ok(()) => {
            shopper.save_cart(&cart).await?;
            shopper.flash.info("Item removed from your cart.").await;
        }
        Err(e) => shopper.report(&e, &e.user_message()).await,
    }
    Ok(Redirect::to("/cart"))
}

/// Empty the cart.
///
/// # Errors
///
/// Returns an error if the session cannot be written.
#[instrument(skip(shopper))]
pub async fn clear(shopper: Shopper) -> Result<Redirect> {
    let mut cart = shopper.cart().await;
    match cart.clear().await {
        Ok(()) => {
            shopper.save_cart(&cart).await?;
            shopper.flash.info("Your cart is empty.").await;
        }
        Err(e) => shopper.report(&e, &e.user_message()).await,
    }
    Ok(Redirect::to("/cart"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add_form(quantity: Option<i32>, container: Option<&str>) -> AddForm {
        AddForm {
            product_id: ProductId::new(),
            quantity,
            container: container.map(str::to_owned),
            redirect_to: None,
        }
    }

    #[test]
    fn test_add_defaults_to_100_grams() {
        assert_eq!(add_form(None, None).grams(), DEFAULT_ADD_QUANTITY);
        assert_eq!(add_form(Some(0), None).grams(), DEFAULT_ADD_QUANTITY);
        assert_eq!(add_form(Some(-50), None).grams(), DEFAULT_ADD_QUANTITY);
        assert_eq!(add_form(Some(250), None).grams(), 250);
    }

    #[test]
    fn test_blank_container_is_none() {
        assert_eq!(add_form(None, Some("  ")).container(), None);
        assert_eq!(
            add_form(None, Some("Glass jar")).container().as_deref(),
            Some("Glass jar")
        );
    }
}
