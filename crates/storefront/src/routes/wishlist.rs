//! Wishlist route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Form, response::Redirect};
use serde::Deserialize;
use tracing::instrument;

use spice_hub_core::{DEFAULT_ADD_QUANTITY, ProductId};

use crate::error::Result;
use crate::filters;
use crate::middleware::Shopper;
use crate::routes::safe_redirect;
use crate::views::{Layout, ProductCard};

#[derive(Template, WebTemplate)]
#[template(path = "wishlist.html")]
pub struct WishlistTemplate {
    pub layout: Layout,
    pub products: Vec<ProductCard>,
}

/// Display the wishlist.
#[instrument(skip(shopper))]
pub async fn show(shopper: Shopper) -> WishlistTemplate {
    let wishlist = shopper.wishlist().await;
    WishlistTemplate {
        products: wishlist
            .items()
            .iter()
            .map(|p| ProductCard::from_summary(p, true))
            .collect(),
        layout: shopper.layout().await,
    }
}

/// Form naming one product.
#[derive(Debug, Deserialize)]
pub struct ProductForm {
    pub product_id: ProductId,
    #[serde(default)]
    pub redirect_to: Option<String>,
}

/// Add a product to the wishlist, or remove it if already there.
///
/// # Errors
///
/// Returns an error if the session cannot be written.
#[instrument(skip(shopper, form), fields(product_id = %form.product_id))]
pub async fn toggle(shopper: Shopper, Form(form): Form<ProductForm>) -> Result<Redirect> {
    let back = safe_redirect(form.redirect_to.as_deref(), "/wishlist").to_string();

    let product = match shopper.api().get_product(form.product_id).await {
        Ok(product) => product,
        Err(e) => {
            shopper.report(&e, &e.user_message()).await;
            return Ok(Redirect::to(&back));
        }
    };

    let mut wishlist = shopper.wishlist().await;
    match wishlist.toggle(product.summary()).await {
        Ok(added) => {
            shopper.save_wishlist(&wishlist).await?;
            let message = if added {
                format!("{} saved to your wishlist.", product.name)
            } else {
                format!("{} removed from your wishlist.", product.name)
            };
            shopper.flash.success(message).await;
        }
        Err(e) => shopper.report(&e, &e.user_message()).await,
    }
    Ok(Redirect::to(&back))
}

/// Remove a product from the wishlist.
///
/// # Errors
///
/// Returns an error if the session cannot be written.
#[instrument(skip(shopper, form), fields(product_id = %form.product_id))]
pub async fn remove(shopper: Shopper, Form(form): Form<ProductForm>) -> Result<Redirect> {
    let mut wishlist = shopper.wishlist().await;
    match wishlist.remove(form.product_id).await {
        Ok(()) => {
            shopper.save_wishlist(&wishlist).await?;
            shopper.flash.info("Removed from your wishlist.").await;
        }
        Err(e) => shopper.report(&e, &e.user_message()).await,
    }
    Ok(Redirect::to(safe_redirect(
        form.redirect_to.as_deref(),
        "/wishlist",
    )))
}

/// Empty the wishlist.
///
/// # Errors
///
/// Returns an error if the session cannot be written.
#[instrument(skip(shopper))]
pub async fn clear(shopper: Shopper) -> Result<Redirect> {
    let mut wishlist = shopper.wishlist().await;
    match wishlist.clear().await {
        Ok(()) => {
            shopper.save_wishlist(&wishlist).await?;
            shopper.flash.info("Your wishlist is empty.").await;
        }
        Err(e) => shopper.report(&e, &e.user_message()).await,
    }
    Ok(Redirect::to("/wishlist"))
}

/// Move a wishlist product into the cart at the default quantity.
///
/// # Errors
///
/// Returns an error if the session cannot be written.
#[instrument(skip(shopper, form), fields(product_id = %form.product_id))]
pub async fn move_to_cart(shopper: Shopper, Form(form): Form<ProductForm>) -> Result<Redirect> {
    let mut wishlist = shopper.wishlist().await;
    let Some(product) = wishlist
        .items()
        .into_iter()
        .find(|p| p.id == form.product_id)
    else {
        shopper
            .flash
            .error("That product is no longer in your wishlist.")
            .await;
        return Ok(Redirect::to("/wishlist"));
    };

    let mut cart = shopper.cart().await;
    let name = product.name.clone();
    if let Err(e) = cart.add_item(product, DEFAULT_ADD_QUANTITY, None).await {
        shopper.report(&e, &e.user_message()).await;
        return Ok(Redirect::to("/wishlist"));
    }
    shopper.save_cart(&cart).await?;

    match wishlist.remove(form.product_id).await {
        Ok(()) => shopper.save_wishlist(&wishlist).await?,
        Err(e) => shopper.report(&e, &e.user_message()).await,
    }
    shopper
        .flash
        .success(format!("{name} moved to your cart."))
        .await;
    Ok(Redirect::to("/wishlist"))
}
