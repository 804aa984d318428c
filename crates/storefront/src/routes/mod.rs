//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                              - Home (featured, sale banner, new arrivals)
//! GET  /products                      - Catalog (filters, sort, 12 per page)
//! GET  /products/{id}                 - Product detail with reviews
//! POST /products/{id}/reviews         - Write a review (signed in)
//! GET  /categories                    - Category list
//! GET  /categories/{id}               - Category products
//! GET  /sale                          - Sale products with countdown
//! GET  /smart-shop                    - Meal and health bundles
//! POST /smart-shop/bundle             - Add a bundle to the cart
//!
//! # Cart & Wishlist
//! GET  /cart                          - Cart page
//! POST /cart/add | update | remove | clear
//! GET  /wishlist                      - Wishlist page
//! POST /wishlist/toggle | remove | clear | move-to-cart
//!
//! # Orders (signed in)
//! GET  /checkout                      - Checkout form and totals
//! POST /checkout                      - Place order
//! GET  /orders/{id}/confirmation      - Order confirmation
//! GET  /track-order                   - Order lookup
//! GET  /track-order/{id}              - Order progress
//!
//! # Account
//! GET  /account                       - Profile and order history (signed in)
//! POST /account/shipping              - Save shipping address (signed in)
//! GET  /auth/login | signup           - Forms
//! POST /auth/login | signup | logout
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod categories;
pub mod checkout;
pub mod home;
pub mod orders;
pub mod products;
pub mod sale;
pub mod smart_shop;
pub mod wishlist;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Build the complete storefront router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::index))
        .merge(catalog_routes())
        .nest("/cart", cart_routes())
        .nest("/wishlist", wishlist_routes())
        .merge(order_routes())
        .merge(account_routes())
        .nest("/auth", auth_routes())
}

/// Catalog browsing routes.
fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::index))
        .route("/products/{id}", get(products::show))
        .route("/products/{id}/reviews", post(products::create_review))
        .route("/categories", get(categories::index))
        .route("/categories/{id}", get(categories::show))
        .route("/sale", get(sale::index))
        .route("/smart-shop", get(smart_shop::index))
        .route("/smart-shop/bundle", post(smart_shop::add_bundle))
}

/// Cart routes.
fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
}

/// Wishlist routes.
fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::show))
        .route("/toggle", post(wishlist::toggle))
        .route("/remove", post(wishlist::remove))
        .route("/clear", post(wishlist::clear))
        .route("/move-to-cart", post(wishlist::move_to_cart))
}

/// Checkout, confirmation, and tracking routes.
fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/checkout", get(checkout::show).post(checkout::place_order))
        .route("/orders/{id}/confirmation", get(orders::confirmation))
        .route("/track-order", get(orders::lookup))
        .route("/track-order/{id}", get(orders::track))
}

/// Account routes.
fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/account", get(account::show))
        .route("/account/shipping", post(account::save_shipping))
}

/// Authentication routes.
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/signup", get(auth::signup_page).post(auth::signup))
        .route("/logout", post(auth::logout))
}

/// Local path to return to after a form post. Anything that could leave
/// the site falls back to `default`.
#[must_use]
pub fn safe_redirect<'a>(target: Option<&'a str>, default: &'a str) -> &'a str {
    match target {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path
        }
        _ => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_redirect() {
        assert_eq!(safe_redirect(Some("/products?page=2"), "/"), "/products?page=2");
        assert_eq!(safe_redirect(Some("//evil.test"), "/"), "/");
        assert_eq!(safe_redirect(Some("https://evil.test"), "/cart"), "/cart");
        assert_eq!(safe_redirect(Some("/\\evil.test"), "/"), "/");
        assert_eq!(safe_redirect(None, "/wishlist"), "/wishlist");
    }
}
