//! HTTP route handlers for the REST API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness
//! GET  /health/ready                    - Readiness (database)
//!
//! /users/users                          - Users, plus /by-supabase/{supabase_id}
//! /category/categories                  - Categories
//! /products/products                    - Products (?category_id&featured&on_sale&search)
//! /carts/carts                          - Carts keyed by subject id
//! /wishlists/wishlists                  - Wishlists keyed by subject id
//! /orders/orders                        - Orders, items, analytics, invoices
//! /reviews/reviews                      - Reviews
//! /shippingAddresses/shipping           - One shipping address per user
//! /meals/meals                          - Meal kits
//! /health/health                        - Health bundles
//! /sales/sales                          - Sales, plus /active
//! /guest/guest-cart                     - In-memory guest carts
//! /guest/guest-wishlist                 - In-memory guest wishlists
//! ```
//!
//! The doubled prefixes are part of the public contract.

pub mod carts;
pub mod categories;
pub mod guest_cart;
pub mod guest_wishlist;
pub mod health;
pub mod meals;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod sales;
pub mod shipping;
pub mod users;
pub mod wishlists;

use axum::Router;

use crate::state::AppState;

/// Create all resource routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/users/users", users::router())
        .nest("/category/categories", categories::router())
        .nest("/products/products", products::router())
        .nest("/carts/carts", carts::router())
        .nest("/wishlists/wishlists", wishlists::router())
        .nest("/orders/orders", orders::router())
        .nest("/reviews/reviews", reviews::router())
        .nest("/shippingAddresses/shipping", shipping::router())
        .nest("/meals/meals", meals::router())
        .nest("/health/health", health::router())
        .nest("/sales/sales", sales::router())
        .nest("/guest/guest-cart", guest_cart::router())
        .nest("/guest/guest-wishlist", guest_wishlist::router())
}
