//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                               - Dashboard overview
//!
//! # Auth
//! GET  /auth/login                     - Login page
//! POST /auth/login                     - Sign in (admins only)
//! POST /auth/logout                    - Sign out
//!
//! # Catalog
//! GET  /products                       - Product listing
//! GET  /products/new | /{id}/edit      - Product forms
//! POST /products | /{id} | /{id}/delete
//! GET  /categories                     - Category listing
//! GET  /categories/new | /{id}/edit
//! POST /categories | /{id} | /{id}/delete
//!
//! # Smart shop
//! GET  /meals | /meals/new | /meals/{id}/edit
//! POST /meals | /meals/{id} | /meals/{id}/toggle | /meals/{id}/delete
//! GET  /health | /health/new | /health/{id}/edit
//! POST /health | /health/{id} | /health/{id}/toggle | /health/{id}/delete
//!
//! # Promotions
//! GET  /sales | /sales/new | /sales/{id}/edit
//! POST /sales | /sales/{id} | /sales/{id}/delete
//!
//! # Orders
//! GET  /orders                         - Listing with status filter and search
//! GET  /orders/export                  - CSV, Excel, or printable export
//! GET  /orders/{id}                    - Detail
//! GET  /orders/{id}/invoice            - Plain-text invoice download
//! POST /orders/{id}/status | paid | notes
//! POST /orders/{id}/items/{item_id}/delete
//!
//! # Customers
//! GET  /customers                      - Listing with search
//! GET  /customers/export               - CSV, Excel, or printable export
//! ```

pub mod auth;
pub mod categories;
pub mod customers;
pub mod dashboard;
pub mod health;
pub mod meals;
pub mod orders;
pub mod products;
pub mod sales;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Build the complete admin router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::index))
        .nest("/auth", auth_routes())
        .nest("/products", product_routes())
        .nest("/categories", category_routes())
        .nest("/meals", meal_routes())
        .nest("/health", health_routes())
        .nest("/sales", sale_routes())
        .nest("/orders", order_routes())
        .route("/customers", get(customers::index))
        .route("/customers/export", get(customers::export))
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
}

fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route("/new", get(products::new_form))
        .route("/{id}", post(products::update))
        .route("/{id}/edit", get(products::edit_form))
        .route("/{id}/delete", post(products::delete))
}

fn category_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(categories::index).post(categories::create))
        .route("/new", get(categories::new_form))
        .route("/{id}", post(categories::update))
        .route("/{id}/edit", get(categories::edit_form))
        .route("/{id}/delete", post(categories::delete))
}

fn meal_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(meals::index).post(meals::create))
        .route("/new", get(meals::new_form))
        .route("/{id}", post(meals::update))
        .route("/{id}/edit", get(meals::edit_form))
        .route("/{id}/toggle", post(meals::toggle))
        .route("/{id}/delete", post(meals::delete))
}

fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(health::index).post(health::create))
        .route("/new", get(health::new_form))
        .route("/{id}", post(health::update))
        .route("/{id}/edit", get(health::edit_form))
        .route("/{id}/toggle", post(health::toggle))
        .route("/{id}/delete", post(health::delete))
}

fn sale_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(sales::index).post(sales::create))
        .route("/new", get(sales::new_form))
        .route("/{id}", post(sales::update))
        .route("/{id}/edit", get(sales::edit_form))
        .route("/{id}/delete", post(sales::delete))
}

fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index))
        .route("/export", get(orders::export))
        .route("/{id}", get(orders::show))
        .route("/{id}/invoice", get(orders::invoice))
        .route("/{id}/status", post(orders::update_status))
        .route("/{id}/paid", post(orders::set_paid))
        .route("/{id}/notes", post(orders::add_note))
        .route("/{id}/items/{item_id}/delete", post(orders::delete_item))
}
