//! Database operations for the Spice Hub `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `users` - Accounts mirrored from the identity provider
//! - `categories`, `products` - Catalog
//! - `carts`, `cart_items`, `wishlists`, `wishlist_items` - Keyed by `users.supabase_id`
//! - `orders`, `order_items`
//! - `reviews`, `shipping_addresses`
//! - `meals`, `meal_items`, `health_categories`, `health_recommendations`
//! - `sales`, `sale_products`
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p spice-hub-cli -- migrate
//! ```

pub mod carts;
pub mod categories;
pub mod health;
pub mod meals;
pub mod orders;
pub mod products;
pub mod reviews;
pub mod sales;
pub mod shipping;
pub mod users;
pub mod wishlists;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use carts::CartRepository;
pub use categories::CategoryRepository;
pub use health::HealthRepository;
pub use meals::MealRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use reviews::ReviewRepository;
pub use sales::SaleRepository;
pub use shipping::ShippingRepository;
pub use users::UserRepository;
pub use wishlists::WishlistRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("{0}")]
    Conflict(String),
}

impl From<spice_hub_core::ParseStatusError> for RepositoryError {
    fn from(err: spice_hub_core::ParseStatusError) -> Self {
        Self::DataCorruption(err.to_string())
    }
}

/// Map a unique violation to `Conflict(message)`, anything else to `Database`.
pub(crate) fn conflict_on_unique(e: sqlx::Error, message: &str) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        return RepositoryError::Conflict(message.to_owned());
    }
    RepositoryError::Database(e)
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
