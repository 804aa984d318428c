//! Application state shared across handlers.

use std::sync::Arc;

use jsonwebtoken::DecodingKey;
use secrecy::ExposeSecret;
use sqlx::PgPool;

use crate::config::ApiConfig;
use crate::guest::GuestStore;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ApiConfig,
    pool: PgPool,
    guests: GuestStore,
    jwt_key: Option<DecodingKey>,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: ApiConfig, pool: PgPool) -> Self {
        let guests = GuestStore::new(config.guest_session_ttl);
        let jwt_key = config
            .jwt_secret
            .as_ref()
            .map(|secret| DecodingKey::from_secret(secret.expose_secret().as_bytes()));
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                guests,
                jwt_key,
            }),
        }
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &ApiConfig {
        &self.inner.config
    }

    /// Get a reference to the database pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Guest carts and wishlists.
    #[must_use]
    pub fn guests(&self) -> &GuestStore {
        &self.inner.guests
    }

    /// Key for verifying bearer tokens, if token checks are enabled.
    #[must_use]
    pub fn jwt_key(&self) -> Option<&DecodingKey> {
        self.inner.jwt_key.as_ref()
    }
}
