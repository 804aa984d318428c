//! Application state shared across handlers.

use std::sync::Arc;

use secrecy::SecretString;
use sqlx::PgPool;

use spice_hub_client::{ApiClient, ClientError, IdentityClient};

use crate::config::StorefrontConfig;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the session database and the API clients.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    api: ApiClient,
    identity: IdentityClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the API or identity URL is unusable.
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Result<Self, ClientError> {
        let api = ApiClient::new(&config.api_url)?;
        let identity = IdentityClient::new(&config.identity_url, &config.identity_anon_key)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                api,
                identity,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Session store pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Anonymous API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// API client that forwards `token` as the bearer token.
    #[must_use]
    pub fn api_with(&self, token: Option<SecretString>) -> ApiClient {
        self.inner.api.with_token(token)
    }

    #[must_use]
    pub fn identity(&self) -> &IdentityClient {
        &self.inner.identity
    }
}
