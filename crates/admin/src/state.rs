//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use spice_hub_client::{ApiClient, ClientError, IdentityClient};

use crate::config::AdminConfig;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    api: ApiClient,
    identity: IdentityClient,
}

impl AppState {
    /// Create the state and its API clients.
    ///
    /// # Errors
    ///
    /// Returns an error if the API or identity URL is unusable.
    pub fn new(config: AdminConfig, pool: PgPool) -> Result<Self, ClientError> {
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
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// API client without a bearer token.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    #[must_use]
    pub fn identity(&self) -> &IdentityClient {
        &self.inner.identity
    }
}
