//! Typed client for the Spice Hub REST API.
//!
//! One method per endpoint, grouped by resource in the submodules. Every
//! request carries `Authorization: Bearer <token>` when a token is set.
//! Failures are returned as-is; nothing is retried.

mod catalog;
mod collections;
mod guest;
mod orders;
mod smart_shop;
mod users;

use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use spice_hub_core::models::Detail;

use crate::error::ClientError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// REST API client.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<SecretString>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client for the API at `base_url`, e.g. `http://localhost:8000`.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not a URL or the HTTP client fails
    /// to build.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Url::parse(base_url).map_err(|e| ClientError::Parse(format!("Invalid API URL: {e}")))?;
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Copy of this client that sends `token` as a bearer token.
    #[must_use]
    pub fn with_token(&self, token: Option<SecretString>) -> Self {
        Self {
            http: self.http.clone(),
            base_url: self.base_url.clone(),
            token,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub const fn has_token(&self) -> bool {
        self.token.is_some()
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// URL with query pairs appended; `None` values are left out.
    fn url_with_query(&self, path: &str, pairs: &[(&str, Option<String>)]) -> Result<String, ClientError> {
        let present: Vec<(&str, &str)> = pairs
            .iter()
            .filter_map(|(key, value)| value.as_deref().map(|v| (*key, v)))
            .collect();
        if present.is_empty() {
            return Ok(self.url(path));
        }
        Url::parse_with_params(&self.url(path), present)
            .map(String::from)
            .map_err(|e| ClientError::Parse(e.to_string()))
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = self.url(path);
        tracing::debug!(url = %url, "GET");
        read_json(self.request(Method::GET, &url)).await
    }

    async fn post<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let url = self.url(path);
        tracing::debug!(url = %url, "POST");
        read_json(self.request(Method::POST, &url).json(body)).await
    }

    async fn put<B: Serialize + Sync, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let url = self.url(path);
        tracing::debug!(url = %url, "PUT");
        read_json(self.request(Method::PUT, &url).json(body)).await
    }

    async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let url = self.url(path);
        tracing::debug!(url = %url, "DELETE");
        read_json(self.request(Method::DELETE, &url)).await
    }

    async fn get_text(&self, path: &str) -> Result<String, ClientError> {
        let url = self.url(path);
        tracing::debug!(url = %url, "GET");
        let response = check(self.request(Method::GET, &url).send().await?).await?;
        Ok(response.text().await?)
    }
}

async fn read_json<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, ClientError> {
    let response = check(builder.send().await?).await?;
    response
        .json()
        .await
        .map_err(|e| ClientError::Parse(e.to_string()))
}

/// Pass success responses through; turn anything else into an error.
async fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Detail>(&body).map_or(body, |d| d.detail);
    tracing::warn!(status = status.as_u16(), message = %message, "API request failed");

    if status == StatusCode::NOT_FOUND {
        return Err(ClientError::NotFound(message));
    }
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_trailing_slash() {
        let client = ApiClient::new("http://localhost:8000/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(
            client.url("/products/products"),
            "http://localhost:8000/products/products"
        );
    }

    #[test]
    fn test_new_rejects_invalid_url() {
        assert!(matches!(
            ApiClient::new("not a url"),
            Err(ClientError::Parse(_))
        ));
    }

    #[test]
    fn test_with_token() {
        let client = ApiClient::new("http://localhost:8000").unwrap();
        assert!(!client.has_token());
        let authed = client.with_token(Some(SecretString::from("abc")));
        assert!(authed.has_token());
        assert!(!format!("{authed:?}").contains("abc"));
    }

    #[test]
    fn test_url_with_query_skips_none() {
        let client = ApiClient::new("http://localhost:8000").unwrap();
        let url = client
            .url_with_query(
                "/products/products",
                &[
                    ("featured", Some("true".to_string())),
                    ("search", None),
                    ("category_id", Some("abc".to_string())),
                ],
            )
            .unwrap();
        assert_eq!(
            url,
            "http://localhost:8000/products/products?featured=true&category_id=abc"
        );

        let bare = client
            .url_with_query("/products/products", &[("search", None)])
            .unwrap();
        assert_eq!(bare, "http://localhost:8000/products/products");
    }
}
