//! Client for the GoTrue-compatible identity provider.
//!
//! Password sign-in, sign-up, token refresh, user lookup, and sign-out.
//! Every request carries the project's anonymous key in the `apikey` header.

use std::fmt;

use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize};
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::ClientError;

/// Profile fields stored on the identity provider at sign-up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// A user as the identity provider knows them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IdentityUser {
    /// Subject id; mirrored into `users.supabase_id`.
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

/// Tokens and user returned by a successful sign-in.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    #[serde(deserialize_with = "secret")]
    pub access_token: SecretString,
    #[serde(default, deserialize_with = "optional_secret")]
    pub refresh_token: Option<SecretString>,
    #[serde(default)]
    pub expires_in: Option<i64>,
    pub user: IdentityUser,
}

impl AuthSession {
    /// Tokens to keep between requests, stamped with the current time.
    #[must_use]
    pub fn tokens(&self) -> SessionTokens {
        SessionTokens {
            access_token: self.access_token.expose_secret().to_owned(),
            refresh_token: self
                .refresh_token
                .as_ref()
                .map(|t| t.expose_secret().to_owned()),
            expires_in: self.expires_in,
            obtained_at: Utc::now().timestamp(),
        }
    }
}

/// Seconds before expiry at which a token counts as expired.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Access and refresh tokens of a signed-in session, as stored in the
/// web session.
#[derive(Clone, Serialize, Deserialize)]
pub struct SessionTokens {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    obtained_at: i64,
}

impl SessionTokens {
    #[must_use]
    pub fn access_token(&self) -> SecretString {
        SecretString::from(self.access_token.clone())
    }

    #[must_use]
    pub fn refresh_token(&self) -> Option<SecretString> {
        self.refresh_token.clone().map(SecretString::from)
    }

    /// Whether the access token is expired or within a minute of expiring.
    /// Tokens without a lifetime never expire.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp())
    }

    fn is_expired_at(&self, now: i64) -> bool {
        self.expires_in.is_some_and(|expires_in| {
            now >= self.obtained_at + expires_in - EXPIRY_MARGIN_SECS
        })
    }
}

impl fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionTokens")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "[REDACTED]"))
            .field("expires_in", &self.expires_in)
            .field("obtained_at", &self.obtained_at)
            .finish()
    }
}

fn secret<'de, D: Deserializer<'de>>(deserializer: D) -> Result<SecretString, D::Error> {
    String::deserialize(deserializer).map(SecretString::from)
}

fn optional_secret<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<SecretString>, D::Error> {
    Option::<String>::deserialize(deserializer).map(|s| s.map(SecretString::from))
}

/// Outcome of a sign-up.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SignUp {
    /// Account is usable immediately.
    Session(AuthSession),
    /// Account waits for email confirmation.
    ConfirmationRequired(IdentityUser),
}

#[derive(Serialize)]
struct PasswordCredentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Serialize)]
struct SignUpRequest<'a> {
    email: &'a str,
    password: &'a str,
    data: &'a UserMetadata,
}

/// Error bodies come in several shapes depending on the endpoint.
#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ErrorBody {
    fn into_message(self) -> Option<String> {
        self.error_description
            .or(self.msg)
            .or(self.message)
            .or(self.error)
    }
}

/// Identity provider client.
#[derive(Clone)]
pub struct IdentityClient {
    http: reqwest::Client,
    auth_url: String,
}

impl IdentityClient {
    /// Create a client for the identity provider at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL or key is malformed or the HTTP client
    /// fails to build.
    pub fn new(base_url: &str, anon_key: &SecretString) -> Result<Self, ClientError> {
        Url::parse(base_url)
            .map_err(|e| ClientError::Parse(format!("Invalid identity URL: {e}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(anon_key.expose_secret())
                .map_err(|e| ClientError::Parse(format!("Invalid API key format: {e}")))?,
        );

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            auth_url: format!("{}/auth/v1", base_url.trim_end_matches('/')),
        })
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with the provider's message on bad
    /// credentials.
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, ClientError> {
        let request = self
            .http
            .post(format!("{}/token?grant_type=password", self.auth_url))
            .json(&PasswordCredentials { email, password });
        read_json(request).await
    }

    /// Exchange a refresh token for a new session.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` if the refresh token is revoked or
    /// already used.
    pub async fn refresh_session(&self, refresh_token: &SecretString) -> Result<AuthSession, ClientError> {
        let request = self
            .http
            .post(format!("{}/token?grant_type=refresh_token", self.auth_url))
            .json(&RefreshRequest {
                refresh_token: refresh_token.expose_secret(),
            });
        read_json(request).await
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` if the provider rejects the sign-up.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &UserMetadata,
    ) -> Result<SignUp, ClientError> {
        let request = self
            .http
            .post(format!("{}/signup", self.auth_url))
            .json(&SignUpRequest {
                email,
                password,
                data: metadata,
            });
        read_json(request).await
    }

    /// The user an access token belongs to.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 401 if the token is invalid.
    pub async fn get_user(&self, access_token: &SecretString) -> Result<IdentityUser, ClientError> {
        let request = self
            .http
            .get(format!("{}/user", self.auth_url))
            .bearer_auth(access_token.expose_secret());
        read_json(request).await
    }

    /// Revoke the session of an access token.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn sign_out(&self, access_token: &SecretString) -> Result<(), ClientError> {
        let response = self
            .http
            .post(format!("{}/logout", self.auth_url))
            .bearer_auth(access_token.expose_secret())
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}

async fn read_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ClientError> {
    let response = check(request.send().await?).await?;
    response
        .json()
        .await
        .map_err(|e| ClientError::Parse(e.to_string()))
}

async fn check(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(ErrorBody::into_message)
        .unwrap_or(body);
    tracing::warn!(status = status.as_u16(), message = %message, "Identity request failed");
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}
