//! Optional bearer-token verification.
//!
//! When a JWT secret is configured, any `Authorization: Bearer` token must be
//! a valid HS256 JWT issued within the configured lifetime. Requests without a
//! token pass through so the catalog stays browsable anonymously.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{Algorithm, Validation, decode};
use serde::Deserialize;
use tracing::Span;

use crate::error::AppError;
use crate::state::AppState;

/// Claims read from identity-provider tokens.
#[derive(Debug, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub sub: Option<String>,
    #[serde(default)]
    pub iat: Option<i64>,
    pub exp: u64,
}

/// Extract the token from an `Authorization: Bearer <token>` header.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    scheme
        .eq_ignore_ascii_case("bearer")
        .then(|| token.trim())
        .filter(|t| !t.is_empty())
}

/// Reject requests carrying an invalid bearer token.
pub async fn bearer_auth(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let Some(key) = state.jwt_key() else {
        return next.run(request).await;
    };
    let Some(token) = bearer_token(request.headers()) else {
        return next.run(request).await;
    };

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_aud = false;

    let claims = match decode::<Claims>(token, key, &validation) {
        Ok(data) => data.claims,
        Err(e) => {
            tracing::warn!(error = %e, "Rejected bearer token");
            return unauthorized();
        }
    };

    let max_age = i64::try_from(state.config().access_token_expire_minutes)
        .unwrap_or(i64::MAX)
        .saturating_mul(60);
    if let Some(iat) = claims.iat
        && chrono::Utc::now().timestamp().saturating_sub(iat) > max_age
    {
        tracing::warn!(iat, "Rejected bearer token older than the access token lifetime");
        return unauthorized();
    }

    if let Some(sub) = claims.sub.as_deref() {
        Span::current().record("user_sub", sub);
    }
    next.run(request).await
}

fn unauthorized() -> Response {
    AppError::Unauthorized("Could not validate credentials".to_string()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(value) = HeaderValue::from_str(value) {
            headers.insert(AUTHORIZATION, value);
        }
        headers
    }

    #[test]
    fn test_bearer_token_extraction() {
        assert_eq!(bearer_token(&headers("Bearer abc.def.ghi")), Some("abc.def.ghi"));
        assert_eq!(bearer_token(&headers("bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&headers("Basic dXNlcjpwYXNz")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
