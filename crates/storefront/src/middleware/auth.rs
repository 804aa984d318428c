//! Authentication extractors and session helpers.
//!
//! The identity provider's tokens and the mirrored backend user are kept in
//! the session after login. An access token close to expiry is refreshed
//! when the user is read; if that fails the user is signed out.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use tower_sessions::Session;

use spice_hub_client::{IdentityClient, SessionTokens};

use crate::middleware::Flash;
use crate::models::{CurrentUser, session_keys};
use crate::state::AppState;

/// Extractor that requires a signed-in user.
///
/// Guests are redirected to the login page, which returns them to the page
/// they asked for afterwards.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(user): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", user.first_name)
/// }
/// ```
pub struct RequireAuth(pub CurrentUser);

/// Error returned when authentication is required but nobody is logged in.
#[derive(Debug)]
pub enum AuthRejection {
    /// Redirect to the login page with the original path as `next`.
    RedirectToLogin(String),
    /// The session layer is missing.
    NoSession,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin(next) => {
                Redirect::to(&format!("/auth/login?next={next}")).into_response()
            }
            Self::NoSession => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(AuthRejection::NoSession)?;

        let user = signed_in(&session, state.identity())
            .await
            .map(|(user, _)| user);

        user.map(Self).ok_or_else(|| {
            let next = url::form_urlencoded::byte_serialize(parts.uri.path().as_bytes())
                .collect::<String>();
            AuthRejection::RedirectToLogin(next)
        })
    }
}

/// Extractor that optionally gets the current user.
///
/// Unlike `RequireAuth`, this does not reject guests.
pub struct OptionalAuth(pub Option<CurrentUser>);

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = match parts.extensions.get::<Session>() {
            Some(session) => signed_in(session, state.identity())
                .await
                .map(|(user, _)| user),
            None => None,
        };

        Ok(Self(user))
    }
}

/// Store the signed-in user and their identity tokens.
///
/// The session id is rotated first so a pre-login cookie cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
    tokens: &SessionTokens,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_USER, user).await?;
    session.insert(session_keys::AUTH_TOKENS, tokens).await
}

/// Remove the signed-in user and tokens from the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    session
        .remove::<SessionTokens>(session_keys::AUTH_TOKENS)
        .await?;
    Ok(())
}

/// The signed-in user and a usable access token.
///
/// An expired access token is exchanged for a new one and the new tokens
/// are stored. A session that cannot be refreshed is signed out and the
/// shopper is told to sign in again.
pub async fn signed_in(
    session: &Session,
    identity: &IdentityClient,
) -> Option<(CurrentUser, SecretString)> {
    let user: CurrentUser = session
        .get(session_keys::CURRENT_USER)
        .await
        .ok()
        .flatten()?;
    let tokens: Option<SessionTokens> = session
        .get(session_keys::AUTH_TOKENS)
        .await
        .ok()
        .flatten();

    if let Some(tokens) = &tokens
        && !tokens.is_expired()
    {
        return Some((user, tokens.access_token()));
    }

    let refreshed = match tokens.as_ref().and_then(SessionTokens::refresh_token) {
        Some(refresh_token) => match identity.refresh_session(&refresh_token).await {
            Ok(auth) => Some(auth),
            Err(e) => {
                tracing::info!(user_id = %user.user_id, error = %e, "Token refresh failed");
                None
            }
        },
        None => None,
    };

    match refreshed {
        Some(auth) => {
            let fresh = auth.tokens();
            if let Err(e) = session.insert(session_keys::AUTH_TOKENS, &fresh).await {
                tracing::warn!(error = %e, "Failed to store refreshed tokens");
            }
            tracing::debug!(user_id = %user.user_id, "Access token refreshed");
            Some((user, fresh.access_token()))
        }
        None => {
            if let Err(e) = clear_current_user(session).await {
                tracing::warn!(error = %e, "Failed to clear expired session");
            }
            Flash::new(session.clone())
                .info("Your session has expired. Please sign in again.")
                .await;
            None
        }
    }
}
