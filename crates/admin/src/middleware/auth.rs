//! Authentication extractor and session helpers for admin.
//!
//! Every back-office page requires a signed-in user whose backend role is
//! `admin`. The identity provider's tokens are kept in the session and the
//! access token is forwarded to the API on every call, refreshed first when
//! it is about to expire.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use tower_sessions::Session;

use spice_hub_client::{ApiClient, ClientError, IdentityClient, SessionTokens};

use crate::middleware::Flash;
use crate::models::{CurrentAdmin, session_keys};
use crate::state::AppState;
use crate::views::Layout;

/// Extractor that requires admin authentication.
///
/// Carries the admin, an API client holding their token, and the notice
/// queue.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(admin: RequireAdmin) -> impl IntoResponse {
///     format!("Hello, {}!", admin.admin.name)
/// }
/// ```
pub struct RequireAdmin {
    pub admin: CurrentAdmin,
    pub api: ApiClient,
    pub flash: Flash,
}

impl RequireAdmin {
    /// Value of `result`, or `T::default()` after logging the failure and
    /// queueing `message`.
    pub async fn or_default<T: Default>(&self, result: Result<T, ClientError>, message: &str) -> T {
        match result {
            Ok(value) => value,
            Err(e) => {
                self.report(&e, message).await;
                T::default()
            }
        }
    }

    /// Log a failed API call and queue `message`.
    pub async fn report(&self, error: &ClientError, message: &str) {
        tracing::warn!(error = %error, "{message}");
        self.flash.error(format!("{message} {}", error.user_message())).await;
    }

    /// Page chrome. Drains the notice queue, so build it last.
    pub async fn layout(&self, current_path: &str) -> Layout {
        Layout {
            admin_name: Some(self.admin.name.clone()),
            current_path: current_path.to_string(),
            flash: self.flash.take().await,
        }
    }
}

/// Error returned when the request is not from a signed-in admin.
#[derive(Debug)]
pub enum AdminRejection {
    /// Redirect to the login page.
    RedirectToLogin,
    /// The session layer is missing.
    NoSession,
}

impl IntoResponse for AdminRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/auth/login").into_response(),
            Self::NoSession => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AdminRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or(AdminRejection::NoSession)?;

        let admin: CurrentAdmin = session
            .get(session_keys::CURRENT_ADMIN)
            .await
            .ok()
            .flatten()
            .ok_or(AdminRejection::RedirectToLogin)?;
        let flash = Flash::new(session.clone());
        let Some(token) = usable_token(&session, state.identity(), &admin).await else {
            if let Err(e) = clear_current_admin(&session).await {
                tracing::warn!(error = %e, "Failed to clear expired session");
            }
            flash
                .error("Your session has expired. Please sign in again.")
                .await;
            return Err(AdminRejection::RedirectToLogin);
        };

        Ok(Self {
            admin,
            api: state.api().with_token(Some(token)),
            flash,
        })
    }
}

/// The stored access token, refreshed and re-stored when it is about to
/// expire. `None` when there is no token or the refresh is refused.
async fn usable_token(
    session: &Session,
    identity: &IdentityClient,
    admin: &CurrentAdmin,
) -> Option<SecretString> {
    let tokens: SessionTokens = session
        .get(session_keys::AUTH_TOKENS)
        .await
        .ok()
        .flatten()?;
    if !tokens.is_expired() {
        return Some(tokens.access_token());
    }

    let refreshed = match identity.refresh_session(&tokens.refresh_token()?).await {
        Ok(auth) => auth.tokens(),
        Err(e) => {
            tracing::info!(user_id = %admin.user_id, error = %e, "Token refresh failed");
            return None;
        }
    };
    if let Err(e) = session.insert(session_keys::AUTH_TOKENS, &refreshed).await {
        tracing::warn!(error = %e, "Failed to store refreshed tokens");
    }
    tracing::debug!(user_id = %admin.user_id, "Access token refreshed");
    Some(refreshed.access_token())
}

/// Store the signed-in admin and their identity tokens, rotating the
/// session id.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_admin(
    session: &Session,
    admin: &CurrentAdmin,
    tokens: &SessionTokens,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_ADMIN, admin).await?;
    session.insert(session_keys::AUTH_TOKENS, tokens).await
}

/// Clear the current admin from the session (logout). Returns their access
/// token.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_admin(
    session: &Session,
) -> Result<Option<SecretString>, tower_sessions::session::Error> {
    session
        .remove::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
        .await?;
    let tokens = session
        .remove::<SessionTokens>(session_keys::AUTH_TOKENS)
        .await?;
    Ok(tokens.map(|t| t.access_token()))
}
