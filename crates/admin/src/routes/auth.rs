//! Back-office sign-in.
//!
//! Credentials go to the identity provider. The backend user behind the
//! identity must have role `admin`; everyone else is turned away and their
//! fresh identity session is revoked.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use spice_hub_core::UserRole;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{Flash, clear_current_admin, set_current_admin};
use crate::models::{CurrentAdmin, session_keys};
use crate::state::AppState;
use crate::views::Layout;

/// Notice shown to signed-in users without the admin role.
pub const ACCESS_DENIED: &str = "Access denied. This account is not an administrator.";

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub layout: Layout,
}

/// Login page. Signed-in admins go to the dashboard.
pub async fn login_page(session: Session) -> Response {
    let signed_in = session
        .get::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
        .await
        .ok()
        .flatten()
        .is_some();
    if signed_in {
        return Redirect::to("/").into_response();
    }
    LoginTemplate {
        layout: Layout {
            current_path: "/auth/login".to_string(),
            flash: Flash::new(session).take().await,
            ..Layout::default()
        },
    }
    .into_response()
}

/// Sign in and check the admin role.
///
/// # Errors
///
/// Returns an error if the session cannot be written.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Redirect> {
    let flash = Flash::new(session.clone());
    let auth = match state
        .identity()
        .sign_in_with_password(form.email.trim(), &form.password)
        .await
    {
        Ok(auth) => auth,
        Err(e) => {
            tracing::info!(error = %e, "Admin sign-in rejected");
            flash.error("Invalid email or password.").await;
            return Ok(Redirect::to("/auth/login"));
        }
    };

    let api = state.api().with_token(Some(auth.access_token.clone()));
    let user = match api.get_user_by_supabase_id(&auth.user.id).await {
        Ok(user) => user,
        Err(e) if e.is_not_found() => {
            deny(&state, &flash, &auth.access_token, &auth.user.id).await;
            return Ok(Redirect::to("/auth/login"));
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load backend user");
            flash.error(format!("Sign-in failed. {}", e.user_message())).await;
            return Ok(Redirect::to("/auth/login"));
        }
    };

    if user.role != UserRole::Admin {
        deny(&state, &flash, &auth.access_token, &auth.user.id).await;
        return Ok(Redirect::to("/auth/login"));
    }

    let admin = CurrentAdmin::from(&user);
    set_current_admin(&session, &admin, &auth.tokens()).await?;
    set_sentry_user(&admin.user_id, Some(&admin.email));
    tracing::info!(user_id = %admin.user_id, "Admin signed in");
    Ok(Redirect::to("/"))
}

async fn deny(state: &AppState, flash: &Flash, token: &SecretString, supabase_id: &str) {
    tracing::warn!(supabase_id = %supabase_id, "Non-admin attempted back-office sign-in");
    if let Err(e) = state.identity().sign_out(token).await {
        tracing::warn!(error = %e, "Identity sign-out failed");
    }
    flash.error(ACCESS_DENIED).await;
}

/// Sign out.
///
/// # Errors
///
/// Returns an error if the session cannot be written.
#[instrument(skip(state, session))]
pub async fn logout(State(state): State<AppState>, session: Session) -> Result<Redirect> {
    if let Some(token) = clear_current_admin(&session).await?
        && let Err(e) = state.identity().sign_out(&token).await
    {
        tracing::warn!(error = %e, "Identity sign-out failed");
    }
    clear_sentry_user();
    Flash::new(session).success("Signed out.").await;
    Ok(Redirect::to("/auth/login"))
}
