//! Authentication route handlers.
//!
//! Sign-in and sign-up go through the identity provider. On success the
//! user is mirrored into the backend, stored in the session, and any guest
//! cart or wishlist is merged into their server-side collections.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use spice_hub_client::{
    AuthSession, CartStore, ClientError, SignUp, UserMetadata, WishlistStore, ensure_backend_user,
};

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{Shopper, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::routes::safe_redirect;
use crate::state::AppState;
use crate::views::Layout;

/// Shortest password the sign-up form accepts.
const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SignupForm {
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub next: Option<String>,
}

impl SignupForm {
    /// First problem with the form, if any.
    #[must_use]
    pub fn validate(&self) -> Option<&'static str> {
        if !self.email.contains('@') {
            Some("Enter a valid email address.")
        } else if self.password.len() < MIN_PASSWORD_LEN {
            Some("Password must be at least 6 characters.")
        } else if self.password != self.password_confirm {
            Some("Passwords do not match.")
        } else if self.first_name.trim().is_empty() || self.last_name.trim().is_empty() {
            Some("Please enter your first and last name.")
        } else {
            None
        }
    }

    #[must_use]
    pub fn metadata(&self) -> UserMetadata {
        let phone = self.phone.trim();
        UserMetadata {
            first_name: Some(self.first_name.trim().to_string()),
            last_name: Some(self.last_name.trim().to_string()),
            role: None,
            phone: (!phone.is_empty()).then(|| phone.to_string()),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub layout: Layout,
    pub next: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "auth/signup.html")]
pub struct SignupTemplate {
    pub layout: Layout,
    pub next: String,
}

fn login_href(next: Option<&str>) -> String {
    match next {
        Some(next) => format!(
            "/auth/login?{}",
            url::form_urlencoded::Serializer::new(String::new())
                .append_pair("next", safe_redirect(Some(next), "/"))
                .finish()
        ),
        None => "/auth/login".to_string(),
    }
}

// =============================================================================
// Pages
// =============================================================================

/// Display the sign-in form. Signed-in users go straight on.
pub async fn login_page(shopper: Shopper, Query(query): Query<NextQuery>) -> Response {
    let next = safe_redirect(query.next.as_deref(), "/").to_string();
    if shopper.user.is_some() {
        return Redirect::to(&next).into_response();
    }
    LoginTemplate {
        layout: shopper.layout().await,
        next,
    }
    .into_response()
}

/// Display the sign-up form.
pub async fn signup_page(shopper: Shopper, Query(query): Query<NextQuery>) -> Response {
    let next = safe_redirect(query.next.as_deref(), "/").to_string();
    if shopper.user.is_some() {
        return Redirect::to(&next).into_response();
    }
    SignupTemplate {
        layout: shopper.layout().await,
        next,
    }
    .into_response()
}

// =============================================================================
// Actions
// =============================================================================

/// Sign in with email and password.
///
/// # Errors
///
/// Returns an error if the session cannot be written.
#[instrument(skip(state, session, shopper, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    shopper: Shopper,
    Form(form): Form<LoginForm>,
) -> Result<Redirect> {
    let back = login_href(form.next.as_deref());
    let auth = match state
        .identity()
        .sign_in_with_password(form.email.trim(), &form.password)
        .await
    {
        Ok(auth) => auth,
        Err(e) => {
            tracing::info!(error = %e, "Sign-in rejected");
            let message = match e.status() {
                Some(400 | 401 | 422) => "Invalid email or password.".to_string(),
                _ => e.user_message(),
            };
            shopper.flash.error(message).await;
            return Ok(Redirect::to(&back));
        }
    };

    if complete_sign_in(&state, &session, &shopper, auth).await? {
        Ok(Redirect::to(safe_redirect(form.next.as_deref(), "/")))
    } else {
        Ok(Redirect::to(&back))
    }
}

/// Create an account. Providers that require email confirmation leave
/// the user signed out until they confirm.
///
/// # Errors
///
/// Returns an error if the session cannot be written.
#[instrument(skip(state, session, shopper, form))]
pub async fn signup(
    State(state): State<AppState>,
    session: Session,
    shopper: Shopper,
    Form(form): Form<SignupForm>,
) -> Result<Redirect> {
    if let Some(problem) = form.validate() {
        shopper.flash.error(problem).await;
        return Ok(Redirect::to("/auth/signup"));
    }

    let result = state
        .identity()
        .sign_up(form.email.trim(), &form.password, &form.metadata())
        .await;
    match result {
        Ok(SignUp::Session(auth)) => {
            if complete_sign_in(&state, &session, &shopper, auth).await? {
                shopper.flash.success("Welcome to Spice Hub!").await;
                Ok(Redirect::to(safe_redirect(form.next.as_deref(), "/")))
            } else {
                Ok(Redirect::to("/auth/login"))
            }
        }
        Ok(SignUp::ConfirmationRequired(user)) => {
            tracing::info!(supabase_id = %user.id, "Sign-up awaiting email confirmation");
            shopper
                .flash
                .info("Check your email to confirm your account, then sign in.")
                .await;
            Ok(Redirect::to(&login_href(form.next.as_deref())))
        }
        Err(e) => {
            shopper.report(&e, &e.user_message()).await;
            Ok(Redirect::to("/auth/signup"))
        }
    }
}

/// Sign out and return home.
///
/// # Errors
///
/// Returns an error if the session cannot be written.
#[instrument(skip(state, session, shopper))]
pub async fn logout(
    State(state): State<AppState>,
    session: Session,
    shopper: Shopper,
) -> Result<Redirect> {
    if let Some(token) = shopper.token()
        && let Err(e) = state.identity().sign_out(token).await
    {
        tracing::warn!(error = %e, "Identity sign-out failed");
    }
    clear_current_user(&session).await?;
    clear_sentry_user();
    shopper.flash.info("You have been signed out.").await;
    Ok(Redirect::to("/"))
}

/// Mirror the user into the backend, store them in the session, and merge
/// their guest collections. Returns `false` if the backend user could not
/// be loaded; the shopper has already been told why.
async fn complete_sign_in(
    state: &AppState,
    session: &Session,
    shopper: &Shopper,
    auth: AuthSession,
) -> Result<bool> {
    let api = state.api_with(Some(auth.access_token.clone()));
    let backend = match ensure_backend_user(&api, &auth.user).await {
        Ok(user) => user,
        Err(e) => {
            shopper
                .report(&e, "We couldn't load your account. Please try again.")
                .await;
            return Ok(false);
        }
    };
    let user = CurrentUser::from_backend(&backend, &auth.user);

    set_current_user(session, &user, &auth.tokens()).await?;
    set_sentry_user(&user.user_id, Some(&user.email));
    tracing::info!(user_id = %user.user_id, "Signed in");

    match merge_guest_collections(&api, shopper, &user).await {
        Ok(()) => shopper.guest.clear().await?,
        Err(e) => {
            shopper
                .report(&e, "We couldn't move your saved items to your account.")
                .await;
        }
    }
    Ok(true)
}

async fn merge_guest_collections(
    api: &spice_hub_client::ApiClient,
    shopper: &Shopper,
    user: &CurrentUser,
) -> std::result::Result<(), ClientError> {
    let mut guest_cart = shopper.guest.cart.clone();
    if !guest_cart.is_empty() {
        let mut cart = CartStore::authenticated(api.clone(), &user.supabase_id);
        cart.merge_guest(&mut guest_cart).await?;
    }

    let mut guest_wishlist = shopper.guest.wishlist.clone();
    if !guest_wishlist.is_empty() {
        let mut wishlist = WishlistStore::authenticated(api.clone(), &user.supabase_id);
        wishlist.merge_guest(&mut guest_wishlist).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup() -> SignupForm {
        SignupForm {
            email: "wanjiru@example.com".into(),
            password: "pilau123".into(),
            password_confirm: "pilau123".into(),
            first_name: "Wanjiru".into(),
            last_name: "Kamau".into(),
            phone: " ".into(),
            next: None,
        }
    }

    #[test]
    fn test_signup_validation() {
        assert_eq!(signup().validate(), None);

        let mut form = signup();
        form.password_confirm = "pilau124".into();
        assert_eq!(form.validate(), Some("Passwords do not match."));

        let mut form = signup();
        form.password = "abc".into();
        form.password_confirm = "abc".into();
        assert_eq!(
            form.validate(),
            Some("Password must be at least 6 characters.")
        );

        let mut form = signup();
        form.email = "not-an-email".into();
        assert_eq!(form.validate(), Some("Enter a valid email address."));
    }

    #[test]
    fn test_signup_metadata_drops_blank_phone() {
        let metadata = signup().metadata();
        assert_eq!(metadata.first_name.as_deref(), Some("Wanjiru"));
        assert_eq!(metadata.phone, None);
    }

    #[test]
    fn test_login_href_keeps_local_next_only() {
        assert_eq!(login_href(None), "/auth/login");
        assert_eq!(
            login_href(Some("/checkout")),
            "/auth/login?next=%2Fcheckout"
        );
        assert_eq!(
            login_href(Some("https://evil.test")),
            "/auth/login?next=%2F"
        );
    }
}
