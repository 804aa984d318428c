//! The person browsing, signed in or not.
//!
//! [`Shopper`] bundles the session-held identity, guest state, and flash
//! queue, and builds the cart and wishlist stores for the request.

use axum::{extract::FromRequestParts, http::request::Parts};
use secrecy::SecretString;
use tower_sessions::Session;

use spice_hub_client::{ApiClient, CartStore, ClientError, WishlistStore};

use crate::error::AppError;
use crate::middleware::{Flash, GuestSession, auth};
use crate::models::CurrentUser;
use crate::state::AppState;
use crate::views::Layout;

/// Per-request shopper context.
pub struct Shopper {
    pub user: Option<CurrentUser>,
    pub guest: GuestSession,
    pub flash: Flash,
    token: Option<SecretString>,
    api: ApiClient,
}

impl Shopper {
    /// API client carrying the shopper's bearer token, if any.
    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    /// The signed-in user's access token.
    #[must_use]
    pub const fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }

    /// Cart store for this shopper, loaded from the server when signed in.
    ///
    /// A failed load leaves the store empty and queues an error message.
    pub async fn cart(&self) -> CartStore {
        match &self.user {
            Some(user) => {
                let mut store = CartStore::authenticated(self.api.clone(), &user.supabase_id);
                if let Err(e) = store.refresh().await {
                    self.report(&e, "We couldn't load your cart.").await;
                }
                store
            }
            None => CartStore::guest(self.api.clone(), self.guest.cart.clone()),
        }
    }

    /// Wishlist store for this shopper.
    pub async fn wishlist(&self) -> WishlistStore {
        match &self.user {
            Some(user) => {
                let mut store = WishlistStore::authenticated(self.api.clone(), &user.supabase_id);
                if let Err(e) = store.refresh().await {
                    self.report(&e, "We couldn't load your wishlist.").await;
                }
                store
            }
            None => WishlistStore::guest(self.api.clone(), self.guest.wishlist.clone()),
        }
    }

    /// Persist a guest cart after a mutation. Server carts need nothing.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    pub async fn save_cart(&self, store: &CartStore) -> Result<(), AppError> {
        if let Some(cart) = store.guest_cart() {
            self.guest.save_cart(cart).await?;
        }
        Ok(())
    }

    /// Persist a guest wishlist after a mutation.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be written.
    pub async fn save_wishlist(&self, store: &WishlistStore) -> Result<(), AppError> {
        if let Some(wishlist) = store.guest_wishlist() {
            self.guest.save_wishlist(wishlist).await?;
        }
        Ok(())
    }

    /// Value of `result`, or `T::default()` after logging the failure and
    /// queueing `message` for the shopper.
    pub async fn or_default<T: Default>(&self, result: Result<T, ClientError>, message: &str) -> T {
        match result {
            Ok(value) => value,
            Err(e) => {
                self.report(&e, message).await;
                T::default()
            }
        }
    }

    /// Log a failed API call and queue `message` for the shopper.
    pub async fn report(&self, error: &ClientError, message: &str) {
        tracing::warn!(error = %error, "{message}");
        self.flash.error(message).await;
    }

    /// Page chrome. Loads the cart for the header badge.
    pub async fn layout(&self) -> Layout {
        let count = self.cart().await.count();
        self.layout_with_count(count).await
    }

    /// Page chrome when the cart count is already known. Drains the flash
    /// queue, so call it after every other request to the API.
    pub async fn layout_with_count(&self, cart_count: usize) -> Layout {
        Layout {
            user: self.user.clone(),
            cart_count,
            flash: self.flash.take().await,
        }
    }
}

impl FromRequestParts<AppState> for Shopper {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer missing".to_string()))?;

        let (user, token) = match auth::signed_in(&session, state.identity()).await {
            Some((user, token)) => (Some(user), Some(token)),
            None => (None, None),
        };
        let api = state.api_with(token.clone());

        Ok(Self {
            user,
            guest: GuestSession::load(session.clone()).await?,
            flash: Flash::new(session),
            token,
            api,
        })
    }
}
