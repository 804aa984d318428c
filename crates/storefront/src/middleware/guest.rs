//! Guest shopper state.
//!
//! A guest gets a [`GuestSessionId`] on first use. Their cart and wishlist
//! are kept in the session next to it until they sign in, when both are
//! merged into the server-side collections.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use spice_hub_client::{GuestCart, GuestWishlist};
use spice_hub_core::GuestSessionId;

use crate::error::AppError;
use crate::models::session_keys;

/// Guest id, cart, and wishlist of the current session.
pub struct GuestSession {
    pub id: GuestSessionId,
    pub cart: GuestCart,
    pub wishlist: GuestWishlist,
    session: Session,
}

impl GuestSession {
    /// Load the guest state, creating the guest id if the session has none.
    ///
    /// # Errors
    ///
    /// Returns an error if a new guest id cannot be stored.
    pub async fn load(session: Session) -> Result<Self, AppError> {
        let id = match session
            .get::<GuestSessionId>(session_keys::GUEST_SESSION)
            .await
            .ok()
            .flatten()
        {
            Some(id) => id,
            None => {
                let id = GuestSessionId::generate();
                session.insert(session_keys::GUEST_SESSION, id).await?;
                tracing::debug!(guest_session = %id, "Guest session started");
                id
            }
        };

        let cart = session
            .get::<GuestCart>(session_keys::GUEST_CART)
            .await
            .ok()
            .flatten()
            .unwrap_or_default();
        let wishlist = session
            .get::<GuestWishlist>(session_keys::GUEST_WISHLIST)
            .await
            .ok()
            .flatten()
            .unwrap_or_default();

        Ok(Self {
            id,
            cart,
            wishlist,
            session,
        })
    }

    /// Write the cart back to the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be modified.
    pub async fn save_cart(&self, cart: &GuestCart) -> Result<(), AppError> {
        self.session.insert(session_keys::GUEST_CART, cart).await?;
        Ok(())
    }

    /// Write the wishlist back to the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be modified.
    pub async fn save_wishlist(&self, wishlist: &GuestWishlist) -> Result<(), AppError> {
        self.session
            .insert(session_keys::GUEST_WISHLIST, wishlist)
            .await?;
        Ok(())
    }

    /// Drop the guest cart and wishlist after they were merged at login.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be modified.
    pub async fn clear(&self) -> Result<(), AppError> {
        self.session
            .remove::<GuestCart>(session_keys::GUEST_CART)
            .await?;
        self.session
            .remove::<GuestWishlist>(session_keys::GUEST_WISHLIST)
            .await?;
        Ok(())
    }
}

impl<S> FromRequestParts<S> for GuestSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer missing".to_string()))?;
        Self::load(session).await
    }
}
