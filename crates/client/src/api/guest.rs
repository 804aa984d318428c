//! Server-held guest carts and wishlists.

use spice_hub_core::models::{
    Detail, GuestCart, GuestCartLine, GuestWishlist, GuestWishlistAdd, GuestWishlistMerge,
    Wishlist,
};
use spice_hub_core::{GuestSessionId, ProductId};

use super::ApiClient;
use crate::error::ClientError;

impl ApiClient {
    /// # Errors
    ///
    /// Returns `ClientError::NotFound` if the product does not exist.
    pub async fn guest_cart_add(&self, line: &GuestCartLine) -> Result<GuestCart, ClientError> {
        self.post("/guest/guest-cart/add", line).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn guest_cart(&self, session_id: GuestSessionId) -> Result<GuestCart, ClientError> {
        self.get(&format!("/guest/guest-cart/{session_id}")).await
    }

    /// # Errors
    ///
    /// Returns `ClientError::NotFound` if the line is not in the cart.
    pub async fn guest_cart_update(&self, line: &GuestCartLine) -> Result<GuestCart, ClientError> {
        self.put("/guest/guest-cart/update", line).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn guest_cart_remove(
        &self,
        session_id: GuestSessionId,
        product_id: ProductId,
    ) -> Result<Detail, ClientError> {
        self.delete(&format!("/guest/guest-cart/{session_id}/{product_id}"))
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn guest_cart_clear(&self, session_id: GuestSessionId) -> Result<Detail, ClientError> {
        self.delete(&format!("/guest/guest-cart/{session_id}")).await
    }

    /// # Errors
    ///
    /// Returns `ClientError::NotFound` if the product does not exist.
    pub async fn guest_wishlist_add(&self, add: &GuestWishlistAdd) -> Result<GuestWishlist, ClientError> {
        self.post("/guest/guest-wishlist/add", add).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn guest_wishlist(&self, session_id: GuestSessionId) -> Result<GuestWishlist, ClientError> {
        self.get(&format!("/guest/guest-wishlist/{session_id}"))
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn guest_wishlist_remove(
        &self,
        session_id: GuestSessionId,
        product_id: ProductId,
    ) -> Result<Detail, ClientError> {
        self.delete(&format!("/guest/guest-wishlist/{session_id}/{product_id}"))
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn guest_wishlist_clear(&self, session_id: GuestSessionId) -> Result<Detail, ClientError> {
        self.delete(&format!("/guest/guest-wishlist/{session_id}"))
            .await
    }

    /// Move a guest wishlist into the user's wishlist.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn guest_wishlist_merge(&self, merge: &GuestWishlistMerge) -> Result<Wishlist, ClientError> {
        self.post("/guest/guest-wishlist/merge", merge).await
    }
}
