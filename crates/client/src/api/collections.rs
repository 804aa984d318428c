//! Server-side carts and wishlists, keyed by the identity provider's
//! subject id.

use spice_hub_core::models::{
    Cart, CartItemUpdate, NewCart, NewCartItem, NewWishlist, NewWishlistItem, Wishlist,
};
use spice_hub_core::{CartId, CartItemId, WishlistId, WishlistItemId};

use super::ApiClient;
use crate::error::ClientError;

impl ApiClient {
    /// Get or create the cart of `cart.user_id` and merge `cart.items` into it.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotFound` if an item's product does not exist.
    pub async fn create_cart(&self, cart: &NewCart) -> Result<Cart, ClientError> {
        self.post("/carts/carts", cart).await
    }

    /// # Errors
    ///
    /// Returns `ClientError::NotFound` if the user has no cart yet.
    pub async fn get_user_cart(&self, user_id: &str) -> Result<Cart, ClientError> {
        self.get(&format!("/carts/carts/user/{user_id}")).await
    }

    /// Add a line, merging quantity into an existing line of the same product
    /// and container.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API rejects it.
    pub async fn add_cart_item(&self, cart_id: CartId, item: &NewCartItem) -> Result<Cart, ClientError> {
        self.post(&format!("/carts/carts/{cart_id}/items"), item)
            .await
    }

    /// # Errors
    ///
    /// Returns `ClientError::Api` with status 400 if the quantity is not positive.
    pub async fn update_cart_item(
        &self,
        item_id: CartItemId,
        update: &CartItemUpdate,
    ) -> Result<Cart, ClientError> {
        self.put(&format!("/carts/carts/items/{item_id}"), update)
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails or the item does not exist.
    pub async fn remove_cart_item(
        &self,
        cart_id: CartId,
        item_id: CartItemId,
    ) -> Result<Cart, ClientError> {
        self.delete(&format!("/carts/carts/{cart_id}/items/{item_id}"))
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails or the cart does not exist.
    pub async fn clear_cart(&self, cart_id: CartId) -> Result<Cart, ClientError> {
        self.delete(&format!("/carts/carts/{cart_id}/items")).await
    }

    /// Get or create the wishlist of `wishlist.user_id` and add its items.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotFound` if a product does not exist.
    pub async fn create_wishlist(&self, wishlist: &NewWishlist) -> Result<Wishlist, ClientError> {
        self.post("/wishlists/wishlists", wishlist).await
    }

    /// # Errors
    ///
    /// Returns `ClientError::NotFound` if the user has no wishlist yet.
    pub async fn get_user_wishlist(&self, user_id: &str) -> Result<Wishlist, ClientError> {
        self.get(&format!("/wishlists/wishlists/user/{user_id}"))
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails or the API rejects it.
    pub async fn add_wishlist_item(
        &self,
        wishlist_id: WishlistId,
        item: &NewWishlistItem,
    ) -> Result<Wishlist, ClientError> {
        self.post(&format!("/wishlists/wishlists/{wishlist_id}/items"), item)
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails or the item does not exist.
    pub async fn remove_wishlist_item(
        &self,
        wishlist_id: WishlistId,
        item_id: WishlistItemId,
    ) -> Result<Wishlist, ClientError> {
        self.delete(&format!(
            "/wishlists/wishlists/{wishlist_id}/items/{item_id}"
        ))
        .await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails or the wishlist does not exist.
    pub async fn clear_wishlist(&self, wishlist_id: WishlistId) -> Result<Wishlist, ClientError> {
        self.delete(&format!("/wishlists/wishlists/{wishlist_id}/items"))
            .await
    }
}
