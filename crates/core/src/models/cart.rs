//! Server-side carts and wishlists, plus the guest variants held by the API.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::catalog::ProductSummary;
use crate::types::{CartId, CartItemId, GuestSessionId, ProductId, WishlistId, WishlistItemId};

/// A line in a user's cart. `quantity` is in grams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: CartItemId,
    pub product_id: ProductId,
    #[serde(default)]
    pub container: Option<String>,
    pub quantity: i32,
    pub product: ProductSummary,
}

/// A user's cart. `user_id` is the identity provider's subject id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    pub id: CartId,
    pub user_id: String,
    #[serde(default)]
    pub items: Vec<CartItem>,
}

/// An item to put into a cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCartItem {
    pub product_id: ProductId,
    #[serde(default)]
    pub container: Option<String>,
    pub quantity: i32,
}

/// Payload for `POST /carts/carts`: get or create, then merge `items`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCart {
    pub user_id: String,
    #[serde(default)]
    pub items: Vec<NewCartItem>,
}

/// Payload for `PUT /carts/carts/items/{item_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItemUpdate {
    pub quantity: i32,
    #[serde(default)]
    pub container: Option<String>,
}

/// A line in a user's wishlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WishlistItem {
    pub id: WishlistItemId,
    pub product_id: ProductId,
    pub product: ProductSummary,
}

/// A user's wishlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wishlist {
    pub id: WishlistId,
    pub user_id: String,
    #[serde(default)]
    pub items: Vec<WishlistItem>,
}

impl Wishlist {
    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.items.iter().any(|item| item.product_id == product_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewWishlistItem {
    pub product_id: ProductId,
}

/// Payload for `POST /wishlists/wishlists`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewWishlist {
    pub user_id: String,
    #[serde(default)]
    pub items: Vec<NewWishlistItem>,
}

/// A guest cart line enriched with the current product data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuestCartItem {
    pub product_id: ProductId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default)]
    pub main_image: Option<String>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(rename = "reviewCount", default)]
    pub review_count: Option<i32>,
    #[serde(rename = "isSale", default)]
    pub is_sale: Option<bool>,
    #[serde(rename = "isNew", default)]
    pub is_new: Option<bool>,
    #[serde(default)]
    pub container: Option<String>,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuestCart {
    pub session_id: GuestSessionId,
    pub items: Vec<GuestCartItem>,
}

/// Body of `POST /guest/guest-cart/add` and `PUT /guest/guest-cart/update`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestCartLine {
    pub session_id: GuestSessionId,
    pub product_id: ProductId,
    pub quantity: i32,
    #[serde(default)]
    pub container: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuestWishlist {
    pub session_id: GuestSessionId,
    pub items: Vec<ProductSummary>,
}

/// Body of `POST /guest/guest-wishlist/add`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestWishlistAdd {
    pub session_id: GuestSessionId,
    pub product_id: ProductId,
}

/// Body of `POST /guest/guest-wishlist/merge`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestWishlistMerge {
    pub session_id: GuestSessionId,
    pub user_id: String,
}
