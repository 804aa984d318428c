//! Cart and wishlist state holders.
//!
//! A store works either on a local guest collection or on the signed-in
//! user's server-side collection. After every server mutation the store
//! re-fetches the collection; it never patches its copy optimistically.

use rust_decimal::Decimal;

use spice_hub_core::models::{
    Cart, CartItemUpdate, NewCart, NewCartItem, NewWishlist, NewWishlistItem, ProductSummary,
    Wishlist,
};
use spice_hub_core::{CartItemId, ProductId, pricing};

use crate::api::ApiClient;
use crate::error::ClientError;
use crate::guest::{GuestCart, GuestWishlist};

/// A cart line in the shape pages render, whichever mode the store is in.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    /// Guest line id or server cart item id; pass back to
    /// [`CartStore::update_quantity`] and [`CartStore::remove`].
    pub key: String,
    pub product: ProductSummary,
    pub container: Option<String>,
    pub quantity: i32,
}

impl CartLine {
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        pricing::line_total(self.product.price, self.quantity)
    }
}

#[derive(Debug, Clone)]
enum CartMode {
    Guest(GuestCart),
    Authenticated { user_id: String, cart: Option<Cart> },
}

/// Cart state container.
#[derive(Debug, Clone)]
pub struct CartStore {
    api: ApiClient,
    mode: CartMode,
}

impl CartStore {
    /// Store over a guest's local cart.
    #[must_use]
    pub const fn guest(api: ApiClient, cart: GuestCart) -> Self {
        Self {
            api,
            mode: CartMode::Guest(cart),
        }
    }

    /// Store over the server cart of `user_id` (the identity subject id).
    ///
    /// Call [`refresh`](Self::refresh) to load the cart.
    #[must_use]
    pub fn authenticated(api: ApiClient, user_id: impl Into<String>) -> Self {
        Self {
            api,
            mode: CartMode::Authenticated {
                user_id: user_id.into(),
                cart: None,
            },
        }
    }

    #[must_use]
    pub const fn is_guest(&self) -> bool {
        matches!(self.mode, CartMode::Guest(_))
    }

    /// The guest cart, when in guest mode.
    #[must_use]
    pub const fn guest_cart(&self) -> Option<&GuestCart> {
        match &self.mode {
            CartMode::Guest(cart) => Some(cart),
            CartMode::Authenticated { .. } => None,
        }
    }

    /// The server cart, when loaded.
    #[must_use]
    pub const fn cart(&self) -> Option<&Cart> {
        match &self.mode {
            CartMode::Authenticated { cart, .. } => cart.as_ref(),
            CartMode::Guest(_) => None,
        }
    }

    /// Re-fetch the server cart. A user without a cart has an empty one.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        let CartMode::Authenticated { user_id, cart } = &mut self.mode else {
            return Ok(());
        };
        *cart = match self.api.get_user_cart(user_id).await {
            Ok(fetched) => Some(fetched),
            Err(ClientError::NotFound(_)) => None,
            Err(e) => return Err(e),
        };
        Ok(())
    }

    /// Add `quantity` grams of a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects the item or the request fails.
    pub async fn add_item(
        &mut self,
        product: ProductSummary,
        quantity: i32,
        container: Option<String>,
    ) -> Result<(), ClientError> {
        let (user_id, cart) = match &mut self.mode {
            CartMode::Guest(guest) => {
                guest.add(product, quantity, container);
                return Ok(());
            }
            CartMode::Authenticated { user_id, cart } => (user_id.clone(), cart.as_ref().map(|c| c.id)),
        };

        let item = NewCartItem {
            product_id: product.id,
            container,
            quantity,
        };
        match cart {
            Some(cart_id) => {
                self.api.add_cart_item(cart_id, &item).await?;
            }
            None => {
                self.api
                    .create_cart(&NewCart {
                        user_id,
                        items: vec![item],
                    })
                    .await?;
            }
        }
        self.refresh().await
    }

    /// Set a line's quantity; zero or less removes it.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Parse` if `key` is not a cart item id, or an
    /// error from the server.
    pub async fn update_quantity(&mut self, key: &str, quantity: i32) -> Result<(), ClientError> {
        if let CartMode::Guest(guest) = &mut self.mode {
            guest.update_quantity(key, quantity);
            return Ok(());
        }
        if quantity <= 0 {
            return self.remove(key).await;
        }

        let item_id = parse_item_id(key)?;
        let container = self
            .items()
            .into_iter()
            .find(|line| line.key == key)
            .and_then(|line| line.container);
        self.api
            .update_cart_item(item_id, &CartItemUpdate { quantity, container })
            .await?;
        self.refresh().await
    }

    /// Remove a line.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Parse` if `key` is not a cart item id, or an
    /// error from the server.
    pub async fn remove(&mut self, key: &str) -> Result<(), ClientError> {
        let cart_id = match &mut self.mode {
            CartMode::Guest(guest) => {
                guest.remove(key);
                return Ok(());
            }
            CartMode::Authenticated { cart: None, .. } => return Ok(()),
            CartMode::Authenticated {
                cart: Some(cart), ..
            } => cart.id,
        };
        let item_id = parse_item_id(key)?;
        self.api.remove_cart_item(cart_id, item_id).await?;
        self.refresh().await
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn clear(&mut self) -> Result<(), ClientError> {
        let cart_id = match &mut self.mode {
            CartMode::Guest(guest) => {
                guest.clear();
                return Ok(());
            }
            CartMode::Authenticated { cart: None, .. } => return Ok(()),
            CartMode::Authenticated {
                cart: Some(cart), ..
            } => cart.id,
        };
        self.api.clear_cart(cart_id).await?;
        self.refresh().await
    }

    /// Post every guest line to the user's cart, then empty `guest`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails; `guest` is left untouched.
    pub async fn merge_guest(&mut self, guest: &mut GuestCart) -> Result<(), ClientError> {
        let CartMode::Authenticated { user_id, .. } = &self.mode else {
            return Ok(());
        };
        if guest.is_empty() {
            return Ok(());
        }
        let merged = guest.count();
        self.api
            .create_cart(&NewCart {
                user_id: user_id.clone(),
                items: guest.to_cart_items(),
            })
            .await?;
        tracing::info!(user_id = %user_id, lines = merged, "Guest cart merged");
        guest.clear();
        self.refresh().await
    }

    /// Lines of the cart in display order.
    #[must_use]
    pub fn items(&self) -> Vec<CartLine> {
        match &self.mode {
            CartMode::Guest(guest) => guest
                .lines()
                .iter()
                .map(|l| CartLine {
                    key: l.id.clone(),
                    product: l.product.clone(),
                    container: l.container.clone(),
                    quantity: l.quantity,
                })
                .collect(),
            CartMode::Authenticated { cart, .. } => cart
                .iter()
                .flat_map(|c| &c.items)
                .map(|item| CartLine {
                    key: item.id.to_string(),
                    product: item.product.clone(),
                    container: item.container.clone(),
                    quantity: item.quantity,
                })
                .collect(),
        }
    }

    /// Number of lines, as shown on the header badge.
    #[must_use]
    pub fn count(&self) -> usize {
        match &self.mode {
            CartMode::Guest(guest) => guest.count(),
            CartMode::Authenticated { cart, .. } => cart.as_ref().map_or(0, |c| c.items.len()),
        }
    }

    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        pricing::subtotal(
            self.items()
                .iter()
                .map(|line| (line.product.price, line.quantity)),
        )
    }
}

fn parse_item_id(key: &str) -> Result<CartItemId, ClientError> {
    key.parse()
        .map_err(|_| ClientError::Parse(format!("Invalid cart item id: {key}")))
}

#[derive(Debug, Clone)]
enum WishlistMode {
    Guest(GuestWishlist),
    Authenticated {
        user_id: String,
        wishlist: Option<Wishlist>,
    },
}

/// Wishlist state container.
#[derive(Debug, Clone)]
pub struct WishlistStore {
    api: ApiClient,
    mode: WishlistMode,
}

impl WishlistStore {
    #[must_use]
    pub const fn guest(api: ApiClient, wishlist: GuestWishlist) -> Self {
        Self {
            api,
            mode: WishlistMode::Guest(wishlist),
        }
    }

    /// Store over the server wishlist of `user_id`.
    ///
    /// Call [`refresh`](Self::refresh) to load the wishlist.
    #[must_use]
    pub fn authenticated(api: ApiClient, user_id: impl Into<String>) -> Self {
        Self {
            api,
            mode: WishlistMode::Authenticated {
                user_id: user_id.into(),
                wishlist: None,
            },
        }
    }

    #[must_use]
    pub const fn guest_wishlist(&self) -> Option<&GuestWishlist> {
        match &self.mode {
            WishlistMode::Guest(wishlist) => Some(wishlist),
            WishlistMode::Authenticated { .. } => None,
        }
    }

    /// Re-fetch the server wishlist. A user without one has an empty one.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        let WishlistMode::Authenticated { user_id, wishlist } = &mut self.mode else {
            return Ok(());
        };
        *wishlist = match self.api.get_user_wishlist(user_id).await {
            Ok(fetched) => Some(fetched),
            Err(ClientError::NotFound(_)) => None,
            Err(e) => return Err(e),
        };
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn add(&mut self, product: ProductSummary) -> Result<(), ClientError> {
        let (user_id, wishlist_id) = match &mut self.mode {
            WishlistMode::Guest(guest) => {
                guest.add(product);
                return Ok(());
            }
            WishlistMode::Authenticated { user_id, wishlist } => {
                (user_id.clone(), wishlist.as_ref().map(|w| w.id))
            }
        };

        let item = NewWishlistItem {
            product_id: product.id,
        };
        match wishlist_id {
            Some(id) => {
                self.api.add_wishlist_item(id, &item).await?;
            }
            None => {
                self.api
                    .create_wishlist(&NewWishlist {
                        user_id,
                        items: vec![item],
                    })
                    .await?;
            }
        }
        self.refresh().await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn remove(&mut self, product_id: ProductId) -> Result<(), ClientError> {
        let target = match &mut self.mode {
            WishlistMode::Guest(guest) => {
                guest.remove(product_id);
                return Ok(());
            }
            WishlistMode::Authenticated { wishlist, .. } => wishlist.as_ref().and_then(|w| {
                w.items
                    .iter()
                    .find(|item| item.product_id == product_id)
                    .map(|item| (w.id, item.id))
            }),
        };
        let Some((wishlist_id, item_id)) = target else {
            return Ok(());
        };
        self.api.remove_wishlist_item(wishlist_id, item_id).await?;
        self.refresh().await
    }

    /// Add the product if absent, remove it if present. Returns whether the
    /// product is listed afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn toggle(&mut self, product: ProductSummary) -> Result<bool, ClientError> {
        if self.is_in_wishlist(product.id) {
            self.remove(product.id).await?;
            Ok(false)
        } else {
            self.add(product).await?;
            Ok(true)
        }
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn clear(&mut self) -> Result<(), ClientError> {
        let wishlist_id = match &mut self.mode {
            WishlistMode::Guest(guest) => {
                guest.clear();
                return Ok(());
            }
            WishlistMode::Authenticated { wishlist, .. } => wishlist.as_ref().map(|w| w.id),
        };
        let Some(id) = wishlist_id else {
            return Ok(());
        };
        self.api.clear_wishlist(id).await?;
        self.refresh().await
    }

    /// Add every guest item to the user's wishlist, then empty `guest`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails; `guest` is left untouched.
    pub async fn merge_guest(&mut self, guest: &mut GuestWishlist) -> Result<(), ClientError> {
        let WishlistMode::Authenticated { user_id, .. } = &self.mode else {
            return Ok(());
        };
        if guest.is_empty() {
            return Ok(());
        }
        self.api
            .create_wishlist(&NewWishlist {
                user_id: user_id.clone(),
                items: guest.to_wishlist_items(),
            })
            .await?;
        tracing::info!(user_id = %user_id, items = guest.count(), "Guest wishlist merged");
        guest.clear();
        self.refresh().await
    }

    #[must_use]
    pub fn is_in_wishlist(&self, product_id: ProductId) -> bool {
        match &self.mode {
            WishlistMode::Guest(guest) => guest.contains(product_id),
            WishlistMode::Authenticated { wishlist, .. } => {
                wishlist.as_ref().is_some_and(|w| w.contains(product_id))
            }
        }
    }

    /// Listed products in display order.
    #[must_use]
    pub fn items(&self) -> Vec<ProductSummary> {
        match &self.mode {
            WishlistMode::Guest(guest) => guest.items().to_vec(),
            WishlistMode::Authenticated { wishlist, .. } => wishlist
                .iter()
                .flat_map(|w| &w.items)
                .map(|item| item.product.clone())
                .collect(),
        }
    }

    #[must_use]
    pub fn count(&self) -> usize {
        match &self.mode {
            WishlistMode::Guest(guest) => guest.count(),
            WishlistMode::Authenticated { wishlist, .. } => {
                wishlist.as_ref().map_or(0, |w| w.items.len())
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::guest::tests::summary;

    fn api() -> ApiClient {
        ApiClient::new("http://127.0.0.1:9").unwrap()
    }

    #[tokio::test]
    async fn test_guest_cart_store_needs_no_server() {
        let mut store = CartStore::guest(api(), GuestCart::new());
        let pepper = summary("Black Pepper", 200);

        store.add_item(pepper.clone(), 100, None).await.unwrap();
        store.add_item(pepper.clone(), 100, None).await.unwrap();
        assert_eq!(store.count(), 1);
        assert_eq!(store.items()[0].quantity, 200);
        assert_eq!(store.subtotal(), Decimal::from(400));

        let key = store.items()[0].key.clone();
        store.update_quantity(&key, 0).await.unwrap();
        assert_eq!(store.count(), 0);
        assert!(store.guest_cart().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_guest_wishlist_toggle() {
        let mut store = WishlistStore::guest(api(), GuestWishlist::new());
        let saffron = summary("Saffron", 2500);

        assert!(store.toggle(saffron.clone()).await.unwrap());
        assert!(store.is_in_wishlist(saffron.id));
        assert!(!store.toggle(saffron.clone()).await.unwrap());
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_authenticated_store_starts_empty() {
        let store = CartStore::authenticated(api(), "sb-1");
        assert!(!store.is_guest());
        assert_eq!(store.count(), 0);
        assert!(store.items().is_empty());
    }

    #[test]
    fn test_parse_item_id_rejects_guest_keys() {
        assert!(matches!(
            parse_item_id("guest-abc-default"),
            Err(ClientError::Parse(_))
        ));
    }
}
