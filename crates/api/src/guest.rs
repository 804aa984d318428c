//! In-memory carts and wishlists of unauthenticated shoppers.
//!
//! Entries live in `moka` caches keyed by [`GuestSessionId`] and expire after
//! the configured idle time. Nothing here touches the database; handlers
//! enrich the stored product ids with current product data on read.

use std::time::Duration;

use moka::Entry;
use moka::future::Cache;

use spice_hub_core::{GuestSessionId, ProductId};

const MAX_GUEST_SESSIONS: u64 = 10_000;

/// One line of a guest cart as stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuestLine {
    pub product_id: ProductId,
    pub container: Option<String>,
    pub quantity: i32,
}

impl GuestLine {
    fn matches(&self, product_id: ProductId, container: Option<&str>) -> bool {
        self.product_id == product_id && self.container.as_deref() == container
    }
}

/// Guest carts and wishlists with idle expiry.
#[derive(Clone)]
pub struct GuestStore {
    carts: Cache<GuestSessionId, Vec<GuestLine>>,
    wishlists: Cache<GuestSessionId, Vec<ProductId>>,
}

impl GuestStore {
    /// Create a store whose entries expire after `ttl` without access.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            carts: Cache::builder()
                .max_capacity(MAX_GUEST_SESSIONS)
                .time_to_idle(ttl)
                .build(),
            wishlists: Cache::builder()
                .max_capacity(MAX_GUEST_SESSIONS)
                .time_to_idle(ttl)
                .build(),
        }
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Lines of the guest cart, oldest first.
    pub async fn cart(&self, session: GuestSessionId) -> Vec<GuestLine> {
        self.carts.get(&session).await.unwrap_or_default()
    }

    /// Add `quantity` of a product, merging with a line of the same container.
    pub async fn add_to_cart(
        &self,
        session: GuestSessionId,
        product_id: ProductId,
        quantity: i32,
        container: Option<String>,
    ) -> Vec<GuestLine> {
        self.carts
            .entry(session)
            .and_upsert_with(|current| async move {
                let mut lines = current.map(Entry::into_value).unwrap_or_default();
                if let Some(line) = lines
                    .iter_mut()
                    .find(|l| l.matches(product_id, container.as_deref()))
                {
                    line.quantity = line.quantity.saturating_add(quantity);
                } else {
                    lines.push(GuestLine {
                        product_id,
                        container,
                        quantity,
                    });
                }
                lines
            })
            .await
            .into_value()
    }

    /// Set the quantity of an existing line. Returns `None` if there is no
    /// line for this product and container.
    pub async fn update_cart(
        &self,
        session: GuestSessionId,
        product_id: ProductId,
        quantity: i32,
        container: Option<&str>,
    ) -> Option<Vec<GuestLine>> {
        let mut lines = self.carts.get(&session).await?;
        let line = lines
            .iter_mut()
            .find(|l| l.matches(product_id, container))?;
        line.quantity = quantity;
        self.carts.insert(session, lines.clone()).await;
        Some(lines)
    }

    /// Remove every line of a product.
    pub async fn remove_from_cart(&self, session: GuestSessionId, product_id: ProductId) {
        let mut lines = self.cart(session).await;
        lines.retain(|l| l.product_id != product_id);
        self.carts.insert(session, lines).await;
    }

    pub async fn clear_cart(&self, session: GuestSessionId) {
        self.carts.invalidate(&session).await;
    }

    // =========================================================================
    // Wishlist
    // =========================================================================

    /// Product ids on the guest wishlist, oldest first.
    pub async fn wishlist(&self, session: GuestSessionId) -> Vec<ProductId> {
        self.wishlists.get(&session).await.unwrap_or_default()
    }

    /// Add a product unless it is already listed.
    pub async fn add_to_wishlist(&self, session: GuestSessionId, product_id: ProductId) -> Vec<ProductId> {
        self.wishlists
            .entry(session)
            .and_upsert_with(|current| async move {
                let mut ids = current.map(Entry::into_value).unwrap_or_default();
                if !ids.contains(&product_id) {
                    ids.push(product_id);
                }
                ids
            })
            .await
            .into_value()
    }

    pub async fn remove_from_wishlist(&self, session: GuestSessionId, product_id: ProductId) {
        let mut ids = self.wishlist(session).await;
        ids.retain(|id| *id != product_id);
        self.wishlists.insert(session, ids).await;
    }

    pub async fn clear_wishlist(&self, session: GuestSessionId) {
        self.wishlists.invalidate(&session).await;
    }
}
