//! Carts and wishlists of shoppers who have not signed in.
//!
//! Both are plain serialisable values held by the caller (the storefront
//! keeps them in the browser session) and merged into the server-side
//! collections at login.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use spice_hub_core::ProductId;
use spice_hub_core::models::{NewCartItem, NewWishlistItem, ProductSummary};
use spice_hub_core::pricing;

/// Container name used in line ids when none was chosen.
const NO_CONTAINER: &str = "default";

/// One line of a guest cart. `quantity` is in grams.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuestCartEntry {
    /// Temporary id, `guest-{product_id}-{container}`.
    pub id: String,
    pub product: ProductSummary,
    #[serde(default)]
    pub container: Option<String>,
    pub quantity: i32,
}

impl GuestCartEntry {
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        pricing::line_total(self.product.price, self.quantity)
    }
}

/// Local cart of a guest shopper.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GuestCart {
    #[serde(default)]
    lines: Vec<GuestCartEntry>,
}

impl GuestCart {
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Line id for a product and container.
    #[must_use]
    pub fn line_id(product_id: ProductId, container: Option<&str>) -> String {
        format!("guest-{product_id}-{}", container.unwrap_or(NO_CONTAINER))
    }

    /// Add `quantity` grams, merging into the line of the same product and
    /// container. Non-positive quantities are ignored.
    pub fn add(&mut self, product: ProductSummary, quantity: i32, container: Option<String>) {
        if quantity <= 0 {
            return;
        }
        let id = Self::line_id(product.id, container.as_deref());
        if let Some(line) = self.lines.iter_mut().find(|l| l.id == id) {
            line.quantity = line.quantity.saturating_add(quantity);
            line.product = product;
            return;
        }
        self.lines.push(GuestCartEntry {
            id,
            product,
            container,
            quantity,
        });
    }

    /// Set a line's quantity. Zero or less removes the line.
    pub fn update_quantity(&mut self, line_id: &str, quantity: i32) {
        if quantity <= 0 {
            self.remove(line_id);
            return;
        }
        if let Some(line) = self.lines.iter_mut().find(|l| l.id == line_id) {
            line.quantity = quantity;
        }
    }

    pub fn remove(&mut self, line_id: &str) {
        self.lines.retain(|l| l.id != line_id);
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    #[must_use]
    pub fn lines(&self) -> &[GuestCartEntry] {
        &self.lines
    }

    /// Number of lines, not grams.
    #[must_use]
    pub fn count(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        pricing::subtotal(self.lines.iter().map(|l| (l.product.price, l.quantity)))
    }

    /// Lines as items for `POST /carts/carts`.
    #[must_use]
    pub fn to_cart_items(&self) -> Vec<NewCartItem> {
        self.lines
            .iter()
            .map(|l| NewCartItem {
                product_id: l.product.id,
                container: l.container.clone(),
                quantity: l.quantity,
            })
            .collect()
    }
}

/// Local wishlist of a guest shopper.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GuestWishlist {
    #[serde(default)]
    items: Vec<ProductSummary>,
}

impl GuestWishlist {
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Add a product unless it is already listed.
    pub fn add(&mut self, product: ProductSummary) {
        if !self.contains(product.id) {
            self.items.push(product);
        }
    }

    pub fn remove(&mut self, product_id: ProductId) {
        self.items.retain(|p| p.id != product_id);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.items.iter().any(|p| p.id == product_id)
    }

    #[must_use]
    pub fn items(&self) -> &[ProductSummary] {
        &self.items
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items for `POST /wishlists/wishlists`.
    #[must_use]
    pub fn to_wishlist_items(&self) -> Vec<NewWishlistItem> {
        self.items
            .iter()
            .map(|p| NewWishlistItem { product_id: p.id })
            .collect()
    }
}
