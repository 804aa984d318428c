//! Filtering, sorting, and paging of product listings.
//!
//! Listings are small, so everything here runs over in-memory slices after
//! the products have been fetched.

use core::cmp::Ordering;
use core::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Product, Sale};

/// Upper bound of the price slider on the catalog page.
pub const MAX_PRICE_FILTER: i64 = 10_000;

/// Catalog filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductFilter {
    /// Category names to keep; empty keeps every category.
    pub categories: Vec<String>,
    pub min_price: Decimal,
    pub max_price: Decimal,
    /// Case-insensitive match against name and description.
    pub search: Option<String>,
    pub on_sale_only: bool,
}

impl Default for ProductFilter {
    fn default() -> Self {
        Self {
            categories: Vec::new(),
            min_price: Decimal::ZERO,
            max_price: Decimal::from(MAX_PRICE_FILTER),
            search: None,
            on_sale_only: false,
        }
    }
}

impl ProductFilter {
    #[must_use]
    pub fn matches(&self, product: &Product) -> bool {
        if self.on_sale_only && !product.is_sale {
            return false;
        }
        if product.price < self.min_price || product.price > self.max_price {
            return false;
        }
        if !self.categories.is_empty() {
            let Some(name) = product.category_name() else {
                return false;
            };
            if !self.categories.iter().any(|c| c.eq_ignore_ascii_case(name)) {
                return false;
            }
        }
        if let Some(query) = self.search.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let query = query.to_lowercase();
            let in_name = product.name.to_lowercase().contains(&query);
            let in_description = product
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&query));
            if !in_name && !in_description {
                return false;
            }
        }
        true
    }

    /// Products that pass the filter, in their original order.
    #[must_use]
    pub fn apply<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        products.iter().filter(|p| self.matches(p)).collect()
    }
}

/// Catalog sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProductSort {
    /// Keep the order the API returned.
    #[default]
    Featured,
    PriceLow,
    PriceHigh,
    Rating,
    Newest,
}

impl ProductSort {
    pub const ALL: &'static [Self] = &[
        Self::Featured,
        Self::PriceLow,
        Self::PriceHigh,
        Self::Rating,
        Self::Newest,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Featured => "featured",
            Self::PriceLow => "price-low",
            Self::PriceHigh => "price-high",
            Self::Rating => "rating",
            Self::Newest => "newest",
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Featured => "Featured",
            Self::PriceLow => "Price: Low to High",
            Self::PriceHigh => "Price: High to Low",
            Self::Rating => "Highest Rated",
            Self::Newest => "Newest",
        }
    }

    /// Sort in place. The sort is stable, so ties keep API order.
    pub fn sort(self, products: &mut [&Product]) {
        match self {
            Self::Featured => {}
            Self::PriceLow => products.sort_by(|a, b| a.price.cmp(&b.price)),
            Self::PriceHigh => products.sort_by(|a, b| b.price.cmp(&a.price)),
            Self::Rating => products.sort_by(|a, b| {
                b.rating.partial_cmp(&a.rating).unwrap_or(Ordering::Equal)
            }),
            Self::Newest => products.sort_by(|a, b| {
                b.is_new
                    .cmp(&a.is_new)
                    .then_with(|| b.created_at.cmp(&a.created_at))
            }),
        }
    }
}

impl FromStr for ProductSort {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|sort| sort.as_str() == s)
            .ok_or(())
    }
}

/// Sort order on the sale page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SaleSort {
    /// Biggest saving first.
    #[default]
    Discount,
    PriceLow,
    PriceHigh,
    Newest,
}

impl SaleSort {
    pub const ALL: &'static [Self] = &[Self::Discount, Self::PriceLow, Self::PriceHigh, Self::Newest];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Discount => "discount",
            Self::PriceLow => "price-low",
            Self::PriceHigh => "price-high",
            Self::Newest => "newest",
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Discount => "Biggest Discount",
            Self::PriceLow => "Price: Low to High",
            Self::PriceHigh => "Price: High to Low",
            Self::Newest => "Newest",
        }
    }

    pub fn sort(self, products: &mut [&Product]) {
        match self {
            Self::Discount => products.sort_by(|a, b| b.discount().cmp(&a.discount())),
            Self::PriceLow => products.sort_by(|a, b| a.price.cmp(&b.price)),
            Self::PriceHigh => products.sort_by(|a, b| b.price.cmp(&a.price)),
            Self::Newest => products.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        }
    }
}

impl FromStr for SaleSort {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|sort| sort.as_str() == s)
            .ok_or(())
    }
}

/// Sum of `originalPrice - price` across products that carry an original
/// price.
#[must_use]
pub fn total_savings(products: &[&Product]) -> Decimal {
    products
        .iter()
        .filter(|p| p.original_price.is_some())
        .map(|p| p.discount())
        .sum()
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number actually served.
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

impl<T> Page<T> {
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 1
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Slice `items` into 1-based pages of `per_page`.
///
/// Out-of-range pages clamp to the nearest valid page. An empty listing has
/// a single empty page.
#[must_use]
pub fn paginate<T>(items: Vec<T>, page: usize, per_page: usize) -> Page<T> {
    let per_page = per_page.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(per_page).max(1);
    let page = page.clamp(1, total_pages);
    let items = items
        .into_iter()
        .skip((page - 1) * per_page)
        .take(per_page)
        .collect();
    Page {
        items,
        page,
        total_pages,
        total_items,
    }
}

/// Time left until a sale ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Countdown {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
}

impl Countdown {
    /// Remaining time from `now` to `end`, zero once `end` has passed.
    #[must_use]
    pub fn until(end: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let remaining = (end - now).num_minutes().max(0);
        Self {
            days: remaining / (24 * 60),
            hours: (remaining / 60) % 24,
            minutes: remaining % 60,
        }
    }

    #[must_use]
    pub const fn is_over(&self) -> bool {
        self.days == 0 && self.hours == 0 && self.minutes == 0
    }
}

/// First sale that is switched on and has not ended.
#[must_use]
pub fn active_sale(sales: &[Sale], now: DateTime<Utc>) -> Option<&Sale> {
    sales.iter().find(|sale| sale.is_running(now))
}
