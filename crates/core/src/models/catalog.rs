//! Products and categories.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{CategoryId, ProductId, PublishStatus};

/// Category reference embedded in product payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// Product card data embedded in carts, wishlists, and category pages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default)]
    pub main_image: Option<String>,
    #[serde(default)]
    pub category: Option<CategoryRef>,
    #[serde(default)]
    pub rating: f64,
    #[serde(rename = "reviewCount", default)]
    pub review_count: i32,
    #[serde(rename = "isSale", default)]
    pub is_sale: bool,
    #[serde(rename = "isNew", default)]
    pub is_new: bool,
}

/// A spice product. `price` is per 100 g.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(
        rename = "originalPrice",
        default,
        with = "rust_decimal::serde::float_option"
    )]
    pub original_price: Option<Decimal>,
    pub stock: i32,
    #[serde(default)]
    pub rating: f64,
    #[serde(rename = "reviewCount", default)]
    pub review_count: i32,
    #[serde(rename = "isSale", default)]
    pub is_sale: bool,
    #[serde(rename = "isNew", default)]
    pub is_new: bool,
    #[serde(rename = "isFeatured", default)]
    pub is_featured: bool,
    #[serde(default)]
    pub containers: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub status: PublishStatus,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub cost_per_item: Option<Decimal>,
    #[serde(default)]
    pub main_image: Option<String>,
    pub category_id: CategoryId,
    #[serde(default)]
    pub category: Option<CategoryRef>,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Amount saved against the original price, if the product has one.
    #[must_use]
    pub fn discount(&self) -> Decimal {
        self.original_price
            .map_or(Decimal::ZERO, |original| original - self.price)
    }

    /// Name of the product's category, when loaded.
    #[must_use]
    pub fn category_name(&self) -> Option<&str> {
        self.category.as_ref().map(|c| c.name.as_str())
    }

    /// Image to show on product cards: `main_image`, else the first image.
    #[must_use]
    pub fn display_image(&self) -> Option<&str> {
        self.main_image
            .as_deref()
            .or_else(|| self.images.first().map(String::as_str))
    }

    /// URL-style slug of the product name, e.g. `black-pepper`.
    #[must_use]
    pub fn slug(&self) -> String {
        slugify(&self.name)
    }

    #[must_use]
    pub fn summary(&self) -> ProductSummary {
        ProductSummary {
            id: self.id,
            name: self.name.clone(),
            price: self.price,
            main_image: self.display_image().map(str::to_owned),
            category: self.category.clone(),
            rating: self.rating,
            review_count: self.review_count,
            is_sale: self.is_sale,
            is_new: self.is_new,
        }
    }
}

/// Lowercase a name and join its words with hyphens.
#[must_use]
pub fn slugify(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// Optional filters of `GET /products/products`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_sale: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

/// Payload for `POST /products/products`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(
        rename = "originalPrice",
        default,
        with = "rust_decimal::serde::float_option"
    )]
    pub original_price: Option<Decimal>,
    pub stock: i32,
    #[serde(default)]
    pub rating: f64,
    #[serde(rename = "reviewCount", default)]
    pub review_count: i32,
    #[serde(rename = "isSale", default)]
    pub is_sale: bool,
    #[serde(rename = "isNew", default)]
    pub is_new: bool,
    #[serde(rename = "isFeatured", default)]
    pub is_featured: bool,
    #[serde(default)]
    pub containers: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub status: PublishStatus,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub cost_per_item: Option<Decimal>,
    #[serde(default)]
    pub main_image: Option<String>,
    pub category_id: CategoryId,
}

/// Payload for `PUT /products/products/{id}`. Only supplied fields change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub price: Option<Decimal>,
    #[serde(
        rename = "originalPrice",
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub original_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<i32>,
    #[serde(rename = "isSale", default, skip_serializing_if = "Option::is_none")]
    pub is_sale: Option<bool>,
    #[serde(rename = "isNew", default, skip_serializing_if = "Option::is_none")]
    pub is_new: Option<bool>,
    #[serde(rename = "isFeatured", default, skip_serializing_if = "Option::is_none")]
    pub is_featured: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub containers: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PublishStatus>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub cost_per_item: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(rename = "isFeatured", default)]
    pub is_featured: bool,
    #[serde(default)]
    pub status: PublishStatus,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Populated on single-category reads.
    #[serde(default)]
    pub products: Vec<ProductSummary>,
}

/// Payload for `POST /category/categories`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
    #[serde(rename = "isFeatured", default)]
    pub is_featured: bool,
    #[serde(default)]
    pub status: PublishStatus,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Payload for `PUT /category/categories/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "isFeatured", default, skip_serializing_if = "Option::is_none")]
    pub is_featured: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PublishStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product_json() -> serde_json::Value {
        serde_json::json!({
            "id": "0b5b7f0e-8f0c-4d43-9a52-3f3c9d1e2a10",
            "name": "Black Pepper",
            "price": 350.0,
            "originalPrice": 420.0,
            "stock": 40,
            "isSale": true,
            "containers": ["jar", "pouch"],
            "images": ["/img/pepper.jpg"],
            "status": "Active",
            "category_id": "1c8d2a55-7e64-4b1b-8c6c-5a0f6a2e9b01",
            "created_at": "2025-01-10T08:00:00Z"
        })
    }

    #[test]
    fn test_product_deserializes_numbers() {
        let product: Product = serde_json::from_value(product_json()).unwrap();
        assert_eq!(product.price, Decimal::from(350));
        assert_eq!(product.discount(), Decimal::from(70));
        assert_eq!(product.status, PublishStatus::Active);
        assert!(product.cost_per_item.is_none());
    }

    #[test]
    fn test_product_price_serializes_as_number() {
        let product: Product = serde_json::from_value(product_json()).unwrap();
        let json = serde_json::to_value(&product).unwrap();
        assert!(json["price"].is_number());
        assert_eq!(json["isSale"], serde_json::json!(true));
    }

    #[test]
    fn test_display_image_falls_back_to_first_image() {
        let product: Product = serde_json::from_value(product_json()).unwrap();
        assert_eq!(product.display_image(), Some("/img/pepper.jpg"));
        assert_eq!(product.summary().main_image.as_deref(), Some("/img/pepper.jpg"));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Black  Pepper"), "black-pepper");
        assert_eq!(slugify("Garlic Powder"), "garlic-powder");
        assert_eq!(slugify("cumin"), "cumin");
    }
}
