//! Time-boxed promotions.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{ProductId, SaleId, SaleProductId};

/// Product included in a sale at a fixed discounted price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleProduct {
    pub id: SaleProductId,
    pub product_id: ProductId,
    #[serde(with = "rust_decimal::serde::float")]
    pub discounted_price: Decimal,
    #[serde(default)]
    pub product: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub id: SaleId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub discount_percentage: Decimal,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub banner_image: Option<String>,
    #[serde(default)]
    pub banner_text: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub products: Vec<SaleProduct>,
}

impl Sale {
    /// Whether the sale is switched on and has not yet ended.
    #[must_use]
    pub fn is_running(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.end_date > now
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSaleProduct {
    pub product_id: ProductId,
    #[serde(with = "rust_decimal::serde::float")]
    pub discounted_price: Decimal,
}

/// Payload for `POST /sales/sales`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSale {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub discount_percentage: Decimal,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub banner_image: Option<String>,
    #[serde(default)]
    pub banner_text: Option<String>,
    #[serde(default)]
    pub products: Vec<NewSaleProduct>,
}

/// Payload for `PUT /sales/sales/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub discount_percentage: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner_text: Option<String>,
}
