//! Orders placed at checkout.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{
    OrderId, OrderItemId, OrderStatus, PaymentMethod, ProductId, ShippingMethod, UserId,
    grams_to_units,
};

/// A purchased line. `quantity` is grams and `price` is per 100 g at the
/// time of purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub product_id: ProductId,
    #[serde(default)]
    pub container: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    pub quantity: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

impl OrderItem {
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        grams_to_units(self.quantity) * self.price
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Item")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub status: OrderStatus,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    #[serde(default)]
    pub shipping_method: ShippingMethod,
    pub city: String,
    pub area: String,
    #[serde(default)]
    pub address: String,
    #[serde(rename = "phoneNumber")]
    pub phone_number: String,
    #[serde(default)]
    pub apartment: String,
    #[serde(rename = "payOnDelivery", default)]
    pub pay_on_delivery: bool,
    #[serde(default)]
    pub paid: bool,
    #[serde(rename = "mpesaCode", default)]
    pub mpesa_code: Option<String>,
    #[serde(rename = "additionalNote", default)]
    pub additional_note: Option<String>,
    #[serde(default)]
    pub internal_notes: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

impl Order {
    #[must_use]
    pub const fn payment_method(&self) -> PaymentMethod {
        PaymentMethod::from_pay_on_delivery(self.pay_on_delivery)
    }

    /// Short reference shown to shoppers, e.g. `#6F1C8A3E`.
    #[must_use]
    pub fn reference(&self) -> String {
        let id = self.id.to_string();
        let short: String = id.chars().take(8).collect();
        format!("#{}", short.to_uppercase())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    #[serde(default)]
    pub container: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    pub quantity: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

/// Payload for `POST /orders/orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    pub user_id: UserId,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    #[serde(default)]
    pub shipping_method: ShippingMethod,
    pub city: String,
    pub area: String,
    #[serde(default)]
    pub address: String,
    #[serde(rename = "phoneNumber")]
    pub phone_number: String,
    #[serde(default)]
    pub apartment: String,
    #[serde(rename = "payOnDelivery", default)]
    pub pay_on_delivery: bool,
    #[serde(default)]
    pub paid: bool,
    #[serde(rename = "mpesaCode", default)]
    pub mpesa_code: Option<String>,
    #[serde(rename = "additionalNote", default)]
    pub additional_note: Option<String>,
    #[serde(default)]
    pub internal_notes: Option<Vec<String>>,
    pub items: Vec<NewOrderItem>,
}

/// Payload for `PUT /orders/orders/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_notes: Option<Vec<String>>,
}

/// Payload for `PUT /orders/orders/items/{item_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItemUpdate {
    pub quantity: i32,
    #[serde(default)]
    pub container: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_order_from_wire() {
        let json = serde_json::json!({
            "id": "6f1c8a3e-2a4b-4c3d-9e8f-0a1b2c3d4e5f",
            "user_id": "1c8d2a55-7e64-4b1b-8c6c-5a0f6a2e9b01",
            "status": "pending",
            "total_amount": 1200.5,
            "city": "Nairobi",
            "area": "Westlands",
            "address": "Ring Road",
            "phoneNumber": "0712345678",
            "apartment": "B4",
            "payOnDelivery": true,
            "paid": false,
            "internal_notes": null,
            "created_at": "2025-04-02T09:30:00Z",
            "items": [{
                "id": "0b5b7f0e-8f0c-4d43-9a52-3f3c9d1e2a10",
                "product_id": "0b5b7f0e-8f0c-4d43-9a52-3f3c9d1e2a11",
                "name": "Turmeric",
                "quantity": 250,
                "price": 400.0
            }]
        });
        let order: Order = serde_json::from_value(json).unwrap();
        assert_eq!(order.shipping_method, ShippingMethod::Standard);
        assert_eq!(order.payment_method(), PaymentMethod::PayOnDelivery);
        assert_eq!(order.reference(), "#6F1C8A3E");
        assert_eq!(order.items[0].line_total(), Decimal::from(1000));
    }

    #[test]
    fn test_order_update_serializes_only_changes() {
        let update = OrderUpdate {
            status: Some(OrderStatus::Shipped),
            ..OrderUpdate::default()
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            serde_json::json!({ "status": "shipped" })
        );
    }
}
