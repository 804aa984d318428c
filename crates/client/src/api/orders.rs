//! Orders, order items, dashboard aggregates, and invoices.

use spice_hub_core::analytics::{CategorySales, TopProduct};
use spice_hub_core::models::{Detail, NewOrder, Order, OrderItem, OrderItemUpdate, OrderUpdate};
use spice_hub_core::{OrderId, OrderItemId, UserId};

use super::ApiClient;
use crate::error::ClientError;

impl ApiClient {
    /// All orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list_orders(&self) -> Result<Vec<Order>, ClientError> {
        self.get("/orders/orders").await
    }

    /// # Errors
    ///
    /// Returns `ClientError::NotFound` if the order does not exist.
    pub async fn get_order(&self, id: OrderId) -> Result<Order, ClientError> {
        self.get(&format!("/orders/orders/{id}")).await
    }

    /// A user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn list_user_orders(&self, user_id: UserId) -> Result<Vec<Order>, ClientError> {
        self.get(&format!("/orders/orders/user/{user_id}")).await
    }

    /// # Errors
    ///
    /// Returns `ClientError::NotFound` if the user or a product does not exist.
    pub async fn create_order(&self, order: &NewOrder) -> Result<Order, ClientError> {
        self.post("/orders/orders", order).await
    }

    /// Change status, paid flag, or internal notes.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the order does not exist.
    pub async fn update_order(&self, id: OrderId, update: &OrderUpdate) -> Result<Order, ClientError> {
        self.put(&format!("/orders/orders/{id}"), update).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails or the order does not exist.
    pub async fn delete_order(&self, id: OrderId) -> Result<Detail, ClientError> {
        self.delete(&format!("/orders/orders/{id}")).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails or the item does not exist.
    pub async fn update_order_item(
        &self,
        item_id: OrderItemId,
        update: &OrderItemUpdate,
    ) -> Result<OrderItem, ClientError> {
        self.put(&format!("/orders/orders/items/{item_id}"), update)
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails or the item does not exist.
    pub async fn delete_order_item(&self, item_id: OrderItemId) -> Result<Detail, ClientError> {
        self.delete(&format!("/orders/orders/items/{item_id}"))
            .await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn top_products(&self) -> Result<Vec<TopProduct>, ClientError> {
        self.get("/orders/orders/items/topProducts").await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn category_sales(&self) -> Result<Vec<CategorySales>, ClientError> {
        self.get("/orders/orders/items/categorySales").await
    }

    /// Plain-text invoice of an order.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::NotFound` if the order does not exist.
    pub async fn order_invoice(&self, id: OrderId) -> Result<String, ClientError> {
        self.get_text(&format!("/orders/orders/{id}/invoice")).await
    }
}
