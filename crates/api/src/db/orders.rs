//! Order repository.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use spice_hub_core::models::{NewOrder, Order, OrderItem, OrderItemUpdate, OrderUpdate};
use spice_hub_core::{OrderId, OrderItemId, ProductId, UserId};

use super::RepositoryError;

const ORDER_COLUMNS: &str = "id, user_id, status, total_amount, shipping_method, city, area, \
     address, phone_number, apartment, pay_on_delivery, paid, mpesa_code, additional_note, \
     internal_notes, created_at";

const ITEM_COLUMNS: &str = "id, order_id, product_id, container, name, image, quantity, price";

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    user_id: UserId,
    status: String,
    total_amount: Decimal,
    shipping_method: String,
    city: String,
    area: String,
    address: String,
    phone_number: String,
    apartment: String,
    pay_on_delivery: bool,
    paid: bool,
    mpesa_code: Option<String>,
    additional_note: Option<String>,
    internal_notes: Option<Vec<String>>,
    created_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Result<Order, RepositoryError> {
        Ok(Order {
            id: self.id,
            user_id: self.user_id,
            status: self.status.parse()?,
            total_amount: self.total_amount,
            shipping_method: self.shipping_method.parse()?,
            city: self.city,
            area: self.area,
            address: self.address,
            phone_number: self.phone_number,
            apartment: self.apartment,
            pay_on_delivery: self.pay_on_delivery,
            paid: self.paid,
            mpesa_code: self.mpesa_code,
            additional_note: self.additional_note,
            internal_notes: self.internal_notes,
            created_at: self.created_at,
            items,
        })
    }
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    id: OrderItemId,
    order_id: OrderId,
    product_id: ProductId,
    container: Option<String>,
    name: Option<String>,
    image: Option<String>,
    quantity: i32,
    price: Decimal,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        Self {
            id: row.id,
            product_id: row.product_id,
            container: row.container,
            name: row.name,
            image: row.image,
            quantity: row.quantity,
            price: row.price,
        }
    }
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All orders with their items, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Order>, RepositoryError> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC");
        let rows = sqlx::query_as::<_, OrderRow>(&sql)
            .fetch_all(self.pool)
            .await?;
        self.attach_items(rows).await
    }

    /// A user's orders with their items, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Order>, RepositoryError> {
        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC"
        );
        let rows = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(user_id)
            .fetch_all(self.pool)
            .await?;
        self.attach_items(rows).await
    }

    /// Get an order with its items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1");
        let Some(row) = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
        else {
            return Ok(None);
        };
        Ok(self.attach_items(vec![row]).await?.pop())
    }

    /// Store an order and its items in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any insert fails.
    pub async fn create(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let id: OrderId = sqlx::query_scalar(
            "INSERT INTO orders (user_id, status, total_amount, shipping_method, city, area, \
                address, phone_number, apartment, pay_on_delivery, paid, mpesa_code, \
                additional_note, internal_notes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             RETURNING id",
        )
        .bind(order.user_id)
        .bind(order.status.as_str())
        .bind(order.total_amount)
        .bind(order.shipping_method.as_str())
        .bind(&order.city)
        .bind(&order.area)
        .bind(&order.address)
        .bind(&order.phone_number)
        .bind(&order.apartment)
        .bind(order.pay_on_delivery)
        .bind(order.paid)
        .bind(&order.mpesa_code)
        .bind(&order.additional_note)
        .bind(&order.internal_notes)
        .fetch_one(&mut *tx)
        .await?;

        for item in &order.items {
            sqlx::query(
                "INSERT INTO order_items (order_id, product_id, container, name, image, \
                    quantity, price) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(id)
            .bind(item.product_id)
            .bind(&item.container)
            .bind(&item.name)
            .bind(&item.image)
            .bind(item.quantity)
            .bind(item.price)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Apply a partial update to status, payment flag, or internal notes.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    pub async fn update(&self, id: OrderId, update: &OrderUpdate) -> Result<Order, RepositoryError> {
        let result = sqlx::query(
            "UPDATE orders SET \
                status = COALESCE($2, status), \
                paid = COALESCE($3, paid), \
                internal_notes = COALESCE($4, internal_notes) \
             WHERE id = $1",
        )
        .bind(id)
        .bind(update.status.map(|s| s.as_str()))
        .bind(update.paid)
        .bind(&update.internal_notes)
        .execute(self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Delete an order; its items go with it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order does not exist.
    pub async fn delete(&self, id: OrderId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Set quantity, container, and price of one item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item does not exist.
    pub async fn update_item(
        &self,
        item_id: OrderItemId,
        update: &OrderItemUpdate,
    ) -> Result<OrderItem, RepositoryError> {
        let sql = format!(
            "UPDATE order_items SET quantity = $2, container = $3, price = $4 \
             WHERE id = $1 RETURNING {ITEM_COLUMNS}"
        );
        let row = sqlx::query_as::<_, OrderItemRow>(&sql)
            .bind(item_id)
            .bind(update.quantity)
            .bind(&update.container)
            .bind(update.price)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        Ok(row.into())
    }

    /// Delete one item.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the item does not exist.
    pub async fn delete_item(&self, item_id: OrderItemId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM order_items WHERE id = $1")
            .bind(item_id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn attach_items(&self, rows: Vec<OrderRow>) -> Result<Vec<Order>, RepositoryError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<OrderId> = rows.iter().map(|r| r.id).collect();
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = ANY($1) \
             ORDER BY created_at, id"
        );
        let items = sqlx::query_as::<_, OrderItemRow>(&sql)
            .bind(&ids)
            .fetch_all(self.pool)
            .await?;

        let mut by_order: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
        for item in items {
            by_order.entry(item.order_id).or_default().push(item.into());
        }

        rows.into_iter()
            .map(|row| {
                let items = by_order.remove(&row.id).unwrap_or_default();
                row.into_order(items)
            })
            .collect()
    }
}
