//! Cart repository.
//!
//! Carts are keyed by the identity provider's subject id. A line is unique
//! per `(product_id, container)`; adding the same pair again adds grams.

use sqlx::PgPool;

use spice_hub_core::models::{Cart, CartItem, CartItemUpdate, NewCartItem, Product};
use spice_hub_core::{CartId, CartItemId};

use super::RepositoryError;
use super::products::{PRODUCT_COLUMNS, ProductRow};

#[derive(sqlx::FromRow)]
struct CartRow {
    id: CartId,
    user_id: String,
}

#[derive(sqlx::FromRow)]
struct CartItemRow {
    item_id: CartItemId,
    container: Option<String>,
    quantity: i32,
    #[sqlx(flatten)]
    product: ProductRow,
}

impl TryFrom<CartItemRow> for CartItem {
    type Error = RepositoryError;

    fn try_from(row: CartItemRow) -> Result<Self, Self::Error> {
        let product = Product::try_from(row.product)?;
        Ok(Self {
            id: row.item_id,
            product_id: product.id,
            container: row.container,
            quantity: row.quantity,
            product: product.summary(),
        })
    }
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the cart owned by `user_id` (subject id).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_user(&self, user_id: &str) -> Result<Option<Cart>, RepositoryError> {
        let row = sqlx::query_as::<_, CartRow>("SELECT id, user_id FROM carts WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(self.pool)
            .await?;
        match row {
            Some(row) => Ok(Some(self.load(row).await?)),
            None => Ok(None),
        }
    }

    /// Get a cart by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the cart does not exist.
    pub async fn get(&self, id: CartId) -> Result<Cart, RepositoryError> {
        let row = sqlx::query_as::<_, CartRow>("SELECT id, user_id FROM carts WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        self.load(row).await
    }

    /// Get the user's cart, creating an empty one if needed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the user does not exist or the
    /// query fails.
    pub async fn get_or_create(&self, user_id: &str) -> Result<CartId, RepositoryError> {
        let id: CartId = sqlx::query_scalar(
            "INSERT INTO carts (user_id) VALUES ($1) \
             ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id \
             RETURNING id",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;
        Ok(id)
    }

    /// Add grams of a product, merging with an existing line of the same
    /// product and container.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn add_item(&self, cart_id: CartId, item: &NewCartItem) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let existing: Option<CartItemId> = sqlx::query_scalar(
            "SELECT id FROM cart_items \
             WHERE cart_id = $1 AND product_id = $2 AND container IS NOT DISTINCT FROM $3 \
             FOR UPDATE",
        )
        .bind(cart_id)
        .bind(item.product_id)
        .bind(&item.container)
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(item_id) = existing {
            sqlx::query("UPDATE cart_items SET quantity = quantity + $2 WHERE id = $1")
                .bind(item_id)
                .bind(item.quantity)
                .execute(&mut *tx)
                .await?;
        } else {
            sqlx::query(
                "INSERT INTO cart_items (cart_id, product_id, container, quantity) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(cart_id)
            .bind(item.product_id)
            .bind(&item.container)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Set a line's quantity and container. Returns the owning cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line does not exist.
    pub async fn update_item(
        &self,
        item_id: CartItemId,
        update: &CartItemUpdate,
    ) -> Result<Cart, RepositoryError> {
        let cart_id: CartId = sqlx::query_scalar(
            "UPDATE cart_items SET quantity = $2, container = $3 WHERE id = $1 RETURNING cart_id",
        )
        .bind(item_id)
        .bind(update.quantity)
        .bind(&update.container)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;
        self.get(cart_id).await
    }

    /// Remove one line from a cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line is not in the cart.
    pub async fn remove_item(
        &self,
        cart_id: CartId,
        item_id: CartItemId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE id = $1 AND cart_id = $2")
            .bind(item_id)
            .bind(cart_id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Remove every line from a cart.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear(&self, cart_id: CartId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM cart_items WHERE cart_id = $1")
            .bind(cart_id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    async fn load(&self, row: CartRow) -> Result<Cart, RepositoryError> {
        let sql = format!(
            "SELECT ci.id AS item_id, ci.container, ci.quantity, {PRODUCT_COLUMNS} \
             FROM cart_items ci \
             JOIN products p ON p.id = ci.product_id \
             LEFT JOIN categories c ON c.id = p.category_id \
             WHERE ci.cart_id = $1 \
             ORDER BY ci.created_at, ci.id"
        );
        let items = sqlx::query_as::<_, CartItemRow>(&sql)
            .bind(row.id)
            .fetch_all(self.pool)
            .await?
            .into_iter()
            .map(CartItem::try_from)
            .collect::<Result<_, _>>()?;
        Ok(Cart {
            id: row.id,
            user_id: row.user_id,
            items,
        })
    }
}
