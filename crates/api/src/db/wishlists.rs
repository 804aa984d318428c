//! Wishlist repository. A product appears at most once per wishlist.

use sqlx::PgPool;

use spice_hub_core::models::{Product, Wishlist, WishlistItem};
use spice_hub_core::{ProductId, WishlistId, WishlistItemId};

use super::RepositoryError;
use super::products::{PRODUCT_COLUMNS, ProductRow};

#[derive(sqlx::FromRow)]
struct WishlistRow {
    id: WishlistId,
    user_id: String,
}

#[derive(sqlx::FromRow)]
struct WishlistItemRow {
    item_id: WishlistItemId,
    #[sqlx(flatten)]
    product: ProductRow,
}

/// Repository for wishlist database operations.
pub struct WishlistRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> WishlistRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the wishlist owned by `user_id` (subject id).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_user(&self, user_id: &str) -> Result<Option<Wishlist>, RepositoryError> {
        let row = sqlx::query_as::<_, WishlistRow>(
            "SELECT id, user_id FROM wishlists WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(self.pool)
        .await?;
        match row {
            Some(row) => Ok(Some(self.load(row).await?)),
            None => Ok(None),
        }
    }

    /// Get a wishlist by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the wishlist does not exist.
    pub async fn get(&self, id: WishlistId) -> Result<Wishlist, RepositoryError> {
        let row =
            sqlx::query_as::<_, WishlistRow>("SELECT id, user_id FROM wishlists WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool)
                .await?
                .ok_or(RepositoryError::NotFound)?;
        self.load(row).await
    }

    /// Get the user's wishlist, creating an empty one if needed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_or_create(&self, user_id: &str) -> Result<WishlistId, RepositoryError> {
        let id: WishlistId = sqlx::query_scalar(
            "INSERT INTO wishlists (user_id) VALUES ($1) \
             ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id \
             RETURNING id",
        )
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;
        Ok(id)
    }

    /// Add a product unless it is already listed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn add_item(
        &self,
        wishlist_id: WishlistId,
        product_id: ProductId,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO wishlist_items (wishlist_id, product_id) VALUES ($1, $2) \
             ON CONFLICT (wishlist_id, product_id) DO NOTHING",
        )
        .bind(wishlist_id)
        .bind(product_id)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Remove one line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the line is not in the wishlist.
    pub async fn remove_item(
        &self,
        wishlist_id: WishlistId,
        item_id: WishlistItemId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM wishlist_items WHERE id = $1 AND wishlist_id = $2")
            .bind(item_id)
            .bind(wishlist_id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Remove every line.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear(&self, wishlist_id: WishlistId) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM wishlist_items WHERE wishlist_id = $1")
            .bind(wishlist_id)
            .execute(self.pool)
            .await?;
        Ok(())
    }

    async fn load(&self, row: WishlistRow) -> Result<Wishlist, RepositoryError> {
        let sql = format!(
            "SELECT wi.id AS item_id, {PRODUCT_COLUMNS} \
             FROM wishlist_items wi \
             JOIN products p ON p.id = wi.product_id \
             LEFT JOIN categories c ON c.id = p.category_id \
             WHERE wi.wishlist_id = $1 \
             ORDER BY wi.created_at, wi.id"
        );
        let items = sqlx::query_as::<_, WishlistItemRow>(&sql)
            .bind(row.id)
            .fetch_all(self.pool)
            .await?
            .into_iter()
            .map(|item| {
                let product = Product::try_from(item.product)?;
                Ok(WishlistItem {
                    id: item.item_id,
                    product_id: product.id,
                    product: product.summary(),
                })
            })
            .collect::<Result<_, RepositoryError>>()?;
        Ok(Wishlist {
            id: row.id,
            user_id: row.user_id,
            items,
        })
    }
}
