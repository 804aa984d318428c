//! Review repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use spice_hub_core::models::{NewReview, Review, ReviewUpdate, ReviewedProduct, UserSummary};
use spice_hub_core::{ProductId, ReviewId, UserId};

use super::RepositoryError;

const REVIEW_SELECT: &str = "SELECT r.id, r.product_id, r.user_id, r.rating, r.comment, \
     r.created_at, u.first_name, u.last_name, p.name AS product_name \
     FROM reviews r \
     LEFT JOIN users u ON u.id = r.user_id \
     LEFT JOIN products p ON p.id = r.product_id";

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: ReviewId,
    product_id: ProductId,
    user_id: UserId,
    rating: f64,
    comment: Option<String>,
    created_at: DateTime<Utc>,
    first_name: Option<String>,
    last_name: Option<String>,
    product_name: Option<String>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Self {
            id: row.id,
            product_id: row.product_id,
            user_id: row.user_id,
            rating: row.rating,
            comment: row.comment,
            created_at: row.created_at,
            user: Some(UserSummary {
                id: row.user_id,
                first_name: row.first_name,
                last_name: row.last_name,
            }),
            product: row.product_name.map(|name| ReviewedProduct {
                id: row.product_id,
                name,
            }),
        }
    }
}

/// Repository for review database operations.
pub struct ReviewRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReviewRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All reviews, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Review>, RepositoryError> {
        let sql = format!("{REVIEW_SELECT} ORDER BY r.created_at DESC");
        let rows = sqlx::query_as::<_, ReviewRow>(&sql)
            .fetch_all(self.pool)
            .await?;
        Ok(rows.into_iter().map(Review::from).collect())
    }

    /// Reviews of one product, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_product(&self, product_id: ProductId) -> Result<Vec<Review>, RepositoryError> {
        let sql = format!("{REVIEW_SELECT} WHERE r.product_id = $1 ORDER BY r.created_at DESC");
        let rows = sqlx::query_as::<_, ReviewRow>(&sql)
            .bind(product_id)
            .fetch_all(self.pool)
            .await?;
        Ok(rows.into_iter().map(Review::from).collect())
    }

    /// Reviews written by one user, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_user(&self, user_id: UserId) -> Result<Vec<Review>, RepositoryError> {
        let sql = format!("{REVIEW_SELECT} WHERE r.user_id = $1 ORDER BY r.created_at DESC");
        let rows = sqlx::query_as::<_, ReviewRow>(&sql)
            .bind(user_id)
            .fetch_all(self.pool)
            .await?;
        Ok(rows.into_iter().map(Review::from).collect())
    }

    /// Get a review by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ReviewId) -> Result<Option<Review>, RepositoryError> {
        let sql = format!("{REVIEW_SELECT} WHERE r.id = $1");
        let row = sqlx::query_as::<_, ReviewRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(row.map(Review::from))
    }

    /// Create a review.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, review: &NewReview) -> Result<Review, RepositoryError> {
        let id: ReviewId = sqlx::query_scalar(
            "INSERT INTO reviews (product_id, user_id, rating, comment) \
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(review.product_id)
        .bind(review.user_id)
        .bind(review.rating)
        .bind(&review.comment)
        .fetch_one(self.pool)
        .await?;
        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review does not exist.
    pub async fn update(&self, id: ReviewId, update: &ReviewUpdate) -> Result<Review, RepositoryError> {
        let result = sqlx::query(
            "UPDATE reviews SET rating = COALESCE($2, rating), comment = COALESCE($3, comment) \
             WHERE id = $1",
        )
        .bind(id)
        .bind(update.rating)
        .bind(&update.comment)
        .execute(self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Delete a review, returning the product it belonged to.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the review does not exist.
    pub async fn delete(&self, id: ReviewId) -> Result<ProductId, RepositoryError> {
        sqlx::query_scalar("DELETE FROM reviews WHERE id = $1 RETURNING product_id")
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }
}
