//! Health bundle repository.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use spice_hub_core::models::{
    HealthCategory, HealthCategoryUpdate, HealthRecommendation, NewHealthCategory,
    NewHealthRecommendation,
};
use spice_hub_core::{HealthCategoryId, HealthRecommendationId, ProductId};

use super::RepositoryError;

const CATEGORY_COLUMNS: &str = "id, name, description, icon, benefits, usage, safety_notes, \
     is_active, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct HealthCategoryRow {
    id: HealthCategoryId,
    name: String,
    description: Option<String>,
    icon: Option<String>,
    benefits: Option<String>,
    usage: Option<String>,
    safety_notes: Option<String>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

#[derive(sqlx::FromRow)]
struct RecommendationRow {
    id: HealthRecommendationId,
    category_id: HealthCategoryId,
    product_id: ProductId,
    product_name: String,
    quantity: f64,
    unit: String,
    frequency: String,
}

/// Repository for health bundle database operations.
pub struct HealthRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> HealthRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List health categories by name, optionally only active ones.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, active_only: bool) -> Result<Vec<HealthCategory>, RepositoryError> {
        let sql = format!(
            "SELECT {CATEGORY_COLUMNS} FROM health_categories \
             WHERE ($1 = FALSE OR is_active) ORDER BY name"
        );
        let rows = sqlx::query_as::<_, HealthCategoryRow>(&sql)
            .bind(active_only)
            .fetch_all(self.pool)
            .await?;
        self.attach_recommendations(rows).await
    }

    /// Get a category with its recommendations.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: HealthCategoryId) -> Result<Option<HealthCategory>, RepositoryError> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM health_categories WHERE id = $1");
        let Some(row) = sqlx::query_as::<_, HealthCategoryRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
        else {
            return Ok(None);
        };
        Ok(self.attach_recommendations(vec![row]).await?.pop())
    }

    /// Get a category by exact name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_name(&self, name: &str) -> Result<Option<HealthCategory>, RepositoryError> {
        let id: Option<HealthCategoryId> =
            sqlx::query_scalar("SELECT id FROM health_categories WHERE name = $1 LIMIT 1")
                .bind(name)
                .fetch_optional(self.pool)
                .await?;
        match id {
            Some(id) => self.get(id).await,
            None => Ok(None),
        }
    }

    /// Create a category with its recommendations.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any insert fails.
    pub async fn create(&self, category: &NewHealthCategory) -> Result<HealthCategory, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let id: HealthCategoryId = sqlx::query_scalar(
            "INSERT INTO health_categories (name, description, icon, benefits, usage, \
                safety_notes, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
        )
        .bind(&category.name)
        .bind(&category.description)
        .bind(&category.icon)
        .bind(&category.benefits)
        .bind(&category.usage)
        .bind(&category.safety_notes)
        .bind(category.is_active)
        .fetch_one(&mut *tx)
        .await?;
        insert_recommendations(&mut tx, id, &category.recommendations).await?;
        tx.commit().await?;
        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Apply a partial update to the category's own fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category does not exist.
    pub async fn update(
        &self,
        id: HealthCategoryId,
        update: &HealthCategoryUpdate,
    ) -> Result<HealthCategory, RepositoryError> {
        let result = sqlx::query(
            "UPDATE health_categories SET \
                name = COALESCE($2, name), \
                description = COALESCE($3, description), \
                icon = COALESCE($4, icon), \
                benefits = COALESCE($5, benefits), \
                usage = COALESCE($6, usage), \
                safety_notes = COALESCE($7, safety_notes), \
                is_active = COALESCE($8, is_active), \
                updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(&update.name)
        .bind(&update.description)
        .bind(&update.icon)
        .bind(&update.benefits)
        .bind(&update.usage)
        .bind(&update.safety_notes)
        .bind(update.is_active)
        .execute(self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Replace all recommendations of a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn replace_recommendations(
        &self,
        id: HealthCategoryId,
        recommendations: &[NewHealthRecommendation],
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM health_recommendations WHERE category_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        insert_recommendations(&mut tx, id, recommendations).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Delete a category and its recommendations.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category does not exist.
    pub async fn delete(&self, id: HealthCategoryId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM health_categories WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn attach_recommendations(
        &self,
        rows: Vec<HealthCategoryRow>,
    ) -> Result<Vec<HealthCategory>, RepositoryError> {
        let ids: Vec<HealthCategoryId> = rows.iter().map(|r| r.id).collect();
        let recommendations = sqlx::query_as::<_, RecommendationRow>(
            "SELECT id, category_id, product_id, product_name, quantity, unit, frequency \
             FROM health_recommendations WHERE category_id = ANY($1) ORDER BY product_name",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut by_category: HashMap<HealthCategoryId, Vec<HealthRecommendation>> = HashMap::new();
        for rec in recommendations {
            by_category
                .entry(rec.category_id)
                .or_default()
                .push(HealthRecommendation {
                    id: rec.id,
                    category_id: rec.category_id,
                    product_id: rec.product_id,
                    product_name: rec.product_name,
                    quantity: rec.quantity,
                    unit: rec.unit,
                    frequency: rec.frequency,
                });
        }

        Ok(rows
            .into_iter()
            .map(|row| HealthCategory {
                recommendations: by_category.remove(&row.id).unwrap_or_default(),
                id: row.id,
                name: row.name,
                description: row.description,
                icon: row.icon,
                benefits: row.benefits,
                usage: row.usage,
                safety_notes: row.safety_notes,
                is_active: row.is_active,
                created_at: row.created_at,
                updated_at: row.updated_at,
            })
            .collect())
    }
}

async fn insert_recommendations(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    category_id: HealthCategoryId,
    recommendations: &[NewHealthRecommendation],
) -> Result<(), RepositoryError> {
    for rec in recommendations {
        sqlx::query(
            "INSERT INTO health_recommendations (category_id, product_id, product_name, \
                quantity, unit, frequency) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(category_id)
        .bind(rec.product_id)
        .bind(&rec.product_name)
        .bind(rec.quantity)
        .bind(&rec.unit)
        .bind(&rec.frequency)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}
