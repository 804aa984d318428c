//! Meal kit repository.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use spice_hub_core::models::{Meal, MealItem, MealUpdate, NewMeal, NewMealItem};
use spice_hub_core::{MealId, MealItemId, ProductId};

use super::RepositoryError;

const MEAL_COLUMNS: &str =
    "id, name, description, image, serves, recipe, add_ons, is_active, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct MealRow {
    id: MealId,
    name: String,
    description: Option<String>,
    image: Option<String>,
    serves: i32,
    recipe: Option<String>,
    add_ons: Option<Vec<String>>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

#[derive(sqlx::FromRow)]
struct MealItemRow {
    id: MealItemId,
    meal_id: MealId,
    product_id: ProductId,
    product_name: String,
    quantity: f64,
    unit: String,
}

/// Repository for meal kit database operations.
pub struct MealRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> MealRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List meals by name, optionally only active ones.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, active_only: bool) -> Result<Vec<Meal>, RepositoryError> {
        let sql = format!(
            "SELECT {MEAL_COLUMNS} FROM meals WHERE ($1 = FALSE OR is_active) ORDER BY name"
        );
        let rows = sqlx::query_as::<_, MealRow>(&sql)
            .bind(active_only)
            .fetch_all(self.pool)
            .await?;
        self.attach_items(rows).await
    }

    /// Get a meal with its items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: MealId) -> Result<Option<Meal>, RepositoryError> {
        let sql = format!("SELECT {MEAL_COLUMNS} FROM meals WHERE id = $1");
        let Some(row) = sqlx::query_as::<_, MealRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
        else {
            return Ok(None);
        };
        Ok(self.attach_items(vec![row]).await?.pop())
    }

    /// Get a meal by exact name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_name(&self, name: &str) -> Result<Option<Meal>, RepositoryError> {
        let id: Option<MealId> = sqlx::query_scalar("SELECT id FROM meals WHERE name = $1 LIMIT 1")
            .bind(name)
            .fetch_optional(self.pool)
            .await?;
        match id {
            Some(id) => self.get(id).await,
            None => Ok(None),
        }
    }

    /// Create a meal with its items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any insert fails.
    pub async fn create(&self, meal: &NewMeal) -> Result<Meal, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let id: MealId = sqlx::query_scalar(
            "INSERT INTO meals (name, description, image, serves, recipe, add_ons, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
        )
        .bind(&meal.name)
        .bind(&meal.description)
        .bind(&meal.image)
        .bind(meal.serves)
        .bind(&meal.recipe)
        .bind(&meal.add_ons)
        .bind(meal.is_active)
        .fetch_one(&mut *tx)
        .await?;
        insert_items(&mut tx, id, &meal.items).await?;
        tx.commit().await?;
        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Apply a partial update to the meal's own fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the meal does not exist.
    pub async fn update(&self, id: MealId, update: &MealUpdate) -> Result<Meal, RepositoryError> {
        let result = sqlx::query(
            "UPDATE meals SET \
                name = COALESCE($2, name), \
                description = COALESCE($3, description), \
                image = COALESCE($4, image), \
                serves = COALESCE($5, serves), \
                recipe = COALESCE($6, recipe), \
                add_ons = COALESCE($7, add_ons), \
                is_active = COALESCE($8, is_active), \
                updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(&update.name)
        .bind(&update.description)
        .bind(&update.image)
        .bind(update.serves)
        .bind(&update.recipe)
        .bind(&update.add_ons)
        .bind(update.is_active)
        .execute(self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Replace all items of a meal.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn replace_items(&self, id: MealId, items: &[NewMealItem]) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM meal_items WHERE meal_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        insert_items(&mut tx, id, items).await?;
        tx.commit().await?;
        Ok(())
    }

    /// Delete a meal and its items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the meal does not exist.
    pub async fn delete(&self, id: MealId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM meals WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn attach_items(&self, rows: Vec<MealRow>) -> Result<Vec<Meal>, RepositoryError> {
        let ids: Vec<MealId> = rows.iter().map(|r| r.id).collect();
        let items = sqlx::query_as::<_, MealItemRow>(
            "SELECT id, meal_id, product_id, product_name, quantity, unit \
             FROM meal_items WHERE meal_id = ANY($1) ORDER BY product_name",
        )
        .bind(&ids)
        .fetch_all(self.pool)
        .await?;

        let mut by_meal: HashMap<MealId, Vec<MealItem>> = HashMap::new();
        for item in items {
            by_meal.entry(item.meal_id).or_default().push(MealItem {
                id: item.id,
                product_id: item.product_id,
                product_name: item.product_name,
                quantity: item.quantity,
                unit: item.unit,
            });
        }

        Ok(rows
            .into_iter()
            .map(|row| Meal {
                items: by_meal.remove(&row.id).unwrap_or_default(),
                id: row.id,
                name: row.name,
                description: row.description,
                image: row.image,
                serves: row.serves,
                recipe: row.recipe,
                add_ons: row.add_ons,
                is_active: row.is_active,
                created_at: row.created_at,
                updated_at: row.updated_at,
            })
            .collect())
    }
}

async fn insert_items(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    meal_id: MealId,
    items: &[NewMealItem],
) -> Result<(), RepositoryError> {
    for item in items {
        sqlx::query(
            "INSERT INTO meal_items (meal_id, product_id, product_name, quantity, unit) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(meal_id)
        .bind(item.product_id)
        .bind(&item.product_name)
        .bind(item.quantity)
        .bind(&item.unit)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}
