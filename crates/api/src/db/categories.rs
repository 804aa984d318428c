//! Category repository.

use sqlx::PgPool;

use spice_hub_core::CategoryId;
use spice_hub_core::models::{Category, CategoryUpdate, NewCategory, Product};

use super::products::{PRODUCT_COLUMNS, PRODUCT_JOIN, ProductRow};
use super::{RepositoryError, conflict_on_unique};

const CATEGORY_COLUMNS: &str = "id, name, is_featured, status, image, description";

const NAME_TAKEN: &str = "Category name already exists";

#[derive(sqlx::FromRow)]
struct CategoryRow {
    id: CategoryId,
    name: String,
    is_featured: bool,
    status: String,
    image: Option<String>,
    description: Option<String>,
}

impl TryFrom<CategoryRow> for Category {
    type Error = RepositoryError;

    fn try_from(row: CategoryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            name: row.name,
            is_featured: row.is_featured,
            status: row.status.parse()?,
            image: row.image,
            description: row.description,
            products: Vec::new(),
        })
    }
}

/// Repository for category database operations.
pub struct CategoryRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CategoryRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List categories by name. Product lists are left empty.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Category>, RepositoryError> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY name");
        let rows = sqlx::query_as::<_, CategoryRow>(&sql)
            .fetch_all(self.pool)
            .await?;
        rows.into_iter().map(Category::try_from).collect()
    }

    /// Get a category with summaries of its products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1");
        let Some(row) = sqlx::query_as::<_, CategoryRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
        else {
            return Ok(None);
        };
        let mut category = Category::try_from(row)?;

        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM {PRODUCT_JOIN} WHERE p.category_id = $1 ORDER BY p.name"
        );
        let products = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_all(self.pool)
            .await?;
        category.products = products
            .into_iter()
            .map(|row| Product::try_from(row).map(|p| p.summary()))
            .collect::<Result<_, _>>()?;
        Ok(Some(category))
    }

    /// Get a category by exact name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_name(&self, name: &str) -> Result<Option<Category>, RepositoryError> {
        let sql = format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE name = $1");
        sqlx::query_as::<_, CategoryRow>(&sql)
            .bind(name)
            .fetch_optional(self.pool)
            .await?
            .map(Category::try_from)
            .transpose()
    }

    /// Whether a category with this ID exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, id: CategoryId) -> Result<bool, RepositoryError> {
        let found: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM categories WHERE id = $1)")
                .bind(id)
                .fetch_one(self.pool)
                .await?;
        Ok(found)
    }

    /// Create a category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the name is taken.
    pub async fn create(&self, category: &NewCategory) -> Result<Category, RepositoryError> {
        let sql = format!(
            "INSERT INTO categories (name, is_featured, status, image, description) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {CATEGORY_COLUMNS}"
        );
        let row = sqlx::query_as::<_, CategoryRow>(&sql)
            .bind(&category.name)
            .bind(category.is_featured)
            .bind(category.status.as_str())
            .bind(&category.image)
            .bind(&category.description)
            .fetch_one(self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, NAME_TAKEN))?;
        Category::try_from(row)
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category does not exist and
    /// `RepositoryError::Conflict` if the new name is taken.
    pub async fn update(
        &self,
        id: CategoryId,
        update: &CategoryUpdate,
    ) -> Result<Category, RepositoryError> {
        let sql = format!(
            "UPDATE categories SET \
                name = COALESCE($2, name), \
                is_featured = COALESCE($3, is_featured), \
                status = COALESCE($4, status), \
                image = COALESCE($5, image), \
                description = COALESCE($6, description) \
             WHERE id = $1 RETURNING {CATEGORY_COLUMNS}"
        );
        let row = sqlx::query_as::<_, CategoryRow>(&sql)
            .bind(id)
            .bind(&update.name)
            .bind(update.is_featured)
            .bind(update.status.map(|s| s.as_str()))
            .bind(&update.image)
            .bind(&update.description)
            .fetch_optional(self.pool)
            .await
            .map_err(|e| conflict_on_unique(e, NAME_TAKEN))?
            .ok_or(RepositoryError::NotFound)?;
        Category::try_from(row)
    }

    /// Delete a category and its products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the category does not exist.
    pub async fn delete(&self, id: CategoryId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
