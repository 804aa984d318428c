//! Product repository.
//!
//! Product reads always join the category so payloads carry
//! `{id, name, image}` of the owning category.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use spice_hub_core::models::{CategoryRef, NewProduct, Product, ProductQuery, ProductUpdate};
use spice_hub_core::{CategoryId, ProductId};

use super::RepositoryError;

/// Selected product columns. Pair with [`PRODUCT_JOIN`].
pub(crate) const PRODUCT_COLUMNS: &str = "p.id AS product_id, p.name AS product_name, \
     p.price, p.original_price, p.stock, p.rating, p.review_count, p.is_sale, p.is_new, \
     p.is_featured, p.containers, p.description, p.images, p.status, p.cost_per_item, \
     p.main_image, p.category_id, p.created_at AS product_created_at, \
     c.name AS category_name, c.image AS category_image";

pub(crate) const PRODUCT_JOIN: &str =
    "products p LEFT JOIN categories c ON c.id = p.category_id";

#[derive(sqlx::FromRow)]
pub(crate) struct ProductRow {
    product_id: ProductId,
    product_name: String,
    price: Decimal,
    original_price: Option<Decimal>,
    stock: i32,
    rating: f64,
    review_count: i32,
    is_sale: bool,
    is_new: bool,
    is_featured: bool,
    containers: Vec<String>,
    description: Option<String>,
    images: Vec<String>,
    status: String,
    cost_per_item: Option<Decimal>,
    main_image: Option<String>,
    category_id: CategoryId,
    product_created_at: DateTime<Utc>,
    category_name: Option<String>,
    category_image: Option<String>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let category = row.category_name.map(|name| CategoryRef {
            id: row.category_id,
            name,
            image: row.category_image,
        });
        Ok(Self {
            id: row.product_id,
            name: row.product_name,
            price: row.price,
            original_price: row.original_price,
            stock: row.stock,
            rating: row.rating,
            review_count: row.review_count,
            is_sale: row.is_sale,
            is_new: row.is_new,
            is_featured: row.is_featured,
            containers: row.containers,
            description: row.description,
            images: row.images,
            status: row.status.parse()?,
            cost_per_item: row.cost_per_item,
            main_image: row.main_image,
            category_id: row.category_id,
            category,
            created_at: row.product_created_at,
        })
    }
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List products matching `query`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, query: &ProductQuery) -> Result<Vec<Product>, RepositoryError> {
        let search = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM {PRODUCT_JOIN} \
             WHERE ($1::uuid IS NULL OR p.category_id = $1) \
               AND ($2::bool IS NULL OR p.is_featured = $2) \
               AND ($3::bool IS NULL OR p.is_sale = $3) \
               AND ($4::text IS NULL OR p.name ILIKE '%' || $4 || '%' \
                    OR p.description ILIKE '%' || $4 || '%') \
             ORDER BY p.created_at DESC"
        );
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(query.category_id)
            .bind(query.featured)
            .bind(query.on_sale)
            .bind(search)
            .fetch_all(self.pool)
            .await?;
        rows.into_iter().map(Product::try_from).collect()
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM {PRODUCT_JOIN} WHERE p.id = $1");
        sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .map(Product::try_from)
            .transpose()
    }

    /// Get a product by name, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_name(&self, name: &str) -> Result<Option<Product>, RepositoryError> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM {PRODUCT_JOIN} WHERE lower(p.name) = lower($1) LIMIT 1"
        );
        sqlx::query_as::<_, ProductRow>(&sql)
            .bind(name)
            .fetch_optional(self.pool)
            .await?
            .map(Product::try_from)
            .transpose()
    }

    /// Products with the given IDs, in no particular order. Unknown IDs are
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_ids(&self, ids: &[ProductId]) -> Result<Vec<Product>, RepositoryError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM {PRODUCT_JOIN} WHERE p.id = ANY($1)");
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(ids)
            .fetch_all(self.pool)
            .await?;
        rows.into_iter().map(Product::try_from).collect()
    }

    /// Whether a product with this ID exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, id: ProductId) -> Result<bool, RepositoryError> {
        let found: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM products WHERE id = $1)")
                .bind(id)
                .fetch_one(self.pool)
                .await?;
        Ok(found)
    }

    /// The first ID in `ids` that has no product, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn first_missing(&self, ids: &[ProductId]) -> Result<Option<ProductId>, RepositoryError> {
        let found: Vec<ProductId> = sqlx::query_scalar("SELECT id FROM products WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(self.pool)
            .await?;
        Ok(ids.iter().copied().find(|id| !found.contains(id)))
    }

    /// Create a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, product: &NewProduct) -> Result<Product, RepositoryError> {
        let id: ProductId = sqlx::query_scalar(
            "INSERT INTO products (name, price, original_price, stock, rating, review_count, \
                is_sale, is_new, is_featured, containers, description, images, status, \
                cost_per_item, main_image, category_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) \
             RETURNING id",
        )
        .bind(&product.name)
        .bind(product.price)
        .bind(product.original_price)
        .bind(product.stock)
        .bind(product.rating)
        .bind(product.review_count)
        .bind(product.is_sale)
        .bind(product.is_new)
        .bind(product.is_featured)
        .bind(&product.containers)
        .bind(&product.description)
        .bind(&product.images)
        .bind(product.status.as_str())
        .bind(product.cost_per_item)
        .bind(&product.main_image)
        .bind(product.category_id)
        .fetch_one(self.pool)
        .await?;
        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn update(
        &self,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<Product, RepositoryError> {
        let result = sqlx::query(
            "UPDATE products SET \
                name = COALESCE($2, name), \
                price = COALESCE($3, price), \
                original_price = COALESCE($4, original_price), \
                stock = COALESCE($5, stock), \
                is_sale = COALESCE($6, is_sale), \
                is_new = COALESCE($7, is_new), \
                is_featured = COALESCE($8, is_featured), \
                containers = COALESCE($9, containers), \
                description = COALESCE($10, description), \
                images = COALESCE($11, images), \
                status = COALESCE($12, status), \
                cost_per_item = COALESCE($13, cost_per_item), \
                main_image = COALESCE($14, main_image), \
                category_id = COALESCE($15, category_id) \
             WHERE id = $1",
        )
        .bind(id)
        .bind(&update.name)
        .bind(update.price)
        .bind(update.original_price)
        .bind(update.stock)
        .bind(update.is_sale)
        .bind(update.is_new)
        .bind(update.is_featured)
        .bind(&update.containers)
        .bind(&update.description)
        .bind(&update.images)
        .bind(update.status.map(|s| s.as_str()))
        .bind(update.cost_per_item)
        .bind(&update.main_image)
        .bind(update.category_id)
        .execute(self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Recompute `rating` and `review_count` from the product's reviews.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn refresh_rating(&self, id: ProductId) -> Result<(), RepositoryError> {
        sqlx::query(
            "UPDATE products SET \
                rating = COALESCE((SELECT AVG(rating) FROM reviews WHERE product_id = $1), 0), \
                review_count = (SELECT COUNT(*) FROM reviews WHERE product_id = $1) \
             WHERE id = $1",
        )
        .bind(id)
        .execute(self.pool)
        .await?;
        Ok(())
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
