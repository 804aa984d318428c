//! Sale repository.
//!
//! A sale is "running" while `is_active` is set and `end_date` lies in the
//! future. The storefront shows the first running sale.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use spice_hub_core::models::{NewSale, NewSaleProduct, Product, Sale, SaleProduct, SaleUpdate};
use spice_hub_core::{SaleId, SaleProductId};

use super::RepositoryError;
use super::products::{PRODUCT_COLUMNS, PRODUCT_JOIN, ProductRow};

const SALE_COLUMNS: &str = "id, name, description, discount_percentage, start_date, end_date, \
     is_active, banner_image, banner_text, created_at, updated_at";

#[derive(sqlx::FromRow)]
struct SaleRow {
    id: SaleId,
    name: String,
    description: Option<String>,
    discount_percentage: Decimal,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    is_active: bool,
    banner_image: Option<String>,
    banner_text: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

#[derive(sqlx::FromRow)]
struct SaleProductRow {
    sale_product_id: SaleProductId,
    sale_id: SaleId,
    discounted_price: Decimal,
    #[sqlx(flatten)]
    product: ProductRow,
}

/// Repository for sale database operations.
pub struct SaleRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> SaleRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// All sales, most recently started first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Sale>, RepositoryError> {
        let sql = format!("SELECT {SALE_COLUMNS} FROM sales ORDER BY start_date DESC");
        let rows = sqlx::query_as::<_, SaleRow>(&sql)
            .fetch_all(self.pool)
            .await?;
        self.attach_products(rows).await
    }

    /// The first running sale, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn active(&self) -> Result<Option<Sale>, RepositoryError> {
        let sql = format!(
            "SELECT {SALE_COLUMNS} FROM sales \
             WHERE is_active AND end_date > NOW() \
             ORDER BY start_date LIMIT 1"
        );
        let Some(row) = sqlx::query_as::<_, SaleRow>(&sql)
            .fetch_optional(self.pool)
            .await?
        else {
            return Ok(None);
        };
        Ok(self.attach_products(vec![row]).await?.pop())
    }

    /// Get a sale with its products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: SaleId) -> Result<Option<Sale>, RepositoryError> {
        let sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = $1");
        let Some(row) = sqlx::query_as::<_, SaleRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
        else {
            return Ok(None);
        };
        Ok(self.attach_products(vec![row]).await?.pop())
    }

    /// Create a sale with its products.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any insert fails.
    pub async fn create(&self, sale: &NewSale) -> Result<Sale, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let id: SaleId = sqlx::query_scalar(
            "INSERT INTO sales (name, description, discount_percentage, start_date, end_date, \
                is_active, banner_image, banner_text) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING id",
        )
        .bind(&sale.name)
        .bind(&sale.description)
        .bind(sale.discount_percentage)
        .bind(sale.start_date)
        .bind(sale.end_date)
        .bind(sale.is_active)
        .bind(&sale.banner_image)
        .bind(&sale.banner_text)
        .fetch_one(&mut *tx)
        .await?;
        insert_products(&mut tx, id, &sale.products).await?;
        tx.commit().await?;
        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Apply a partial update to the sale's own fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the sale does not exist.
    pub async fn update(&self, id: SaleId, update: &SaleUpdate) -> Result<Sale, RepositoryError> {
        let result = sqlx::query(
            "UPDATE sales SET \
                name = COALESCE($2, name), \
                description = COALESCE($3, description), \
                discount_percentage = COALESCE($4, discount_percentage), \
                start_date = COALESCE($5, start_date), \
                end_date = COALESCE($6, end_date), \
                is_active = COALESCE($7, is_active), \
                banner_image = COALESCE($8, banner_image), \
                banner_text = COALESCE($9, banner_text), \
                updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(&update.name)
        .bind(&update.description)
        .bind(update.discount_percentage)
        .bind(update.start_date)
        .bind(update.end_date)
        .bind(update.is_active)
        .bind(&update.banner_image)
        .bind(&update.banner_text)
        .execute(self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Delete a sale and its product lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the sale does not exist.
    pub async fn delete(&self, id: SaleId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM sales WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn attach_products(&self, rows: Vec<SaleRow>) -> Result<Vec<Sale>, RepositoryError> {
        let ids: Vec<SaleId> = rows.iter().map(|r| r.id).collect();
        let sql = format!(
            "SELECT sp.id AS sale_product_id, sp.sale_id, sp.discounted_price, {PRODUCT_COLUMNS} \
             FROM sale_products sp JOIN {PRODUCT_JOIN} ON p.id = sp.product_id \
             WHERE sp.sale_id = ANY($1) ORDER BY p.name"
        );
        let lines = sqlx::query_as::<_, SaleProductRow>(&sql)
            .bind(&ids)
            .fetch_all(self.pool)
            .await?;

        let mut by_sale: HashMap<SaleId, Vec<SaleProduct>> = HashMap::new();
        for line in lines {
            let product = Product::try_from(line.product)?;
            let summary = serde_json::to_value(product.summary())
                .map_err(|e| RepositoryError::DataCorruption(e.to_string()))?;
            by_sale.entry(line.sale_id).or_default().push(SaleProduct {
                id: line.sale_product_id,
                product_id: product.id,
                discounted_price: line.discounted_price,
                product: Some(summary),
            });
        }

        Ok(rows
            .into_iter()
            .map(|row| Sale {
                products: by_sale.remove(&row.id).unwrap_or_default(),
                id: row.id,
                name: row.name,
                description: row.description,
                discount_percentage: row.discount_percentage,
                start_date: row.start_date,
                end_date: row.end_date,
                is_active: row.is_active,
                banner_image: row.banner_image,
                banner_text: row.banner_text,
                created_at: row.created_at,
                updated_at: row.updated_at,
            })
            .collect())
    }
}

async fn insert_products(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    sale_id: SaleId,
    products: &[NewSaleProduct],
) -> Result<(), RepositoryError> {
    for line in products {
        sqlx::query(
            "INSERT INTO sale_products (sale_id, product_id, discounted_price) \
             VALUES ($1, $2, $3)",
        )
        .bind(sale_id)
        .bind(line.product_id)
        .bind(line.discounted_price)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}
