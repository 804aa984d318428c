//! Seed the catalog from a YAML file.
//!
//! Every section is optional. Entries are matched by name (case-insensitive):
//! existing rows are updated in place, new ones are created. Meal items and
//! health recommendations name their product, which must exist in the
//! database or appear earlier in the same file.
//!
//! ```yaml
//! categories:
//!   - name: Whole Spices
//!     featured: true
//! products:
//!   - name: Cumin Seeds
//!     category: Whole Spices
//!     price: 150
//!     stock: 40
//!     containers: [jar, refill]
//! meals:
//!   - name: Pilau Night
//!     serves: 6
//!     items:
//!       - { product: Cumin Seeds, quantity: 1, unit: tsp }
//! health:
//!   - name: Digestion
//!     recommendations:
//!       - { product: Cumin Seeds, quantity: 0.5, unit: tsp, frequency: after meals }
//! ```

use std::collections::HashSet;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::{error, info};

use spice_hub_api::db::{
    CategoryRepository, HealthRepository, MealRepository, ProductRepository, RepositoryError,
};
use spice_hub_core::PublishStatus;
use spice_hub_core::models::{
    CategoryUpdate, HealthCategoryUpdate, MealUpdate, NewCategory, NewHealthCategory,
    NewHealthRecommendation, NewMeal, NewMealItem, NewProduct, ProductUpdate,
};

use super::{DatabaseSetupError, connect};

const DEFAULT_FREQUENCY: &str = "daily";

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error(transparent)]
    Setup(#[from] DatabaseSetupError),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid catalog: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{0} validation errors found")]
    Invalid(usize),

    #[error("{product}: unknown category \"{category}\"")]
    UnknownCategory { product: String, category: String },

    #[error("{owner}: unknown product \"{product}\"")]
    UnknownProduct { owner: String, product: String },

    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Catalog {
    #[serde(default)]
    pub categories: Vec<SeedCategory>,
    #[serde(default)]
    pub products: Vec<SeedProduct>,
    #[serde(default)]
    pub meals: Vec<SeedMeal>,
    #[serde(default)]
    pub health: Vec<SeedHealthCategory>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedCategory {
    pub name: String,
    #[serde(default)]
    pub featured: bool,
    #[serde(default = "active")]
    pub status: PublishStatus,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedProduct {
    pub name: String,
    pub category: String,
    pub price: Decimal,
    #[serde(default)]
    pub original_price: Option<Decimal>,
    #[serde(default)]
    pub cost_per_item: Option<Decimal>,
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub containers: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub main_image: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub sale: bool,
    #[serde(default)]
    pub new: bool,
    #[serde(default = "active")]
    pub status: PublishStatus,
}

/// A product reference with an amount, used by meals and health bundles.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedItem {
    pub product: String,
    pub quantity: f64,
    pub unit: String,
    /// Health recommendations only.
    #[serde(default)]
    pub frequency: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedMeal {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default = "default_serves")]
    pub serves: i32,
    #[serde(default)]
    pub recipe: Option<String>,
    #[serde(default)]
    pub add_ons: Vec<String>,
    #[serde(default = "yes")]
    pub active: bool,
    pub items: Vec<SeedItem>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedHealthCategory {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub benefits: Option<String>,
    #[serde(default)]
    pub usage: Option<String>,
    #[serde(default)]
    pub safety_notes: Option<String>,
    #[serde(default = "yes")]
    pub active: bool,
    pub recommendations: Vec<SeedItem>,
}

const fn active() -> PublishStatus {
    PublishStatus::Active
}

const fn default_serves() -> i32 {
    4
}

const fn yes() -> bool {
    true
}

/// Rows created and updated for one section.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    pub created: usize,
    pub updated: usize,
}

impl Tally {
    const fn record(&mut self, existed: bool) {
        if existed {
            self.updated += 1;
        } else {
            self.created += 1;
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub categories: Tally,
    pub products: Tally,
    pub meals: Tally,
    pub health: Tally,
}

/// Problems that can be found without a database.
#[must_use]
pub fn validate(catalog: &Catalog) -> Vec<String> {
    let mut errors = Vec::new();

    let names = |section: &str, names: Vec<&str>, errors: &mut Vec<String>| {
        let mut seen = HashSet::new();
        for name in names {
            if name.trim().is_empty() {
                errors.push(format!("{section}: an entry has no name"));
            } else if !seen.insert(name.trim().to_lowercase()) {
                errors.push(format!("{section}: \"{name}\" appears more than once"));
            }
        }
    };
    names(
        "categories",
        catalog.categories.iter().map(|c| c.name.as_str()).collect(),
        &mut errors,
    );
    names(
        "products",
        catalog.products.iter().map(|p| p.name.as_str()).collect(),
        &mut errors,
    );
    names(
        "meals",
        catalog.meals.iter().map(|m| m.name.as_str()).collect(),
        &mut errors,
    );
    names(
        "health",
        catalog.health.iter().map(|h| h.name.as_str()).collect(),
        &mut errors,
    );

    for product in &catalog.products {
        if product.price <= Decimal::ZERO {
            errors.push(format!("{}: price must be greater than 0", product.name));
        }
        if product.stock < 0 {
            errors.push(format!("{}: stock cannot be negative", product.name));
        }
        if product.category.trim().is_empty() {
            errors.push(format!("{}: category is required", product.name));
        }
    }

    let items = |owner: &str, items: &[SeedItem], errors: &mut Vec<String>| {
        for item in items {
            if item.quantity <= 0.0 {
                errors.push(format!("{owner}: {} needs a quantity greater than 0", item.product));
            }
            if item.unit.trim().is_empty() {
                errors.push(format!("{owner}: {} needs a unit", item.product));
            }
        }
    };
    for meal in &catalog.meals {
        if meal.serves < 1 {
            errors.push(format!("{}: serves must be at least 1", meal.name));
        }
        if meal.items.is_empty() {
            errors.push(format!("{}: a meal needs at least one item", meal.name));
        }
        items(&meal.name, &meal.items, &mut errors);
    }
    for category in &catalog.health {
        if category.recommendations.is_empty() {
            errors.push(format!(
                "{}: a health category needs at least one recommendation",
                category.name
            ));
        }
        items(&category.name, &category.recommendations, &mut errors);
    }

    errors
}

/// Seed the catalog in `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, fails validation,
/// references an unknown category or product, or a database write fails.
pub async fn catalog(path: &Path) -> Result<SeedReport, SeedError> {
    if !path.exists() {
        return Err(SeedError::FileNotFound(path.display().to_string()));
    }

    info!(path = %path.display(), "Loading catalog from file");
    let content = tokio::fs::read_to_string(path).await?;
    let catalog: Catalog = serde_yaml::from_str(&content)?;
    info!(
        categories = catalog.categories.len(),
        products = catalog.products.len(),
        meals = catalog.meals.len(),
        health = catalog.health.len(),
        "Parsed catalog"
    );

    let errors = validate(&catalog);
    if !errors.is_empty() {
        error!("Catalog validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(SeedError::Invalid(errors.len()));
    }

    let pool = connect().await?;
    let report = SeedReport {
        categories: seed_categories(&pool, &catalog.categories).await?,
        products: seed_products(&pool, &catalog.products).await?,
        meals: seed_meals(&pool, &catalog.meals).await?,
        health: seed_health(&pool, &catalog.health).await?,
    };

    info!(
        categories_created = report.categories.created,
        categories_updated = report.categories.updated,
        products_created = report.products.created,
        products_updated = report.products.updated,
        meals_created = report.meals.created,
        meals_updated = report.meals.updated,
        health_created = report.health.created,
        health_updated = report.health.updated,
        "Seeding complete"
    );
    Ok(report)
}

async fn seed_categories(pool: &PgPool, categories: &[SeedCategory]) -> Result<Tally, SeedError> {
    let repo = CategoryRepository::new(pool);
    let mut tally = Tally::default();
    for seed in categories {
        let name = seed.name.trim();
        let existing = repo.get_by_name(name).await?;
        if let Some(existing) = &existing {
            let update = CategoryUpdate {
                name: Some(name.to_owned()),
                is_featured: Some(seed.featured),
                status: Some(seed.status),
                image: seed.image.clone(),
                description: seed.description.clone(),
            };
            repo.update(existing.id, &update).await?;
        } else {
            let category = NewCategory {
                name: name.to_owned(),
                is_featured: seed.featured,
                status: seed.status,
                image: seed.image.clone(),
                description: seed.description.clone(),
            };
            repo.create(&category).await?;
        }
        tally.record(existing.is_some());
    }
    Ok(tally)
}

async fn seed_products(pool: &PgPool, products: &[SeedProduct]) -> Result<Tally, SeedError> {
    let categories = CategoryRepository::new(pool);
    let repo = ProductRepository::new(pool);
    let mut tally = Tally::default();
    for seed in products {
        let name = seed.name.trim();
        let category_id = categories
            .get_by_name(seed.category.trim())
            .await?
            .ok_or_else(|| SeedError::UnknownCategory {
                product: name.to_owned(),
                category: seed.category.clone(),
            })?
            .id;

        let existing = repo.get_by_name(name).await?;
        if let Some(existing) = &existing {
            let update = ProductUpdate {
                name: Some(name.to_owned()),
                price: Some(seed.price),
                original_price: seed.original_price,
                stock: Some(seed.stock),
                is_sale: Some(seed.sale),
                is_new: Some(seed.new),
                is_featured: Some(seed.featured),
                containers: Some(seed.containers.clone()),
                description: seed.description.clone(),
                images: Some(seed.images.clone()),
                status: Some(seed.status),
                cost_per_item: seed.cost_per_item,
                main_image: seed.main_image.clone(),
                category_id: Some(category_id),
            };
            repo.update(existing.id, &update).await?;
        } else {
            let product = NewProduct {
                name: name.to_owned(),
                price: seed.price,
                original_price: seed.original_price,
                stock: seed.stock,
                rating: 0.0,
                review_count: 0,
                is_sale: seed.sale,
                is_new: seed.new,
                is_featured: seed.featured,
                containers: seed.containers.clone(),
                description: seed.description.clone(),
                images: seed.images.clone(),
                status: seed.status,
                cost_per_item: seed.cost_per_item,
                main_image: seed.main_image.clone(),
                category_id,
            };
            repo.create(&product).await?;
        }
        tally.record(existing.is_some());
    }
    Ok(tally)
}

/// Look up each item's product by name.
async fn resolve_items(
    pool: &PgPool,
    owner: &str,
    items: &[SeedItem],
) -> Result<Vec<(NewMealItem, Option<String>)>, SeedError> {
    let products = ProductRepository::new(pool);
    let mut resolved = Vec::with_capacity(items.len());
    for item in items {
        let product = products
            .get_by_name(item.product.trim())
            .await?
            .ok_or_else(|| SeedError::UnknownProduct {
                owner: owner.to_owned(),
                product: item.product.clone(),
            })?;
        resolved.push((
            NewMealItem {
                product_id: product.id,
                product_name: product.name,
                quantity: item.quantity,
                unit: item.unit.trim().to_owned(),
            },
            item.frequency.clone(),
        ));
    }
    Ok(resolved)
}

async fn seed_meals(pool: &PgPool, meals: &[SeedMeal]) -> Result<Tally, SeedError> {
    let repo = MealRepository::new(pool);
    let mut tally = Tally::default();
    for seed in meals {
        let name = seed.name.trim();
        let items: Vec<NewMealItem> = resolve_items(pool, name, &seed.items)
            .await?
            .into_iter()
            .map(|(item, _)| item)
            .collect();
        let add_ons = Some(seed.add_ons.clone()).filter(|a| !a.is_empty());

        let existing = repo.get_by_name(name).await?;
        if let Some(existing) = &existing {
            let update = MealUpdate {
                name: Some(name.to_owned()),
                description: seed.description.clone(),
                image: seed.image.clone(),
                serves: Some(seed.serves),
                recipe: seed.recipe.clone(),
                add_ons,
                is_active: Some(seed.active),
            };
            repo.update(existing.id, &update).await?;
            repo.replace_items(existing.id, &items).await?;
        } else {
            let meal = NewMeal {
                name: name.to_owned(),
                description: seed.description.clone(),
                image: seed.image.clone(),
                serves: seed.serves,
                recipe: seed.recipe.clone(),
                add_ons,
                is_active: seed.active,
                items,
            };
            repo.create(&meal).await?;
        }
        tally.record(existing.is_some());
    }
    Ok(tally)
}

async fn seed_health(pool: &PgPool, categories: &[SeedHealthCategory]) -> Result<Tally, SeedError> {
    let repo = HealthRepository::new(pool);
    let mut tally = Tally::default();
    for seed in categories {
        let name = seed.name.trim();
        let recommendations: Vec<NewHealthRecommendation> =
            resolve_items(pool, name, &seed.recommendations)
                .await?
                .into_iter()
                .map(|(item, frequency)| NewHealthRecommendation {
                    product_id: item.product_id,
                    product_name: item.product_name,
                    quantity: item.quantity,
                    unit: item.unit,
                    frequency: frequency
                        .filter(|f| !f.trim().is_empty())
                        .unwrap_or_else(|| DEFAULT_FREQUENCY.to_owned()),
                })
                .collect();

        let existing = repo.get_by_name(name).await?;
        if let Some(existing) = &existing {
            let update = HealthCategoryUpdate {
                name: Some(name.to_owned()),
                description: seed.description.clone(),
                icon: seed.icon.clone(),
                benefits: seed.benefits.clone(),
                usage: seed.usage.clone(),
                safety_notes: seed.safety_notes.clone(),
                is_active: Some(seed.active),
            };
            repo.update(existing.id, &update).await?;
            repo.replace_recommendations(existing.id, &recommendations)
                .await?;
        } else {
            let category = NewHealthCategory {
                name: name.to_owned(),
                description: seed.description.clone(),
                icon: seed.icon.clone(),
                benefits: seed.benefits.clone(),
                usage: seed.usage.clone(),
                safety_notes: seed.safety_notes.clone(),
                is_active: seed.active,
                recommendations,
            };
            repo.create(&category).await?;
        }
        tally.record(existing.is_some());
    }
    Ok(tally)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    const CATALOG: &str = r"
categories:
  - name: Whole Spices
    featured: true
products:
  - name: Cumin Seeds
    category: Whole Spices
    price: 150
    stock: 40
    containers: [jar, refill]
  - name: Turmeric
    category: Whole Spices
    price: '120.50'
meals:
  - name: Pilau Night
    serves: 6
    items:
      - { product: Cumin Seeds, quantity: 1, unit: tsp }
health:
  - name: Digestion
    recommendations:
      - { product: Turmeric, quantity: 0.5, unit: tsp, frequency: after meals }
";

    #[test]
    fn test_parse_catalog() {
        let catalog: Catalog = serde_yaml::from_str(CATALOG).unwrap();
        assert_eq!(catalog.categories.len(), 1);
        assert!(catalog.categories[0].featured);
        assert_eq!(catalog.categories[0].status, PublishStatus::Active);

        let turmeric = &catalog.products[1];
        assert_eq!(turmeric.price, Decimal::new(12050, 2));
        assert_eq!(turmeric.stock, 0);
        assert!(turmeric.containers.is_empty());

        let meal = &catalog.meals[0];
        assert_eq!(meal.serves, 6);
        assert!(meal.active);
        assert_eq!(meal.items[0].unit, "tsp");
        assert_eq!(
            catalog.health[0].recommendations[0].frequency.as_deref(),
            Some("after meals")
        );
        assert!(validate(&catalog).is_empty());
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let result: Result<Catalog, _> = serde_yaml::from_str("spices: []");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_reports_each_problem() {
        let catalog: Catalog = serde_yaml::from_str(
            r"
products:
  - { name: Cumin, category: Whole, price: 0 }
  - { name: cumin, category: '', price: 10, stock: -1 }
meals:
  - { name: Empty, serves: 0, items: [] }
health:
  - name: Sleep
    recommendations:
      - { product: Cumin, quantity: 0, unit: ' ' }
",
        )
        .unwrap();

        let errors = validate(&catalog);
        assert_eq!(
            errors,
            vec![
                "products: \"cumin\" appears more than once",
                "Cumin: price must be greater than 0",
                "cumin: stock cannot be negative",
                "cumin: category is required",
                "Empty: serves must be at least 1",
                "Empty: a meal needs at least one item",
                "Sleep: Cumin needs a quantity greater than 0",
                "Sleep: Cumin needs a unit",
            ]
        );
    }

    #[test]
    fn test_tally_records() {
        let mut tally = Tally::default();
        tally.record(false);
        tally.record(true);
        tally.record(false);
        assert_eq!(tally, Tally { created: 2, updated: 1 });
    }
}
