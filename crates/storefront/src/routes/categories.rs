//! Category pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::Path;
use tracing::instrument;

use spice_hub_core::CategoryId;
use spice_hub_core::PublishStatus;

use crate::error::Result;
use crate::filters;
use crate::middleware::Shopper;
use crate::routes::home::CategoryTile;
use crate::views::{Layout, ProductCard};

#[derive(Template, WebTemplate)]
#[template(path = "categories/index.html")]
pub struct CategoriesTemplate {
    pub layout: Layout,
    pub categories: Vec<CategoryTile>,
}

/// List active categories.
#[instrument(skip(shopper))]
pub async fn index(shopper: Shopper) -> CategoriesTemplate {
    let categories = shopper.api().list_categories().await;
    let categories = shopper
        .or_default(categories, "We couldn't load categories.")
        .await;

    CategoriesTemplate {
        categories: categories
            .iter()
            .filter(|c| c.status == PublishStatus::Active)
            .map(CategoryTile::from)
            .collect(),
        layout: shopper.layout().await,
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "categories/show.html")]
pub struct CategoryTemplate {
    pub layout: Layout,
    pub category: CategoryTile,
    pub products: Vec<ProductCard>,
}

/// Products of one category.
///
/// # Errors
///
/// Returns 404 if the category does not exist.
#[instrument(skip(shopper))]
pub async fn show(shopper: Shopper, Path(id): Path<CategoryId>) -> Result<CategoryTemplate> {
    let (category, wishlist) = tokio::join!(shopper.api().get_category(id), shopper.wishlist());
    let category = category?;

    Ok(CategoryTemplate {
        products: category
            .products
            .iter()
            .map(|p| ProductCard::from_summary(p, wishlist.is_in_wishlist(p.id)))
            .collect(),
        category: CategoryTile::from(&category),
        layout: shopper.layout().await,
    })
}
