//! Home page.

use askama::Template;
use askama_web::WebTemplate;
use chrono::Utc;
use tracing::instrument;

use spice_hub_core::models::{Category, ProductQuery};

use crate::filters;
use crate::middleware::Shopper;
use crate::views::{Layout, ProductCard, SaleBanner};

/// New arrivals shown on the home page.
const NEW_ARRIVALS: usize = 8;

/// Featured category tile.
#[derive(Debug, Clone)]
pub struct CategoryTile {
    pub id: String,
    pub name: String,
    pub image: Option<String>,
    pub description: Option<String>,
}

impl From<&Category> for CategoryTile {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id.to_string(),
            name: category.name.clone(),
            image: category.image.clone(),
            description: category.description.clone(),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub layout: Layout,
    pub sale: Option<SaleBanner>,
    pub featured: Vec<ProductCard>,
    pub categories: Vec<CategoryTile>,
    pub new_arrivals: Vec<ProductCard>,
}

/// Display the home page.
#[instrument(skip(shopper))]
pub async fn index(shopper: Shopper) -> HomeTemplate {
    let api = shopper.api();
    let featured_query = ProductQuery {
        featured: Some(true),
        ..ProductQuery::default()
    };
    let all_query = ProductQuery::default();
    let (featured, categories, sale, products, wishlist) = tokio::join!(
        api.list_products(&featured_query),
        api.list_categories(),
        api.active_sale(),
        api.list_products(&all_query),
        shopper.wishlist(),
    );

    let featured = shopper
        .or_default(featured, "We couldn't load featured products.")
        .await;
    let categories = shopper
        .or_default(categories, "We couldn't load categories.")
        .await;
    let sale = shopper.or_default(sale, "We couldn't load the current sale.").await;
    let products = shopper
        .or_default(products, "We couldn't load new arrivals.")
        .await;

    let now = Utc::now();
    HomeTemplate {
        sale: sale
            .filter(|s| s.is_running(now))
            .map(|s| SaleBanner::new(&s, now)),
        featured: featured
            .iter()
            .map(|p| ProductCard::from_product(p, wishlist.is_in_wishlist(p.id)))
            .collect(),
        categories: categories
            .iter()
            .filter(|c| c.is_featured)
            .map(CategoryTile::from)
            .collect(),
        new_arrivals: products
            .iter()
            .filter(|p| p.is_new)
            .take(NEW_ARRIVALS)
            .map(|p| ProductCard::from_product(p, wishlist.is_in_wishlist(p.id)))
            .collect(),
        layout: shopper.layout().await,
    }
}
