//! Sale page.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::Query;
use chrono::Utc;
use serde::Deserialize;
use tracing::instrument;

use spice_hub_core::format_ksh;
use spice_hub_core::listing::{SaleSort, total_savings};
use spice_hub_core::models::ProductQuery;

use crate::filters;
use crate::middleware::Shopper;
use crate::routes::products::SelectOption;
use crate::views::{Layout, ProductCard, SaleBanner};

#[derive(Debug, Default, Deserialize)]
pub struct SaleQuery {
    pub sort: Option<String>,
}

#[derive(Template, WebTemplate)]
#[template(path = "sale.html")]
pub struct SaleTemplate {
    pub layout: Layout,
    pub sale: Option<SaleBanner>,
    pub products: Vec<ProductCard>,
    pub total_savings: String,
    pub sorts: Vec<SelectOption>,
}

/// Products on sale, biggest discount first by default.
#[instrument(skip(shopper))]
pub async fn index(shopper: Shopper, Query(query): Query<SaleQuery>) -> SaleTemplate {
    let api = shopper.api();
    let on_sale = ProductQuery {
        on_sale: Some(true),
        ..ProductQuery::default()
    };
    let (sale, products, wishlist) =
        tokio::join!(api.active_sale(), api.list_products(&on_sale), shopper.wishlist());
    let sale = shopper.or_default(sale, "We couldn't load the current sale.").await;
    let products = shopper
        .or_default(products, "We couldn't load sale products.")
        .await;

    let sort: SaleSort = query
        .sort
        .as_deref()
        .and_then(|s| s.parse().ok())
        .unwrap_or_default();
    let mut listed: Vec<_> = products.iter().filter(|p| p.is_sale).collect();
    sort.sort(&mut listed);

    let now = Utc::now();
    SaleTemplate {
        sale: sale
            .filter(|s| s.is_running(now))
            .map(|s| SaleBanner::new(&s, now)),
        total_savings: format_ksh(total_savings(&listed)),
        products: listed
            .iter()
            .map(|p| ProductCard::from_product(p, wishlist.is_in_wishlist(p.id)))
            .collect(),
        sorts: SaleSort::ALL
            .iter()
            .map(|s| SelectOption {
                value: s.as_str().to_string(),
                label: s.label().to_string(),
                selected: *s == sort,
            })
            .collect(),
        layout: shopper.layout().await,
    }
}
