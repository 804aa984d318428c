//! Catalog and product detail pages.
//!
//! The catalog fetches every product once and filters, sorts, and pages
//! in memory.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query},
    response::Redirect,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use spice_hub_core::listing::{MAX_PRICE_FILTER, Page, ProductFilter, ProductSort, paginate};
use spice_hub_core::models::{NewReview, ProductQuery, Review};
use spice_hub_core::{DEFAULT_ADD_QUANTITY, ProductId, format_ksh};

use crate::error::Result;
use crate::filters;
use crate::middleware::{RequireAuth, Shopper};
use crate::views::{Layout, ProductCard};

/// Products per catalog page.
pub const PER_PAGE: usize = 12;

/// Gram quantities offered on the product page.
const QUANTITY_CHOICES: [i32; 4] = [100, 250, 500, 1000];

/// Catalog query string. Every field is optional and blank values are
/// ignored, so a plain form submit never fails.
#[derive(Debug, Default, Deserialize)]
pub struct CatalogQuery {
    pub category: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub sort: Option<String>,
    pub q: Option<String>,
    pub page: Option<String>,
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

impl CatalogQuery {
    /// Filter described by the query.
    #[must_use]
    pub fn filter(&self) -> ProductFilter {
        let price = |value: Option<&String>, default: i64| {
            non_blank(value)
                .and_then(|s| s.parse::<Decimal>().ok())
                .unwrap_or_else(|| Decimal::from(default))
        };
        ProductFilter {
            categories: non_blank(self.category.as_ref())
                .map(|c| vec![c.to_string()])
                .unwrap_or_default(),
            min_price: price(self.min_price.as_ref(), 0),
            max_price: price(self.max_price.as_ref(), MAX_PRICE_FILTER),
            search: non_blank(self.q.as_ref()).map(str::to_owned),
            on_sale_only: false,
        }
    }

    #[must_use]
    pub fn sort(&self) -> ProductSort {
        non_blank(self.sort.as_ref())
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn page(&self) -> usize {
        non_blank(self.page.as_ref())
            .and_then(|s| s.parse().ok())
            .unwrap_or(1)
    }

    /// Query string for `page`, keeping every other filter.
    #[must_use]
    pub fn page_href(&self, page: usize) -> String {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        let fields = [
            ("category", &self.category),
            ("min_price", &self.min_price),
            ("max_price", &self.max_price),
            ("sort", &self.sort),
            ("q", &self.q),
        ];
        for (key, value) in fields {
            if let Some(value) = non_blank(value.as_ref()) {
                query.append_pair(key, value);
            }
        }
        query.append_pair("page", &page.to_string());
        format!("/products?{}", query.finish())
    }
}

/// `<option>` of a select box.
#[derive(Debug, Clone)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// Pagination links.
#[derive(Debug, Clone)]
pub struct Pager {
    pub page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub previous: Option<String>,
    pub next: Option<String>,
}

impl Pager {
    fn new<T>(page: &Page<T>, query: &CatalogQuery) -> Self {
        Self {
            page: page.page,
            total_pages: page.total_pages,
            total_items: page.total_items,
            previous: page
                .has_previous()
                .then(|| query.page_href(page.page - 1)),
            next: page.has_next().then(|| query.page_href(page.page + 1)),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct CatalogTemplate {
    pub layout: Layout,
    pub products: Vec<ProductCard>,
    pub categories: Vec<SelectOption>,
    pub sorts: Vec<SelectOption>,
    pub search: String,
    pub min_price: String,
    pub max_price: String,
    pub pager: Pager,
}

/// Display the catalog.
#[instrument(skip(shopper))]
pub async fn index(shopper: Shopper, Query(query): Query<CatalogQuery>) -> CatalogTemplate {
    let api = shopper.api();
    let all = ProductQuery::default();
    let (products, categories, wishlist) = tokio::join!(
        api.list_products(&all),
        api.list_categories(),
        shopper.wishlist(),
    );
    let products = shopper
        .or_default(products, "We couldn't load products.")
        .await;
    let categories = shopper
        .or_default(categories, "We couldn't load categories.")
        .await;

    let filter = query.filter();
    let mut matching = filter.apply(&products);
    query.sort().sort(&mut matching);
    let page = paginate(matching, query.page(), PER_PAGE);

    let selected_category = non_blank(query.category.as_ref()).unwrap_or_default();
    let selected_sort = query.sort();

    CatalogTemplate {
        products: page
            .items
            .iter()
            .map(|p| ProductCard::from_product(p, wishlist.is_in_wishlist(p.id)))
            .collect(),
        categories: categories
            .iter()
            .map(|c| SelectOption {
                value: c.name.clone(),
                label: c.name.clone(),
                selected: c.name.eq_ignore_ascii_case(selected_category),
            })
            .collect(),
        sorts: ProductSort::ALL
            .iter()
            .map(|s| SelectOption {
                value: s.as_str().to_string(),
                label: s.label().to_string(),
                selected: *s == selected_sort,
            })
            .collect(),
        search: filter.search.clone().unwrap_or_default(),
        min_price: filter.min_price.to_string(),
        max_price: filter.max_price.to_string(),
        pager: Pager::new(&page, &query),
        layout: shopper.layout().await,
    }
}

/// Review as shown under a product.
#[derive(Debug, Clone)]
pub struct ReviewView {
    pub author: String,
    pub rating: i64,
    pub comment: Option<String>,
    pub date: String,
}

impl From<&Review> for ReviewView {
    #[allow(clippy::cast_possible_truncation)]
    fn from(review: &Review) -> Self {
        Self {
            author: review.author(),
            rating: review.rating.round() as i64,
            comment: review.comment.clone(),
            date: review.created_at.format("%b %-d, %Y").to_string(),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductTemplate {
    pub layout: Layout,
    pub product: ProductCard,
    pub description: Option<String>,
    pub images: Vec<String>,
    pub containers: Vec<String>,
    pub quantities: Vec<SelectOption>,
    pub in_stock: bool,
    pub savings: Option<String>,
    pub reviews: Vec<ReviewView>,
    pub signed_in: bool,
}

/// Display a product with its reviews.
///
/// # Errors
///
/// Returns 404 if the product does not exist.
#[instrument(skip(shopper))]
pub async fn show(shopper: Shopper, Path(id): Path<ProductId>) -> Result<ProductTemplate> {
    let api = shopper.api();
    let (product, reviews, wishlist) = tokio::join!(
        api.get_product(id),
        api.product_reviews(id),
        shopper.wishlist(),
    );
    let product = product?;
    let reviews = shopper
        .or_default(reviews, "We couldn't load reviews.")
        .await;

    let discount = product.discount();
    Ok(ProductTemplate {
        product: ProductCard::from_product(&product, wishlist.is_in_wishlist(product.id)),
        description: product.description.clone(),
        images: product.images.clone(),
        containers: product.containers.clone(),
        quantities: QUANTITY_CHOICES
            .iter()
            .map(|grams| SelectOption {
                value: grams.to_string(),
                label: spice_hub_core::format_grams(*grams),
                selected: *grams == DEFAULT_ADD_QUANTITY,
            })
            .collect(),
        in_stock: product.stock > 0,
        savings: (discount > Decimal::ZERO).then(|| format_ksh(discount)),
        reviews: reviews.iter().map(ReviewView::from).collect(),
        signed_in: shopper.user.is_some(),
        layout: shopper.layout().await,
    })
}

/// Review form.
#[derive(Debug, Deserialize)]
pub struct ReviewForm {
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
}

/// Post a review of a product.
#[instrument(skip(user, shopper, form), fields(user_id = %user.user_id))]
pub async fn create_review(
    RequireAuth(user): RequireAuth,
    shopper: Shopper,
    Path(id): Path<ProductId>,
    Form(form): Form<ReviewForm>,
) -> Redirect {
    let back = format!("/products/{id}#reviews");
    if !(1..=5).contains(&form.rating) {
        shopper.flash.error("Please choose a rating from 1 to 5.").await;
        return Redirect::to(&back);
    }

    let comment = form.comment.trim();
    let review = NewReview {
        product_id: id,
        user_id: user.user_id,
        rating: f64::from(form.rating),
        comment: (!comment.is_empty()).then(|| comment.to_string()),
    };
    match shopper.api().create_review(&review).await {
        Ok(_) => {
            tracing::info!(product_id = %id, rating = form.rating, "Review posted");
            shopper.flash.success("Thanks for your review!").await;
        }
        Err(e) => shopper.report(&e, &e.user_message()).await,
    }
    Redirect::to(&back)
}
