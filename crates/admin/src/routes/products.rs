//! Product management route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use spice_hub_core::models::{Category, NewProduct, Product, ProductQuery, ProductUpdate};
use spice_hub_core::{CategoryId, ProductId, PublishStatus, format_ksh};

use crate::filters;
use crate::forms::{amount, checked, non_blank, optional_amount, split_list};
use crate::middleware::RequireAdmin;
use crate::views::{Layout, SelectOption};

#[derive(Debug, Deserialize)]
pub struct ProductSearch {
    pub q: Option<String>,
}

/// Row of the products table.
#[derive(Debug, Clone)]
pub struct ProductRow {
    pub id: String,
    pub name: String,
    pub category: String,
    pub price: String,
    pub stock: i32,
    pub status: String,
    pub image: Option<String>,
    pub flags: Vec<&'static str>,
}

impl From<&Product> for ProductRow {
    fn from(product: &Product) -> Self {
        let flags = [
            (product.is_featured, "Featured"),
            (product.is_sale, "Sale"),
            (product.is_new, "New"),
        ]
        .into_iter()
        .filter_map(|(on, label)| on.then_some(label))
        .collect();
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            category: product.category_name().unwrap_or("-").to_string(),
            price: format_ksh(product.price),
            stock: product.stock,
            status: product.status.as_str().to_string(),
            image: product.display_image().map(str::to_owned),
            flags,
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub layout: Layout,
    pub products: Vec<ProductRow>,
    pub active: usize,
    pub draft: usize,
    pub search: String,
}

/// Product listing with optional name search.
#[instrument(skip(admin), fields(user_id = %admin.admin.user_id))]
pub async fn index(admin: RequireAdmin, Query(query): Query<ProductSearch>) -> ProductsIndexTemplate {
    let search = non_blank(query.q.as_deref());
    let products = admin
        .or_default(
            admin
                .api
                .list_products(&ProductQuery {
                    search: search.clone(),
                    ..ProductQuery::default()
                })
                .await,
            "Failed to load products.",
        )
        .await;

    let count = |status| products.iter().filter(|p| p.status == status).count();
    ProductsIndexTemplate {
        active: count(PublishStatus::Active),
        draft: count(PublishStatus::Draft),
        products: products.iter().map(ProductRow::from).collect(),
        search: search.unwrap_or_default(),
        layout: admin.layout("/products").await,
    }
}

/// Posted product form. Checkboxes are absent when unticked.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductForm {
    pub name: String,
    pub price: String,
    #[serde(default)]
    pub original_price: Option<String>,
    #[serde(default)]
    pub cost_per_item: Option<String>,
    pub stock: String,
    pub category_id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub containers: String,
    #[serde(default)]
    pub images: String,
    #[serde(default)]
    pub main_image: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_featured: Option<String>,
    #[serde(default)]
    pub is_sale: Option<String>,
    #[serde(default)]
    pub is_new: Option<String>,
}

impl ProductForm {
    fn name(&self) -> Result<String, String> {
        non_blank(Some(&self.name)).ok_or_else(|| "Name is required.".to_string())
    }

    fn stock(&self) -> Result<i32, String> {
        self.stock
            .trim()
            .parse::<i32>()
            .ok()
            .filter(|s| *s >= 0)
            .ok_or_else(|| "Stock must be a whole number of at least 0.".to_string())
    }

    fn category_id(&self) -> Result<CategoryId, String> {
        self.category_id
            .trim()
            .parse()
            .map_err(|_| "Choose a category.".to_string())
    }

    fn status(&self) -> Result<PublishStatus, String> {
        non_blank(self.status.as_deref()).map_or(Ok(PublishStatus::default()), |s| {
            s.parse().map_err(|_| format!("Unknown status \"{s}\"."))
        })
    }

    /// Validate into a create payload.
    ///
    /// # Errors
    ///
    /// Returns a message describing the first invalid field.
    pub fn into_new(self) -> Result<NewProduct, String> {
        Ok(NewProduct {
            name: self.name()?,
            price: amount(&self.price, "Price")?,
            original_price: optional_amount(self.original_price.as_deref(), "Original price")?,
            cost_per_item: optional_amount(self.cost_per_item.as_deref(), "Cost per item")?,
            stock: self.stock()?,
            category_id: self.category_id()?,
            status: self.status()?,
            rating: 0.0,
            review_count: 0,
            is_sale: checked(self.is_sale.as_deref()),
            is_new: checked(self.is_new.as_deref()),
            is_featured: checked(self.is_featured.as_deref()),
            containers: split_list(&self.containers),
            images: split_list(&self.images),
            main_image: non_blank(self.main_image.as_deref()),
            description: non_blank(self.description.as_deref()),
        })
    }

    /// Validate into an update payload. Every field of the form is sent.
    ///
    /// # Errors
    ///
    /// Returns a message describing the first invalid field.
    pub fn into_update(self) -> Result<ProductUpdate, String> {
        Ok(ProductUpdate {
            name: Some(self.name()?),
            price: Some(amount(&self.price, "Price")?),
            original_price: optional_amount(self.original_price.as_deref(), "Original price")?,
            cost_per_item: optional_amount(self.cost_per_item.as_deref(), "Cost per item")?,
            stock: Some(self.stock()?),
            category_id: Some(self.category_id()?),
            status: Some(self.status()?),
            is_sale: Some(checked(self.is_sale.as_deref())),
            is_new: Some(checked(self.is_new.as_deref())),
            is_featured: Some(checked(self.is_featured.as_deref())),
            containers: Some(split_list(&self.containers)),
            images: Some(split_list(&self.images)),
            main_image: non_blank(self.main_image.as_deref()),
            description: non_blank(self.description.as_deref()),
        })
    }
}

impl From<&Product> for ProductForm {
    fn from(product: &Product) -> Self {
        let flag = |on: bool| on.then(|| "on".to_string());
        Self {
            name: product.name.clone(),
            price: product.price.to_string(),
            original_price: product.original_price.map(|p| p.to_string()),
            cost_per_item: product.cost_per_item.map(|p| p.to_string()),
            stock: product.stock.to_string(),
            category_id: product.category_id.to_string(),
            status: Some(product.status.as_str().to_string()),
            containers: product.containers.join(", "),
            images: product.images.join(", "),
            main_image: product.main_image.clone(),
            description: product.description.clone(),
            is_featured: flag(product.is_featured),
            is_sale: flag(product.is_sale),
            is_new: flag(product.is_new),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "products/form.html")]
pub struct ProductFormTemplate {
    pub layout: Layout,
    pub title: String,
    pub action: String,
    pub form: ProductForm,
    pub categories: Vec<SelectOption>,
    pub statuses: Vec<SelectOption>,
}

impl ProductFormTemplate {
    fn new(title: &str, action: String, form: ProductForm, categories: &[Category]) -> Self {
        let status = form.status.clone().unwrap_or_default();
        Self {
            categories: categories
                .iter()
                .map(|c| SelectOption::new(c.id.to_string(), c.name.clone(), &form.category_id))
                .collect(),
            statuses: PublishStatus::ALL
                .iter()
                .map(|s| SelectOption::new(s.as_str(), s.as_str(), &status))
                .collect(),
            title: title.to_string(),
            action,
            form,
            layout: Layout::default(),
        }
    }
}

/// Blank product form.
#[instrument(skip(admin), fields(user_id = %admin.admin.user_id))]
pub async fn new_form(admin: RequireAdmin) -> ProductFormTemplate {
    let categories = admin
        .or_default(admin.api.list_categories().await, "Failed to load categories.")
        .await;
    let form = ProductForm {
        status: Some(PublishStatus::default().as_str().to_string()),
        ..ProductForm::default()
    };
    let mut page = ProductFormTemplate::new("New product", "/products".to_string(), form, &categories);
    page.layout = admin.layout("/products").await;
    page
}

/// Create a product.
#[instrument(skip(admin, form), fields(user_id = %admin.admin.user_id))]
pub async fn create(admin: RequireAdmin, Form(form): Form<ProductForm>) -> Redirect {
    let product = match form.into_new() {
        Ok(product) => product,
        Err(message) => {
            admin.flash.error(message).await;
            return Redirect::to("/products/new");
        }
    };
    match admin.api.create_product(&product).await {
        Ok(created) => {
            tracing::info!(product_id = %created.id, "Product created");
            admin.flash.success(format!("Created {}.", created.name)).await;
            Redirect::to("/products")
        }
        Err(e) => {
            admin.report(&e, "Failed to create product.").await;
            Redirect::to("/products/new")
        }
    }
}

/// Prefilled product form.
#[instrument(skip(admin), fields(user_id = %admin.admin.user_id))]
pub async fn edit_form(admin: RequireAdmin, Path(id): Path<ProductId>) -> Response {
    let (product, categories) =
        tokio::join!(admin.api.get_product(id), admin.api.list_categories());
    let product = match product {
        Ok(product) => product,
        Err(e) => {
            admin.report(&e, "Failed to load product.").await;
            return Redirect::to("/products").into_response();
        }
    };
    let categories = admin.or_default(categories, "Failed to load categories.").await;
    let mut page = ProductFormTemplate::new(
        &format!("Edit {}", product.name),
        format!("/products/{id}"),
        ProductForm::from(&product),
        &categories,
    );
    page.layout = admin.layout("/products").await;
    page.into_response()
}

/// Save a product.
#[instrument(skip(admin, form), fields(user_id = %admin.admin.user_id))]
pub async fn update(
    admin: RequireAdmin,
    Path(id): Path<ProductId>,
    Form(form): Form<ProductForm>,
) -> Redirect {
    let edit = format!("/products/{id}/edit");
    let update = match form.into_update() {
        Ok(update) => update,
        Err(message) => {
            admin.flash.error(message).await;
            return Redirect::to(&edit);
        }
    };
    match admin.api.update_product(id, &update).await {
        Ok(product) => {
            admin.flash.success(format!("Saved {}.", product.name)).await;
            Redirect::to("/products")
        }
        Err(e) => {
            admin.report(&e, "Failed to save product.").await;
            Redirect::to(&edit)
        }
    }
}

/// Delete a product.
#[instrument(skip(admin), fields(user_id = %admin.admin.user_id))]
pub async fn delete(admin: RequireAdmin, Path(id): Path<ProductId>) -> Redirect {
    match admin.api.delete_product(id).await {
        Ok(_) => {
            tracing::info!(product_id = %id, "Product deleted");
            admin.flash.success("Product deleted.").await;
        }
        Err(e) => admin.report(&e, "Failed to delete product.").await,
    }
    Redirect::to("/products")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn form() -> ProductForm {
        ProductForm {
            name: " Black Pepper ".to_string(),
            price: "350".to_string(),
            original_price: Some(String::new()),
            stock: "40".to_string(),
            category_id: CategoryId::new().to_string(),
            containers: "jar, pouch".to_string(),
            is_sale: Some("on".to_string()),
            ..ProductForm::default()
        }
    }

    #[test]
    fn test_into_new() {
        let product = form().into_new().unwrap();
        assert_eq!(product.name, "Black Pepper");
        assert_eq!(product.price, Decimal::from(350));
        assert_eq!(product.original_price, None);
        assert_eq!(product.containers, vec!["jar", "pouch"]);
        assert!(product.is_sale);
        assert!(!product.is_featured);
        assert_eq!(product.status, PublishStatus::Draft);
    }

    #[test]
    fn test_into_update_sends_unticked_flags() {
        let update = ProductForm {
            is_sale: None,
            status: Some("Active".to_string()),
            ..form()
        }
        .into_update()
        .unwrap();
        assert_eq!(update.is_sale, Some(false));
        assert_eq!(update.status, Some(PublishStatus::Active));
        assert_eq!(update.stock, Some(40));
    }

    #[test]
    fn test_validation_messages() {
        let err = ProductForm {
            stock: "-2".to_string(),
            ..form()
        }
        .into_new()
        .unwrap_err();
        assert_eq!(err, "Stock must be a whole number of at least 0.");

        let err = ProductForm {
            category_id: String::new(),
            ..form()
        }
        .into_new()
        .unwrap_err();
        assert_eq!(err, "Choose a category.");

        let err = ProductForm {
            name: "  ".to_string(),
            ..form()
        }
        .into_new()
        .unwrap_err();
        assert_eq!(err, "Name is required.");
    }
}
