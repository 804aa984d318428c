//! Sale (promotion) management.
//!
//! Sale products are `Product | discounted price` rows. A row without a
//! price gets the sale's percentage taken off the catalog price.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::Path,
    response::{IntoResponse, Redirect, Response},
};
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use spice_hub_core::models::{NewSale, NewSaleProduct, Product, ProductQuery, Sale, SaleUpdate};
use spice_hub_core::{SaleId, format_ksh};

use crate::filters;
use crate::forms::{amount, checked, datetime, datetime_value, item_lines, non_blank};
use crate::middleware::RequireAdmin;
use crate::views::Layout;

#[derive(Debug, Clone)]
pub struct SaleRow {
    pub id: String,
    pub name: String,
    pub discount: String,
    pub starts: String,
    pub ends: String,
    pub products: usize,
    pub active: bool,
    pub running: bool,
}

impl SaleRow {
    fn new(sale: &Sale, now: DateTime<Utc>) -> Self {
        Self {
            id: sale.id.to_string(),
            name: sale.name.clone(),
            discount: format!("{}%", sale.discount_percentage.normalize()),
            starts: sale.start_date.format("%Y-%m-%d %H:%M").to_string(),
            ends: sale.end_date.format("%Y-%m-%d %H:%M").to_string(),
            products: sale.products.len(),
            active: sale.is_active,
            running: sale.is_running(now),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "sales/index.html")]
pub struct SalesIndexTemplate {
    pub layout: Layout,
    pub sales: Vec<SaleRow>,
}

#[instrument(skip(admin), fields(user_id = %admin.admin.user_id))]
pub async fn index(admin: RequireAdmin) -> SalesIndexTemplate {
    let sales = admin
        .or_default(admin.api.list_sales().await, "Failed to load sales.")
        .await;
    let now = Utc::now();
    SalesIndexTemplate {
        sales: sales.iter().map(|s| SaleRow::new(s, now)).collect(),
        layout: admin.layout("/sales").await,
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SaleForm {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub discount_percentage: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub is_active: Option<String>,
    #[serde(default)]
    pub banner_image: Option<String>,
    #[serde(default)]
    pub banner_text: Option<String>,
    /// Only read on create.
    #[serde(default)]
    pub products: String,
}

/// Validated scalar fields shared by create and update.
struct SaleFields {
    name: String,
    discount: Decimal,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl SaleForm {
    fn fields(&self) -> Result<SaleFields, String> {
        let name = non_blank(Some(&self.name)).ok_or_else(|| "Name is required.".to_string())?;
        let discount = amount(&self.discount_percentage, "Discount")?;
        if discount > Decimal::ONE_HUNDRED {
            return Err("Discount cannot exceed 100%.".to_string());
        }
        let start = datetime(&self.start_date, "Start date")?;
        let end = datetime(&self.end_date, "End date")?;
        if end <= start {
            return Err("End date must be after the start date.".to_string());
        }
        Ok(SaleFields {
            name,
            discount,
            start,
            end,
        })
    }

    /// # Errors
    ///
    /// Returns a message describing the first invalid field or product row.
    pub fn into_new(self, products: &[Product]) -> Result<NewSale, String> {
        let fields = self.fields()?;
        let sale_products = item_lines(&self.products, products)?
            .into_iter()
            .map(|line| {
                let price = match line.fields.first().filter(|p| !p.is_empty()) {
                    Some(raw) => amount(raw, "Discounted price")?,
                    None => {
                        let catalog = products
                            .iter()
                            .find(|p| p.id == line.product_id)
                            .map_or(Decimal::ZERO, |p| p.price);
                        discounted(catalog, fields.discount)
                    }
                };
                Ok(NewSaleProduct {
                    product_id: line.product_id,
                    discounted_price: price,
                })
            })
            .collect::<Result<Vec<_>, String>>()?;
        Ok(NewSale {
            name: fields.name,
            discount_percentage: fields.discount,
            start_date: fields.start,
            end_date: fields.end,
            is_active: checked(self.is_active.as_deref()),
            description: non_blank(self.description.as_deref()),
            banner_image: non_blank(self.banner_image.as_deref()),
            banner_text: non_blank(self.banner_text.as_deref()),
            products: sale_products,
        })
    }

    /// # Errors
    ///
    /// Returns a message describing the first invalid field.
    pub fn into_update(self) -> Result<SaleUpdate, String> {
        let fields = self.fields()?;
        Ok(SaleUpdate {
            name: Some(fields.name),
            discount_percentage: Some(fields.discount),
            start_date: Some(fields.start),
            end_date: Some(fields.end),
            is_active: Some(checked(self.is_active.as_deref())),
            description: non_blank(self.description.as_deref()),
            banner_image: non_blank(self.banner_image.as_deref()),
            banner_text: non_blank(self.banner_text.as_deref()),
        })
    }
}

/// `price` less `percent`, to the cent.
fn discounted(price: Decimal, percent: Decimal) -> Decimal {
    (price * (Decimal::ONE_HUNDRED - percent) / Decimal::ONE_HUNDRED).round_dp(2)
}

impl From<&Sale> for SaleForm {
    fn from(sale: &Sale) -> Self {
        Self {
            name: sale.name.clone(),
            description: sale.description.clone(),
            discount_percentage: sale.discount_percentage.normalize().to_string(),
            start_date: datetime_value(sale.start_date),
            end_date: datetime_value(sale.end_date),
            is_active: sale.is_active.then(|| "on".to_string()),
            banner_image: sale.banner_image.clone(),
            banner_text: sale.banner_text.clone(),
            products: String::new(),
        }
    }
}

/// Product already on sale, shown read-only when editing.
#[derive(Debug, Clone)]
pub struct SaleProductView {
    pub name: String,
    pub price: String,
}

#[derive(Template, WebTemplate)]
#[template(path = "sales/form.html")]
pub struct SaleFormTemplate {
    pub layout: Layout,
    pub title: String,
    pub action: String,
    pub form: SaleForm,
    pub products: Vec<SaleProductView>,
    pub editing: bool,
    pub product_names: Vec<String>,
}

#[instrument(skip(admin), fields(user_id = %admin.admin.user_id))]
pub async fn new_form(admin: RequireAdmin) -> SaleFormTemplate {
    let products = admin
        .or_default(
            admin.api.list_products(&ProductQuery::default()).await,
            "Failed to load products.",
        )
        .await;
    let now = Utc::now();
    SaleFormTemplate {
        title: "New sale".to_string(),
        action: "/sales".to_string(),
        form: SaleForm {
            start_date: datetime_value(now),
            end_date: datetime_value(now + Duration::days(7)),
            is_active: Some("on".to_string()),
            ..SaleForm::default()
        },
        products: Vec::new(),
        editing: false,
        product_names: products.into_iter().map(|p| p.name).collect(),
        layout: admin.layout("/sales").await,
    }
}

#[instrument(skip(admin, form), fields(user_id = %admin.admin.user_id))]
pub async fn create(admin: RequireAdmin, Form(form): Form<SaleForm>) -> Redirect {
    let products = match admin.api.list_products(&ProductQuery::default()).await {
        Ok(products) => products,
        Err(e) => {
            admin.report(&e, "Failed to load products.").await;
            return Redirect::to("/sales/new");
        }
    };
    let sale = match form.into_new(&products) {
        Ok(sale) => sale,
        Err(message) => {
            admin.flash.error(message).await;
            return Redirect::to("/sales/new");
        }
    };
    match admin.api.create_sale(&sale).await {
        Ok(created) => {
            tracing::info!(sale_id = %created.id, "Sale created");
            admin.flash.success(format!("Created {}.", created.name)).await;
            Redirect::to("/sales")
        }
        Err(e) => {
            admin.report(&e, "Failed to create sale.").await;
            Redirect::to("/sales/new")
        }
    }
}

#[instrument(skip(admin), fields(user_id = %admin.admin.user_id))]
pub async fn edit_form(admin: RequireAdmin, Path(id): Path<SaleId>) -> Response {
    let sale = match admin.api.get_sale(id).await {
        Ok(sale) => sale,
        Err(e) => {
            admin.report(&e, "Failed to load sale.").await;
            return Redirect::to("/sales").into_response();
        }
    };
    let products = sale
        .products
        .iter()
        .map(|p| SaleProductView {
            name: p
                .product
                .as_ref()
                .and_then(|v| v.get("name"))
                .and_then(serde_json::Value::as_str)
                .map_or_else(|| p.product_id.to_string(), str::to_owned),
            price: format_ksh(p.discounted_price),
        })
        .collect();
    SaleFormTemplate {
        title: format!("Edit {}", sale.name),
        action: format!("/sales/{id}"),
        form: SaleForm::from(&sale),
        products,
        editing: true,
        product_names: Vec::new(),
        layout: admin.layout("/sales").await,
    }
    .into_response()
}

#[instrument(skip(admin, form), fields(user_id = %admin.admin.user_id))]
pub async fn update(
    admin: RequireAdmin,
    Path(id): Path<SaleId>,
    Form(form): Form<SaleForm>,
) -> Redirect {
    let edit = format!("/sales/{id}/edit");
    let update = match form.into_update() {
        Ok(update) => update,
        Err(message) => {
            admin.flash.error(message).await;
            return Redirect::to(&edit);
        }
    };
    match admin.api.update_sale(id, &update).await {
        Ok(sale) => {
            admin.flash.success(format!("Saved {}.", sale.name)).await;
            Redirect::to("/sales")
        }
        Err(e) => {
            admin.report(&e, "Failed to save sale.").await;
            Redirect::to(&edit)
        }
    }
}

#[instrument(skip(admin), fields(user_id = %admin.admin.user_id))]
pub async fn delete(admin: RequireAdmin, Path(id): Path<SaleId>) -> Redirect {
    match admin.api.delete_sale(id).await {
        Ok(_) => admin.flash.success("Sale deleted.").await,
        Err(e) => admin.report(&e, "Failed to delete sale.").await,
    }
    Redirect::to("/sales")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use spice_hub_core::{CategoryId, ProductId, PublishStatus};

    fn product(name: &str, price: i64) -> Product {
        Product {
            id: ProductId::new(),
            name: name.to_string(),
            price: Decimal::from(price),
            original_price: None,
            stock: 5,
            rating: 0.0,
            review_count: 0,
            is_sale: false,
            is_new: false,
            is_featured: false,
            containers: vec![],
            description: None,
            images: vec![],
            status: PublishStatus::Active,
            cost_per_item: None,
            main_image: None,
            category_id: CategoryId::new(),
            category: None,
            created_at: Utc::now(),
        }
    }

    fn form() -> SaleForm {
        SaleForm {
            name: "Harvest".to_string(),
            discount_percentage: "15".to_string(),
            start_date: "2025-06-01T00:00".to_string(),
            end_date: "2025-06-08T00:00".to_string(),
            is_active: Some("on".to_string()),
            ..SaleForm::default()
        }
    }

    #[test]
    fn test_missing_price_takes_percentage_off() {
        let products = vec![product("Cumin", 200), product("Cloves", 300)];
        let sale = SaleForm {
            products: "Cumin\nCloves | 250".to_string(),
            ..form()
        }
        .into_new(&products)
        .unwrap();
        assert_eq!(sale.products[0].discounted_price, Decimal::from(170));
        assert_eq!(sale.products[1].discounted_price, Decimal::from(250));
        assert!(sale.is_active);
    }

    #[test]
    fn test_dates_must_be_ordered() {
        let err = SaleForm {
            end_date: "2025-05-01T00:00".to_string(),
            ..form()
        }
        .into_update()
        .unwrap_err();
        assert_eq!(err, "End date must be after the start date.");
    }

    #[test]
    fn test_discount_capped() {
        let err = SaleForm {
            discount_percentage: "120".to_string(),
            ..form()
        }
        .into_update()
        .unwrap_err();
        assert_eq!(err, "Discount cannot exceed 100%.");
    }
}
