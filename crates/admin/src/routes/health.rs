//! Health bundle management.
//!
//! Recommendations are entered as `Product | quantity | unit | frequency`
//! rows; frequency defaults to `daily`. Like meals, recommendations are
//! fixed once the bundle exists.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::Path,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use spice_hub_core::HealthCategoryId;
use spice_hub_core::models::{
    HealthCategory, HealthCategoryUpdate, NewHealthCategory, NewHealthRecommendation, Product,
    ProductQuery,
};

use crate::filters;
use crate::forms::{checked, item_lines, non_blank};
use crate::middleware::RequireAdmin;
use crate::views::Layout;

const DEFAULT_FREQUENCY: &str = "daily";

#[derive(Debug, Clone)]
pub struct RecommendationView {
    pub product: String,
    pub quantity: f64,
    pub unit: String,
    pub frequency: String,
}

#[derive(Debug, Clone)]
pub struct HealthRow {
    pub id: String,
    pub name: String,
    pub icon: Option<String>,
    pub active: bool,
    pub recommendations: Vec<RecommendationView>,
}

impl From<&HealthCategory> for HealthRow {
    fn from(category: &HealthCategory) -> Self {
        Self {
            id: category.id.to_string(),
            name: category.name.clone(),
            icon: category.icon.clone(),
            active: category.is_active,
            recommendations: category
                .recommendations
                .iter()
                .map(|r| RecommendationView {
                    product: r.product_name.clone(),
                    quantity: r.quantity,
                    unit: r.unit.clone(),
                    frequency: r.frequency.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "health/index.html")]
pub struct HealthIndexTemplate {
    pub layout: Layout,
    pub categories: Vec<HealthRow>,
}

#[instrument(skip(admin), fields(user_id = %admin.admin.user_id))]
pub async fn index(admin: RequireAdmin) -> HealthIndexTemplate {
    let categories = admin
        .or_default(
            admin.api.list_all_health_categories().await,
            "Failed to load health bundles.",
        )
        .await;
    HealthIndexTemplate {
        categories: categories.iter().map(HealthRow::from).collect(),
        layout: admin.layout("/health").await,
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HealthForm {
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
    #[serde(default)]
    pub is_active: Option<String>,
    #[serde(default)]
    pub recommendations: String,
}

impl HealthForm {
    fn name(&self) -> Result<String, String> {
        non_blank(Some(&self.name)).ok_or_else(|| "Name is required.".to_string())
    }

    /// # Errors
    ///
    /// Returns a message describing the first invalid field or row.
    pub fn into_new(self, products: &[Product]) -> Result<NewHealthCategory, String> {
        let recommendations = item_lines(&self.recommendations, products)?
            .into_iter()
            .map(|line| {
                let (quantity, unit) = line.quantity_and_unit()?;
                let frequency = line
                    .fields
                    .get(2)
                    .filter(|f| !f.is_empty())
                    .cloned()
                    .unwrap_or_else(|| DEFAULT_FREQUENCY.to_string());
                Ok(NewHealthRecommendation {
                    product_id: line.product_id,
                    product_name: line.product_name,
                    quantity,
                    unit,
                    frequency,
                })
            })
            .collect::<Result<Vec<_>, String>>()?;
        if recommendations.is_empty() {
            return Err("Add at least one recommendation.".to_string());
        }
        Ok(NewHealthCategory {
            name: self.name()?,
            description: non_blank(self.description.as_deref()),
            icon: non_blank(self.icon.as_deref()),
            benefits: non_blank(self.benefits.as_deref()),
            usage: non_blank(self.usage.as_deref()),
            safety_notes: non_blank(self.safety_notes.as_deref()),
            is_active: checked(self.is_active.as_deref()),
            recommendations,
        })
    }

    /// # Errors
    ///
    /// Returns a message if the name is blank.
    pub fn into_update(self) -> Result<HealthCategoryUpdate, String> {
        Ok(HealthCategoryUpdate {
            name: Some(self.name()?),
            description: non_blank(self.description.as_deref()),
            icon: non_blank(self.icon.as_deref()),
            benefits: non_blank(self.benefits.as_deref()),
            usage: non_blank(self.usage.as_deref()),
            safety_notes: non_blank(self.safety_notes.as_deref()),
            is_active: Some(checked(self.is_active.as_deref())),
        })
    }
}

impl From<&HealthCategory> for HealthForm {
    fn from(category: &HealthCategory) -> Self {
        Self {
            name: category.name.clone(),
            description: category.description.clone(),
            icon: category.icon.clone(),
            benefits: category.benefits.clone(),
            usage: category.usage.clone(),
            safety_notes: category.safety_notes.clone(),
            is_active: category.is_active.then(|| "on".to_string()),
            recommendations: String::new(),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "health/form.html")]
pub struct HealthFormTemplate {
    pub layout: Layout,
    pub title: String,
    pub action: String,
    pub form: HealthForm,
    pub recommendations: Vec<RecommendationView>,
    pub editing: bool,
    pub product_names: Vec<String>,
}

#[instrument(skip(admin), fields(user_id = %admin.admin.user_id))]
pub async fn new_form(admin: RequireAdmin) -> HealthFormTemplate {
    let products = admin
        .or_default(
            admin.api.list_products(&ProductQuery::default()).await,
            "Failed to load products.",
        )
        .await;
    HealthFormTemplate {
        title: "New health bundle".to_string(),
        action: "/health".to_string(),
        form: HealthForm {
            is_active: Some("on".to_string()),
            ..HealthForm::default()
        },
        recommendations: Vec::new(),
        editing: false,
        product_names: products.into_iter().map(|p| p.name).collect(),
        layout: admin.layout("/health").await,
    }
}

#[instrument(skip(admin, form), fields(user_id = %admin.admin.user_id))]
pub async fn create(admin: RequireAdmin, Form(form): Form<HealthForm>) -> Redirect {
    let products = match admin.api.list_products(&ProductQuery::default()).await {
        Ok(products) => products,
        Err(e) => {
            admin.report(&e, "Failed to load products.").await;
            return Redirect::to("/health/new");
        }
    };
    let category = match form.into_new(&products) {
        Ok(category) => category,
        Err(message) => {
            admin.flash.error(message).await;
            return Redirect::to("/health/new");
        }
    };
    match admin.api.create_health_category(&category).await {
        Ok(created) => {
            admin.flash.success(format!("Created {}.", created.name)).await;
            Redirect::to("/health")
        }
        Err(e) => {
            admin.report(&e, "Failed to create health bundle.").await;
            Redirect::to("/health/new")
        }
    }
}

#[instrument(skip(admin), fields(user_id = %admin.admin.user_id))]
pub async fn edit_form(admin: RequireAdmin, Path(id): Path<HealthCategoryId>) -> Response {
    let category = match admin.api.get_health_category(id).await {
        Ok(category) => category,
        Err(e) => {
            admin.report(&e, "Failed to load health bundle.").await;
            return Redirect::to("/health").into_response();
        }
    };
    HealthFormTemplate {
        title: format!("Edit {}", category.name),
        action: format!("/health/{id}"),
        form: HealthForm::from(&category),
        recommendations: HealthRow::from(&category).recommendations,
        editing: true,
        product_names: Vec::new(),
        layout: admin.layout("/health").await,
    }
    .into_response()
}

#[instrument(skip(admin, form), fields(user_id = %admin.admin.user_id))]
pub async fn update(
    admin: RequireAdmin,
    Path(id): Path<HealthCategoryId>,
    Form(form): Form<HealthForm>,
) -> Redirect {
    let edit = format!("/health/{id}/edit");
    let update = match form.into_update() {
        Ok(update) => update,
        Err(message) => {
            admin.flash.error(message).await;
            return Redirect::to(&edit);
        }
    };
    match admin.api.update_health_category(id, &update).await {
        Ok(category) => {
            admin.flash.success(format!("Saved {}.", category.name)).await;
            Redirect::to("/health")
        }
        Err(e) => {
            admin.report(&e, "Failed to save health bundle.").await;
            Redirect::to(&edit)
        }
    }
}

#[instrument(skip(admin), fields(user_id = %admin.admin.user_id))]
pub async fn toggle(admin: RequireAdmin, Path(id): Path<HealthCategoryId>) -> Redirect {
    let current = match admin.api.get_health_category(id).await {
        Ok(category) => category.is_active,
        Err(e) => {
            admin.report(&e, "Failed to load health bundle.").await;
            return Redirect::to("/health");
        }
    };
    let update = HealthCategoryUpdate {
        is_active: Some(!current),
        ..HealthCategoryUpdate::default()
    };
    match admin.api.update_health_category(id, &update).await {
        Ok(category) => {
            let state = if category.is_active { "active" } else { "inactive" };
            admin.flash.success(format!("{} is now {state}.", category.name)).await;
        }
        Err(e) => admin.report(&e, "Failed to update health bundle.").await,
    }
    Redirect::to("/health")
}

#[instrument(skip(admin), fields(user_id = %admin.admin.user_id))]
pub async fn delete(admin: RequireAdmin, Path(id): Path<HealthCategoryId>) -> Redirect {
    match admin.api.delete_health_category(id).await {
        Ok(_) => admin.flash.success("Health bundle deleted.").await,
        Err(e) => admin.report(&e, "Failed to delete health bundle.").await,
    }
    Redirect::to("/health")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use spice_hub_core::{CategoryId, ProductId, PublishStatus};

    fn turmeric() -> Product {
        Product {
            id: ProductId::new(),
            name: "Turmeric".to_string(),
            price: Decimal::from(220),
            original_price: None,
            stock: 12,
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

    #[test]
    fn test_frequency_defaults_to_daily() {
        let form = HealthForm {
            name: "Joint Care".to_string(),
            recommendations: "Turmeric | 1 | tsp\nTurmeric | 2 | tsp | twice daily".to_string(),
            ..HealthForm::default()
        };
        let category = form.into_new(&[turmeric()]).unwrap();
        assert_eq!(category.recommendations[0].frequency, "daily");
        assert_eq!(category.recommendations[1].frequency, "twice daily");
        assert!(!category.is_active);
    }

    #[test]
    fn test_requires_recommendations() {
        let form = HealthForm {
            name: "Joint Care".to_string(),
            ..HealthForm::default()
        };
        assert_eq!(
            form.into_new(&[turmeric()]).unwrap_err(),
            "Add at least one recommendation."
        );
    }
}
