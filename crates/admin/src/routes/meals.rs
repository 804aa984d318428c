//! Meal kit management.
//!
//! Items are entered as one `Product | quantity | unit` row each. The API
//! only accepts items when a meal is created, so the edit form changes the
//! meal's own fields and lists its items read-only.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::Path,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use spice_hub_core::MealId;
use spice_hub_core::models::{Meal, MealUpdate, NewMeal, NewMealItem, Product, ProductQuery};

use crate::filters;
use crate::forms::{checked, item_lines, non_blank, split_list};
use crate::middleware::RequireAdmin;
use crate::views::Layout;

/// Ingredient line shown in listings and the edit form.
#[derive(Debug, Clone)]
pub struct MealItemView {
    pub product: String,
    pub quantity: f64,
    pub unit: String,
}

#[derive(Debug, Clone)]
pub struct MealRow {
    pub id: String,
    pub name: String,
    pub serves: i32,
    pub active: bool,
    pub image: Option<String>,
    pub items: Vec<MealItemView>,
}

impl From<&Meal> for MealRow {
    fn from(meal: &Meal) -> Self {
        Self {
            id: meal.id.to_string(),
            name: meal.name.clone(),
            serves: meal.serves,
            active: meal.is_active,
            image: meal.image.clone(),
            items: meal
                .items
                .iter()
                .map(|i| MealItemView {
                    product: i.product_name.clone(),
                    quantity: i.quantity,
                    unit: i.unit.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "meals/index.html")]
pub struct MealsIndexTemplate {
    pub layout: Layout,
    pub meals: Vec<MealRow>,
}

/// All meals, including inactive ones.
#[instrument(skip(admin), fields(user_id = %admin.admin.user_id))]
pub async fn index(admin: RequireAdmin) -> MealsIndexTemplate {
    let meals = admin
        .or_default(admin.api.list_all_meals().await, "Failed to load meals.")
        .await;
    MealsIndexTemplate {
        meals: meals.iter().map(MealRow::from).collect(),
        layout: admin.layout("/meals").await,
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MealForm {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub serves: String,
    #[serde(default)]
    pub recipe: Option<String>,
    #[serde(default)]
    pub add_ons: String,
    #[serde(default)]
    pub is_active: Option<String>,
    /// Only read on create.
    #[serde(default)]
    pub items: String,
}

impl MealForm {
    fn name(&self) -> Result<String, String> {
        non_blank(Some(&self.name)).ok_or_else(|| "Name is required.".to_string())
    }

    fn serves(&self) -> Result<i32, String> {
        self.serves
            .trim()
            .parse::<i32>()
            .ok()
            .filter(|s| *s > 0)
            .ok_or_else(|| "Serves must be a whole number of at least 1.".to_string())
    }

    fn add_ons(&self) -> Option<Vec<String>> {
        Some(split_list(&self.add_ons)).filter(|a| !a.is_empty())
    }

    /// Validate into a create payload, resolving item rows against `products`.
    ///
    /// # Errors
    ///
    /// Returns a message describing the first invalid field or item row.
    pub fn into_new(self, products: &[Product]) -> Result<NewMeal, String> {
        let items = item_lines(&self.items, products)?
            .into_iter()
            .map(|line| {
                let (quantity, unit) = line.quantity_and_unit()?;
                Ok(NewMealItem {
                    product_id: line.product_id,
                    product_name: line.product_name,
                    quantity,
                    unit,
                })
            })
            .collect::<Result<Vec<_>, String>>()?;
        if items.is_empty() {
            return Err("Add at least one item.".to_string());
        }
        Ok(NewMeal {
            name: self.name()?,
            serves: self.serves()?,
            add_ons: self.add_ons(),
            is_active: checked(self.is_active.as_deref()),
            description: non_blank(self.description.as_deref()),
            image: non_blank(self.image.as_deref()),
            recipe: non_blank(self.recipe.as_deref()),
            items,
        })
    }

    /// # Errors
    ///
    /// Returns a message describing the first invalid field.
    pub fn into_update(self) -> Result<MealUpdate, String> {
        Ok(MealUpdate {
            name: Some(self.name()?),
            serves: Some(self.serves()?),
            add_ons: Some(split_list(&self.add_ons)),
            is_active: Some(checked(self.is_active.as_deref())),
            description: non_blank(self.description.as_deref()),
            image: non_blank(self.image.as_deref()),
            recipe: non_blank(self.recipe.as_deref()),
        })
    }
}

impl From<&Meal> for MealForm {
    fn from(meal: &Meal) -> Self {
        Self {
            name: meal.name.clone(),
            description: meal.description.clone(),
            image: meal.image.clone(),
            serves: meal.serves.to_string(),
            recipe: meal.recipe.clone(),
            add_ons: meal.add_ons.as_deref().unwrap_or_default().join(", "),
            is_active: meal.is_active.then(|| "on".to_string()),
            items: String::new(),
        }
    }
}

#[derive(Template, WebTemplate)]
#[template(path = "meals/form.html")]
pub struct MealFormTemplate {
    pub layout: Layout,
    pub title: String,
    pub action: String,
    pub form: MealForm,
    /// Existing items when editing. Empty on the create form.
    pub items: Vec<MealItemView>,
    pub editing: bool,
    pub product_names: Vec<String>,
}

#[instrument(skip(admin), fields(user_id = %admin.admin.user_id))]
pub async fn new_form(admin: RequireAdmin) -> MealFormTemplate {
    let products = admin
        .or_default(
            admin.api.list_products(&ProductQuery::default()).await,
            "Failed to load products.",
        )
        .await;
    MealFormTemplate {
        title: "New meal".to_string(),
        action: "/meals".to_string(),
        form: MealForm {
            serves: "4".to_string(),
            is_active: Some("on".to_string()),
            ..MealForm::default()
        },
        items: Vec::new(),
        editing: false,
        product_names: products.into_iter().map(|p| p.name).collect(),
        layout: admin.layout("/meals").await,
    }
}

#[instrument(skip(admin, form), fields(user_id = %admin.admin.user_id))]
pub async fn create(admin: RequireAdmin, Form(form): Form<MealForm>) -> Redirect {
    let products = match admin.api.list_products(&ProductQuery::default()).await {
        Ok(products) => products,
        Err(e) => {
            admin.report(&e, "Failed to load products.").await;
            return Redirect::to("/meals/new");
        }
    };
    let meal = match form.into_new(&products) {
        Ok(meal) => meal,
        Err(message) => {
            admin.flash.error(message).await;
            return Redirect::to("/meals/new");
        }
    };
    match admin.api.create_meal(&meal).await {
        Ok(created) => {
            tracing::info!(meal_id = %created.id, items = created.items.len(), "Meal created");
            admin.flash.success(format!("Created {}.", created.name)).await;
            Redirect::to("/meals")
        }
        Err(e) => {
            admin.report(&e, "Failed to create meal.").await;
            Redirect::to("/meals/new")
        }
    }
}

#[instrument(skip(admin), fields(user_id = %admin.admin.user_id))]
pub async fn edit_form(admin: RequireAdmin, Path(id): Path<MealId>) -> Response {
    let meal = match admin.api.get_meal(id).await {
        Ok(meal) => meal,
        Err(e) => {
            admin.report(&e, "Failed to load meal.").await;
            return Redirect::to("/meals").into_response();
        }
    };
    MealFormTemplate {
        title: format!("Edit {}", meal.name),
        action: format!("/meals/{id}"),
        form: MealForm::from(&meal),
        items: MealRow::from(&meal).items,
        editing: true,
        product_names: Vec::new(),
        layout: admin.layout("/meals").await,
    }
    .into_response()
}

#[instrument(skip(admin, form), fields(user_id = %admin.admin.user_id))]
pub async fn update(
    admin: RequireAdmin,
    Path(id): Path<MealId>,
    Form(form): Form<MealForm>,
) -> Redirect {
    let edit = format!("/meals/{id}/edit");
    let update = match form.into_update() {
        Ok(update) => update,
        Err(message) => {
            admin.flash.error(message).await;
            return Redirect::to(&edit);
        }
    };
    match admin.api.update_meal(id, &update).await {
        Ok(meal) => {
            admin.flash.success(format!("Saved {}.", meal.name)).await;
            Redirect::to("/meals")
        }
        Err(e) => {
            admin.report(&e, "Failed to save meal.").await;
            Redirect::to(&edit)
        }
    }
}

/// Flip a meal between active and inactive.
#[instrument(skip(admin), fields(user_id = %admin.admin.user_id))]
pub async fn toggle(admin: RequireAdmin, Path(id): Path<MealId>) -> Redirect {
    let meal = match admin.api.get_meal(id).await {
        Ok(meal) => meal,
        Err(e) => {
            admin.report(&e, "Failed to load meal.").await;
            return Redirect::to("/meals");
        }
    };
    let update = MealUpdate {
        is_active: Some(!meal.is_active),
        ..MealUpdate::default()
    };
    match admin.api.update_meal(id, &update).await {
        Ok(meal) => {
            let state = if meal.is_active { "active" } else { "inactive" };
            admin.flash.success(format!("{} is now {state}.", meal.name)).await;
        }
        Err(e) => admin.report(&e, "Failed to update meal.").await,
    }
    Redirect::to("/meals")
}

#[instrument(skip(admin), fields(user_id = %admin.admin.user_id))]
pub async fn delete(admin: RequireAdmin, Path(id): Path<MealId>) -> Redirect {
    match admin.api.delete_meal(id).await {
        Ok(_) => admin.flash.success("Meal deleted.").await,
        Err(e) => admin.report(&e, "Failed to delete meal.").await,
    }
    Redirect::to("/meals")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use spice_hub_core::{CategoryId, ProductId, PublishStatus};

    fn product(name: &str) -> Product {
        Product {
            id: ProductId::new(),
            name: name.to_string(),
            price: Decimal::from(150),
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

    fn form(items: &str) -> MealForm {
        MealForm {
            name: "Pilau Night".to_string(),
            serves: "6".to_string(),
            add_ons: "kachumbari".to_string(),
            items: items.to_string(),
            ..MealForm::default()
        }
    }

    #[test]
    fn test_into_new_builds_items() {
        let products = vec![product("Pilau Masala"), product("Cumin")];
        let meal = form("Pilau Masala | 2 | tbsp\ncumin | 1 | tsp")
            .into_new(&products)
            .unwrap();
        assert_eq!(meal.serves, 6);
        assert!(!meal.is_active);
        assert_eq!(meal.add_ons, Some(vec!["kachumbari".to_string()]));
        assert_eq!(meal.items.len(), 2);
        assert_eq!(meal.items[1].product_id, products[1].id);
        assert_eq!(meal.items[1].unit, "tsp");
    }

    #[test]
    fn test_into_new_requires_items() {
        let err = form("  ").into_new(&[]).unwrap_err();
        assert_eq!(err, "Add at least one item.");
    }

    #[test]
    fn test_into_update_rejects_zero_serves() {
        let err = MealForm {
            serves: "0".to_string(),
            ..form("")
        }
        .into_update()
        .unwrap_err();
        assert_eq!(err, "Serves must be a whole number of at least 1.");
    }
}
