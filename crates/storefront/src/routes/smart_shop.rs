//! Smart shop: meal bundles, health bundles, and quick recommendations.

use askama::Template;
use askama_web::WebTemplate;
use axum::{Form, response::Redirect};
use serde::Deserialize;
use tracing::instrument;

use spice_hub_core::bundles::{
    BundleLine, RecommendationKind, health_bundle, meal_bundle, recommendation_bundle,
};
use spice_hub_core::models::{HealthCategory, Meal, ProductQuery};
use spice_hub_core::{HealthCategoryId, MealId};

use crate::error::Result;
use crate::filters;
use crate::middleware::Shopper;
use crate::views::Layout;

/// Largest meal multiplier accepted from the form.
const MAX_MULTIPLIER: f64 = 10.0;

/// Ingredient or recommendation row.
#[derive(Debug, Clone)]
pub struct BundleItemView {
    pub name: String,
    pub amount: String,
    pub note: Option<String>,
}

#[derive(Debug, Clone)]
pub struct MealView {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub serves: i32,
    pub recipe: Option<String>,
    pub add_ons: Vec<String>,
    pub items: Vec<BundleItemView>,
}

impl From<&Meal> for MealView {
    fn from(meal: &Meal) -> Self {
        Self {
            id: meal.id.to_string(),
            name: meal.name.clone(),
            description: meal.description.clone(),
            image: meal.image.clone(),
            serves: meal.serves,
            recipe: meal.recipe.clone(),
            add_ons: meal.add_ons.clone().unwrap_or_default(),
            items: meal
                .items
                .iter()
                .map(|item| BundleItemView {
                    name: item.product_name.clone(),
                    amount: format!("{} {}", item.quantity, item.unit),
                    note: None,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HealthView {
    pub id: String,
    pub name: String,
    pub icon: Option<String>,
    pub description: Option<String>,
    pub benefits: Option<String>,
    pub usage: Option<String>,
    pub safety_notes: Option<String>,
    pub items: Vec<BundleItemView>,
}

impl From<&HealthCategory> for HealthView {
    fn from(category: &HealthCategory) -> Self {
        Self {
            id: category.id.to_string(),
            name: category.name.clone(),
            icon: category.icon.clone(),
            description: category.description.clone(),
            benefits: category.benefits.clone(),
            usage: category.usage.clone(),
            safety_notes: category.safety_notes.clone(),
            items: category
                .recommendations
                .iter()
                .map(|rec| BundleItemView {
                    name: rec.product_name.clone(),
                    amount: format!("{} {}", rec.quantity, rec.unit),
                    note: Some(rec.frequency.clone()),
                })
                .collect(),
        }
    }
}

/// Quick-pick group, e.g. cooking: Pilau, Beef Stew, ...
#[derive(Debug, Clone)]
pub struct RecommendationGroup {
    pub kind: String,
    pub title: String,
    pub choices: Vec<&'static str>,
}

#[derive(Template, WebTemplate)]
#[template(path = "smart_shop.html")]
pub struct SmartShopTemplate {
    pub layout: Layout,
    pub meals: Vec<MealView>,
    pub health: Vec<HealthView>,
    pub recommendations: Vec<RecommendationGroup>,
}

/// Display meals, health bundles, and quick picks.
#[instrument(skip(shopper))]
pub async fn index(shopper: Shopper) -> SmartShopTemplate {
    let api = shopper.api();
    let (meals, health) = tokio::join!(api.list_meals(), api.list_health_categories());
    let meals = shopper.or_default(meals, "We couldn't load meals.").await;
    let health = shopper
        .or_default(health, "We couldn't load health bundles.")
        .await;

    SmartShopTemplate {
        meals: meals.iter().map(MealView::from).collect(),
        health: health.iter().map(HealthView::from).collect(),
        recommendations: [
            (RecommendationKind::Cooking, "What are you cooking?"),
            (RecommendationKind::Health, "What do you need?"),
        ]
        .into_iter()
        .map(|(kind, title)| RecommendationGroup {
            kind: kind.as_str().to_string(),
            title: title.to_string(),
            choices: kind.choices(),
        })
        .collect(),
        layout: shopper.layout().await,
    }
}

/// Bundle form. `kind` is `meal`, `health`, or `recommendation`.
#[derive(Debug, Deserialize)]
pub struct BundleForm {
    pub kind: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub multiplier: Option<f64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub choice: Option<String>,
}

/// Which bundle a form asks for.
#[derive(Debug, Clone, PartialEq)]
pub enum BundleRequest {
    Meal { id: MealId, multiplier: f64 },
    Health { id: HealthCategoryId },
    Recommendation { kind: RecommendationKind, choice: String },
}

impl BundleForm {
    /// Validate the form. Multipliers are clamped to `(0, 10]`; a missing
    /// one means 1.
    ///
    /// # Errors
    ///
    /// Returns a shopper-facing message if the form is incomplete.
    pub fn request(&self) -> std::result::Result<BundleRequest, &'static str> {
        let id = self.id.as_deref().map(str::trim).unwrap_or_default();
        match self.kind.as_str() {
            "meal" => {
                let id = id.parse().map_err(|_| "Please choose a meal.")?;
                let multiplier = self
                    .multiplier
                    .filter(|m| m.is_finite() && *m > 0.0)
                    .map_or(1.0, |m| m.min(MAX_MULTIPLIER));
                Ok(BundleRequest::Meal { id, multiplier })
            }
            "health" => {
                let id = id.parse().map_err(|_| "Please choose a health bundle.")?;
                Ok(BundleRequest::Health { id })
            }
            "recommendation" => {
                let kind = self
                    .category
                    .as_deref()
                    .and_then(|c| c.parse().ok())
                    .ok_or("Please choose what you're shopping for.")?;
                let choice = self
                    .choice
                    .as_deref()
                    .map(str::trim)
                    .filter(|c| !c.is_empty())
                    .ok_or("Please choose what you're shopping for.")?;
                Ok(BundleRequest::Recommendation {
                    kind,
                    choice: choice.to_string(),
                })
            }
            _ => Err("Unknown bundle."),
        }
    }
}

/// Add a bundle's spices to the cart.
///
/// # Errors
///
/// Returns an error if the session cannot be written.
#[instrument(skip(shopper, form), fields(kind = %form.kind))]
pub async fn add_bundle(shopper: Shopper, Form(form): Form<BundleForm>) -> Result<Redirect> {
    let request = match form.request() {
        Ok(request) => request,
        Err(message) => {
            shopper.flash.error(message).await;
            return Ok(Redirect::to("/smart-shop"));
        }
    };

    let api = shopper.api();
    let products = match api.list_products(&ProductQuery::default()).await {
        Ok(products) => products,
        Err(e) => {
            shopper.report(&e, "We couldn't load products.").await;
            return Ok(Redirect::to("/smart-shop"));
        }
    };

    let lines: Vec<BundleLine> = match &request {
        BundleRequest::Meal { id, multiplier } => match api.get_meal(*id).await {
            Ok(meal) => meal_bundle(&meal, *multiplier, &products),
            Err(e) => {
                shopper.report(&e, "We couldn't load that meal.").await;
                return Ok(Redirect::to("/smart-shop"));
            }
        },
        BundleRequest::Health { id } => match api.get_health_category(*id).await {
            Ok(category) => health_bundle(&category, &products),
            Err(e) => {
                shopper.report(&e, "We couldn't load that bundle.").await;
                return Ok(Redirect::to("/smart-shop"));
            }
        },
        BundleRequest::Recommendation { kind, choice } => {
            recommendation_bundle(*kind, choice, &products)
        }
    };

    if lines.is_empty() {
        shopper
            .flash
            .info("None of those spices are available right now.")
            .await;
        return Ok(Redirect::to("/smart-shop"));
    }

    let mut cart = shopper.cart().await;
    let mut added = 0_usize;
    for line in &lines {
        let Some(product) = products.iter().find(|p| p.id == line.product_id) else {
            continue;
        };
        if let Err(e) = cart.add_item(product.summary(), line.grams, None).await {
            shopper.report(&e, &e.user_message()).await;
            break;
        }
        added += 1;
    }
    shopper.save_cart(&cart).await?;

    if added > 0 {
        tracing::info!(lines = added, "Bundle added to cart");
        shopper
            .flash
            .success(format!("Added {added} spices to your cart."))
            .await;
    }
    Ok(Redirect::to("/cart"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(kind: &str) -> BundleForm {
        BundleForm {
            kind: kind.to_string(),
            id: None,
            multiplier: None,
            category: None,
            choice: None,
        }
    }

    #[test]
    fn test_meal_multiplier_defaults_and_clamps() {
        let id = MealId::new();
        let mut meal = form("meal");
        meal.id = Some(id.to_string());
        assert_eq!(
            meal.request().unwrap(),
            BundleRequest::Meal { id, multiplier: 1.0 }
        );

        meal.multiplier = Some(40.0);
        assert_eq!(
            meal.request().unwrap(),
            BundleRequest::Meal {
                id,
                multiplier: MAX_MULTIPLIER
            }
        );

        meal.multiplier = Some(-2.0);
        assert_eq!(
            meal.request().unwrap(),
            BundleRequest::Meal { id, multiplier: 1.0 }
        );
    }

    #[test]
    fn test_meal_requires_id() {
        assert_eq!(form("meal").request(), Err("Please choose a meal."));
    }

    #[test]
    fn test_recommendation_request() {
        let mut pick = form("recommendation");
        pick.category = Some("cooking".into());
        pick.choice = Some("Pilau".into());
        assert_eq!(
            pick.request().unwrap(),
            BundleRequest::Recommendation {
                kind: RecommendationKind::Cooking,
                choice: "Pilau".into()
            }
        );

        pick.category = Some("baking".into());
        assert!(pick.request().is_err());
    }

    #[test]
    fn test_unknown_kind() {
        assert_eq!(form("gift").request(), Err("Unknown bundle."));
    }
}
