//! Meal spice kits and health bundles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{HealthCategoryId, HealthRecommendationId, MealId, MealItemId, ProductId};

const fn default_serves() -> i32 {
    4
}

const fn default_true() -> bool {
    true
}

fn default_frequency() -> String {
    "daily".to_owned()
}

/// One spice in a meal kit. `quantity` is in priced units (100 g each).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealItem {
    pub id: MealItemId,
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: f64,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meal {
    pub id: MealId,
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
    pub add_ons: Option<Vec<String>>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub items: Vec<MealItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMealItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: f64,
    pub unit: String,
}

/// Payload for `POST /meals/meals`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMeal {
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
    pub add_ons: Option<Vec<String>>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub items: Vec<NewMealItem>,
}

/// Payload for `PUT /meals/meals/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MealUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serves: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_ons: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// A product recommended for a health goal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthRecommendation {
    pub id: HealthRecommendationId,
    pub category_id: HealthCategoryId,
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: f64,
    pub unit: String,
    #[serde(default = "default_frequency")]
    pub frequency: String,
}

/// A health goal such as "Immunity Boost".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthCategory {
    pub id: HealthCategoryId,
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
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub recommendations: Vec<HealthRecommendation>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewHealthRecommendation {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: f64,
    pub unit: String,
    #[serde(default = "default_frequency")]
    pub frequency: String,
}

/// Payload for `POST /health/health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewHealthCategory {
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
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub recommendations: Vec<NewHealthRecommendation>,
}

/// Payload for `PUT /health/health/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthCategoryUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benefits: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safety_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_meal_defaults() {
        let meal: NewMeal = serde_json::from_value(serde_json::json!({
            "name": "Pilau Night",
            "items": []
        }))
        .unwrap();
        assert_eq!(meal.serves, 4);
        assert!(meal.is_active);
    }

    #[test]
    fn test_recommendation_frequency_defaults_to_daily() {
        let rec: NewHealthRecommendation = serde_json::from_value(serde_json::json!({
            "product_id": "0b5b7f0e-8f0c-4d43-9a52-3f3c9d1e2a10",
            "product_name": "Turmeric",
            "quantity": 1.0,
            "unit": "tbsp"
        }))
        .unwrap();
        assert_eq!(rec.frequency, "daily");
    }
}
