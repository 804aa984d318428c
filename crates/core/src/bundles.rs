//! Smart-shop bundles: meal kits, health bundles, and quick recommendations.
//!
//! Each bundle resolves to cart lines in grams. Lines whose product cannot
//! be found in the catalog are dropped.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::{HealthCategory, Meal, Product};
use crate::types::{DEFAULT_ADD_QUANTITY, GRAMS_PER_UNIT, ProductId};

/// A product and quantity to add to the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BundleLine {
    pub product_id: ProductId,
    pub name: String,
    pub grams: i32,
}

#[allow(clippy::cast_possible_truncation)]
fn units_to_grams(units: f64) -> i32 {
    (units * f64::from(GRAMS_PER_UNIT)).round() as i32
}

fn find<'a>(products: &'a [Product], id: ProductId) -> Option<&'a Product> {
    products.iter().find(|p| p.id == id)
}

/// Lines for a meal kit scaled by `multiplier` (number of kits).
#[must_use]
pub fn meal_bundle(meal: &Meal, multiplier: f64, products: &[Product]) -> Vec<BundleLine> {
    meal.items
        .iter()
        .filter_map(|item| {
            let product = find(products, item.product_id)?;
            Some(BundleLine {
                product_id: product.id,
                name: product.name.clone(),
                grams: units_to_grams(item.quantity * multiplier),
            })
        })
        .filter(|line| line.grams > 0)
        .collect()
}

/// Lines for a health bundle.
#[must_use]
pub fn health_bundle(category: &HealthCategory, products: &[Product]) -> Vec<BundleLine> {
    category
        .recommendations
        .iter()
        .filter_map(|rec| {
            let product = find(products, rec.product_id)?;
            Some(BundleLine {
                product_id: product.id,
                name: product.name.clone(),
                grams: units_to_grams(rec.quantity),
            })
        })
        .filter(|line| line.grams > 0)
        .collect()
}

/// Which question the shopper answered in the recommendation widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationKind {
    Cooking,
    Health,
}

impl RecommendationKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Cooking => "cooking",
            Self::Health => "health",
        }
    }

    /// Choices offered for this kind, in display order.
    #[must_use]
    pub fn choices(self) -> Vec<&'static str> {
        rules(self).iter().map(|(choice, _)| *choice).collect()
    }
}

impl fmt::Display for RecommendationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecommendationKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cooking" => Ok(Self::Cooking),
            "health" => Ok(Self::Health),
            _ => Err(()),
        }
    }
}

type Rule = (&'static str, &'static [&'static str]);

const COOKING_RULES: &[Rule] = &[
    ("Pilau", &["cumin", "coriander", "cardamom", "cloves", "cinnamon"]),
    ("Beef Stew", &["cumin", "coriander", "paprika", "garlic-powder", "black-pepper"]),
    ("Tea", &["cardamom", "cinnamon", "ginger", "cloves", "black-pepper"]),
    ("Veggies", &["cumin", "coriander", "turmeric", "garlic-powder", "ginger"]),
    ("Fish", &["cumin", "coriander", "turmeric", "garlic-powder", "paprika"]),
];

const HEALTH_RULES: &[Rule] = &[
    ("Immunity", &["turmeric", "ginger", "garlic", "black-pepper"]),
    ("Digestion", &["fennel", "cumin", "coriander", "ginger"]),
    ("Energy", &["cinnamon", "ginger", "cardamom", "cloves"]),
    ("Joints", &["turmeric", "ginger", "black-pepper", "cinnamon"]),
];

const fn rules(kind: RecommendationKind) -> &'static [Rule] {
    match kind {
        RecommendationKind::Cooking => COOKING_RULES,
        RecommendationKind::Health => HEALTH_RULES,
    }
}

/// Product slugs recommended for a choice, or `None` for an unknown choice.
#[must_use]
pub fn recommended_slugs(kind: RecommendationKind, choice: &str) -> Option<&'static [&'static str]> {
    rules(kind)
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(choice))
        .map(|(_, slugs)| *slugs)
}

/// One default-sized line per recommended product found in the catalog.
#[must_use]
pub fn recommendation_bundle(
    kind: RecommendationKind,
    choice: &str,
    products: &[Product],
) -> Vec<BundleLine> {
    let Some(slugs) = recommended_slugs(kind, choice) else {
        return Vec::new();
    };
    slugs
        .iter()
        .filter_map(|slug| products.iter().find(|p| p.slug() == *slug))
        .map(|product| BundleLine {
            product_id: product.id,
            name: product.name.clone(),
            grams: DEFAULT_ADD_QUANTITY,
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::models::{HealthRecommendation, MealItem};
    use crate::types::{
        CategoryId, HealthCategoryId, HealthRecommendationId, MealId, MealItemId, PublishStatus,
    };
    use chrono::Utc;
    use rust_decimal::Decimal;

    fn product(name: &str) -> Product {
        Product {
            id: ProductId::new(),
            name: name.into(),
            price: Decimal::from(100),
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

    #[test]
    fn test_meal_bundle_scales_and_skips_missing() {
        let cumin = product("Cumin");
        let meal = Meal {
            id: MealId::new(),
            name: "Pilau Night".into(),
            description: None,
            image: None,
            serves: 4,
            recipe: None,
            add_ons: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: None,
            items: vec![
                MealItem {
                    id: MealItemId::new(),
                    product_id: cumin.id,
                    product_name: "Cumin".into(),
                    quantity: 0.25,
                    unit: "tbsp".into(),
                },
                MealItem {
                    id: MealItemId::new(),
                    product_id: ProductId::new(),
                    product_name: "Gone".into(),
                    quantity: 1.0,
                    unit: "tsp".into(),
                },
            ],
        };
        let lines = meal_bundle(&meal, 2.0, &[cumin.clone()]);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].product_id, cumin.id);
        assert_eq!(lines[0].grams, 50);
    }

    #[test]
    fn test_health_bundle_rounds() {
        let ginger = product("Ginger");
        let category = HealthCategory {
            id: HealthCategoryId::new(),
            name: "Immunity Boost".into(),
            description: None,
            icon: None,
            benefits: None,
            usage: None,
            safety_notes: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: None,
            recommendations: vec![HealthRecommendation {
                id: HealthRecommendationId::new(),
                category_id: HealthCategoryId::new(),
                product_id: ginger.id,
                product_name: "Ginger".into(),
                quantity: 0.555,
                unit: "tsp".into(),
                frequency: "daily".into(),
            }],
        };
        let lines = health_bundle(&category, &[ginger]);
        assert_eq!(lines[0].grams, 56);
    }

    #[test]
    fn test_recommendation_bundle_matches_slugs() {
        let products = vec![product("Turmeric"), product("Black Pepper"), product("Salt")];
        let lines = recommendation_bundle(RecommendationKind::Health, "immunity", &products);
        let names: Vec<_> = lines.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["Turmeric", "Black Pepper"]);
        assert!(lines.iter().all(|l| l.grams == 100));
    }

    #[test]
    fn test_unknown_choice_is_empty() {
        assert!(recommendation_bundle(RecommendationKind::Cooking, "Pizza", &[]).is_empty());
        assert_eq!(RecommendationKind::Cooking.choices().len(), 5);
        assert_eq!(RecommendationKind::Health.choices()[0], "Immunity");
    }
}
