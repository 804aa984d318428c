//! Meal kits, health bundles, and sales through the REST API.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use chrono::{Duration, Utc};
use rust_decimal::Decimal;

use spice_hub_core::models::{
    MealUpdate, NewHealthCategory, NewHealthRecommendation, NewMeal, NewMealItem, NewSale,
    NewSaleProduct,
};
use spice_hub_integration_tests::{TestContext, unique};

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_inactive_meals_are_hidden_from_shoppers() {
    let ctx = TestContext::new().await;
    let category = ctx.category("Meals").await;
    let masala = ctx.product(&category, "Pilau Masala", 180).await;

    let meal = ctx
        .api
        .create_meal(&NewMeal {
            name: unique("Pilau Night"),
            description: None,
            image: None,
            serves: 6,
            recipe: Some("Fry onions, add masala, add rice.".to_string()),
            add_ons: Some(vec!["kachumbari".to_string()]),
            is_active: true,
            items: vec![NewMealItem {
                product_id: masala.id,
                product_name: masala.name.clone(),
                quantity: 2.0,
                unit: "tbsp".to_string(),
            }],
        })
        .await
        .unwrap();
    assert_eq!(meal.items.len(), 1);
    assert!(ctx.api.list_meals().await.unwrap().iter().any(|m| m.id == meal.id));

    ctx.api
        .update_meal(
            meal.id,
            &MealUpdate {
                is_active: Some(false),
                ..MealUpdate::default()
            },
        )
        .await
        .unwrap();
    assert!(!ctx.api.list_meals().await.unwrap().iter().any(|m| m.id == meal.id));
    assert!(
        ctx.api
            .list_all_meals()
            .await
            .unwrap()
            .iter()
            .any(|m| m.id == meal.id)
    );

    ctx.api.delete_meal(meal.id).await.unwrap();
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_health_category_keeps_recommendations() {
    let ctx = TestContext::new().await;
    let category = ctx.category("Health").await;
    let turmeric = ctx.product(&category, "Turmeric", 120).await;

    let created = ctx
        .api
        .create_health_category(&NewHealthCategory {
            name: unique("Immunity"),
            description: Some("Everyday support".to_string()),
            icon: None,
            benefits: None,
            usage: None,
            safety_notes: Some("Ask your doctor when pregnant.".to_string()),
            is_active: true,
            recommendations: vec![NewHealthRecommendation {
                product_id: turmeric.id,
                product_name: turmeric.name.clone(),
                quantity: 0.5,
                unit: "tsp".to_string(),
                frequency: "twice daily".to_string(),
            }],
        })
        .await
        .unwrap();

    let fetched = ctx.api.get_health_category(created.id).await.unwrap();
    assert_eq!(fetched.recommendations.len(), 1);
    assert_eq!(fetched.recommendations[0].product_id, turmeric.id);
    assert_eq!(fetched.recommendations[0].frequency, "twice daily");

    ctx.api.delete_health_category(created.id).await.unwrap();
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_sale_products_carry_discounted_prices() {
    let ctx = TestContext::new().await;
    let category = ctx.category("Sale").await;
    let cumin = ctx.product(&category, "Cumin", 150).await;

    let now = Utc::now();
    let sale = ctx
        .api
        .create_sale(&NewSale {
            name: unique("Harvest"),
            description: None,
            discount_percentage: Decimal::from(20),
            start_date: now - Duration::hours(1),
            end_date: now + Duration::days(7),
            is_active: false,
            banner_image: None,
            banner_text: Some("20% off".to_string()),
            products: vec![NewSaleProduct {
                product_id: cumin.id,
                discounted_price: Decimal::from(120),
            }],
        })
        .await
        .unwrap();

    let fetched = ctx.api.get_sale(sale.id).await.unwrap();
    assert_eq!(fetched.products.len(), 1);
    assert_eq!(fetched.products[0].product_id, cumin.id);
    assert_eq!(fetched.products[0].discounted_price, Decimal::from(120));
    assert!(!fetched.is_running(Utc::now()));

    ctx.api.delete_sale(sale.id).await.unwrap();
}
