//! Catalog management through the REST API.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use rust_decimal::Decimal;

use spice_hub_core::models::{CategoryUpdate, ProductQuery, ProductUpdate};
use spice_hub_integration_tests::{TestContext, new_product, unique};

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_category_lifecycle() {
    let ctx = TestContext::new().await;
    let category = ctx.category("Whole").await;

    let fetched = ctx.api.get_category(category.id).await.unwrap();
    assert_eq!(fetched.name, category.name);
    assert!(fetched.products.is_empty());

    let renamed = unique("Ground");
    let updated = ctx
        .api
        .update_category(
            category.id,
            &CategoryUpdate {
                name: Some(renamed.clone()),
                is_featured: Some(true),
                ..CategoryUpdate::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, renamed);
    assert!(updated.is_featured);

    ctx.api.delete_category(category.id).await.unwrap();
    let err = ctx.api.get_category(category.id).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_product_filters_and_update() {
    let ctx = TestContext::new().await;
    let category = ctx.category("Blends").await;
    let masala = ctx.product(&category, "Pilau Masala", 180).await;
    let cumin = ctx.product(&category, "Cumin", 150).await;

    let in_category = ctx
        .api
        .list_products(&ProductQuery {
            category_id: Some(category.id),
            ..ProductQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(in_category.len(), 2);
    assert!(in_category.iter().all(|p| p.category_id == category.id));

    let searched = ctx
        .api
        .list_products(&ProductQuery {
            search: Some(masala.name.to_uppercase()),
            ..ProductQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(searched.len(), 1);
    assert_eq!(searched[0].id, masala.id);

    let updated = ctx
        .api
        .update_product(
            cumin.id,
            &ProductUpdate {
                price: Some(Decimal::from(120)),
                original_price: Some(Decimal::from(150)),
                is_sale: Some(true),
                ..ProductUpdate::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.price, Decimal::from(120));
    assert!(updated.is_sale);
    assert_eq!(updated.name, cumin.name);

    let on_sale = ctx
        .api
        .list_products(&ProductQuery {
            category_id: Some(category.id),
            on_sale: Some(true),
            ..ProductQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(on_sale.len(), 1);
    assert_eq!(on_sale[0].id, cumin.id);

    ctx.api.delete_product(masala.id).await.unwrap();
    ctx.api.delete_product(cumin.id).await.unwrap();
    ctx.api.delete_category(category.id).await.unwrap();
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_product_with_unknown_category_is_rejected() {
    let ctx = TestContext::new().await;
    let category = ctx.category("Gone").await;
    ctx.api.delete_category(category.id).await.unwrap();

    let err = ctx
        .api
        .create_product(&new_product(&category, &unique("Orphan"), 100))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}
