//! Order placement, fulfilment, and export through the REST API.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use rust_decimal::Decimal;

use spice_hub_core::export::{ExportFormat, order_rows, orders_to_delimited};
use spice_hub_core::models::{NewOrder, NewOrderItem, OrderUpdate, Product};
use spice_hub_core::{OrderStatus, ShippingMethod};
use spice_hub_integration_tests::TestContext;

fn item(product: &Product, grams: i32) -> NewOrderItem {
    NewOrderItem {
        product_id: product.id,
        container: Some("jar".to_string()),
        name: Some(product.name.clone()),
        image: None,
        quantity: grams,
        price: product.price,
    }
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_order_lifecycle() {
    let ctx = TestContext::new().await;
    let shopper = ctx.user("Amina").await;
    let category = ctx.category("Orders").await;
    let cumin = ctx.product(&category, "Cumin", 150).await;
    let chilli = ctx.product(&category, "Chilli", 200).await;

    let order = ctx
        .api
        .create_order(&NewOrder {
            user_id: shopper.id,
            status: OrderStatus::Pending,
            total_amount: Decimal::from(500),
            shipping_method: ShippingMethod::Standard,
            city: "Nairobi".to_string(),
            area: "Kilimani".to_string(),
            address: "Argwings Kodhek Rd".to_string(),
            phone_number: "0712345678".to_string(),
            apartment: String::new(),
            pay_on_delivery: true,
            paid: false,
            mpesa_code: None,
            additional_note: Some("Ring twice".to_string()),
            internal_notes: None,
            items: vec![item(&cumin, 200), item(&chilli, 100)],
        })
        .await
        .unwrap();
    assert_eq!(order.items.len(), 2);
    assert_eq!(order.status, OrderStatus::Pending);

    let mine = ctx.api.list_user_orders(shopper.id).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].id, order.id);

    let shipped = ctx
        .api
        .update_order(
            order.id,
            &OrderUpdate {
                status: Some(OrderStatus::Shipped),
                internal_notes: Some(vec!["Packed by Grace".to_string()]),
                ..OrderUpdate::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(shipped.status, OrderStatus::Shipped);
    assert!(!shipped.paid);
    assert_eq!(
        shipped.internal_notes,
        Some(vec!["Packed by Grace".to_string()])
    );

    let invoice = ctx.api.order_invoice(order.id).await.unwrap();
    assert!(invoice.starts_with("SPICE HUB - INVOICE"));
    assert!(invoice.contains(&order.id.to_string()));

    let chilli_line = order
        .items
        .iter()
        .find(|i| i.product_id == chilli.id)
        .unwrap();
    ctx.api.delete_order_item(chilli_line.id).await.unwrap();
    let trimmed = ctx.api.get_order(order.id).await.unwrap();
    assert_eq!(trimmed.items.len(), 1);
    assert_eq!(trimmed.items[0].product_id, cumin.id);

    let users = ctx.api.list_users().await.unwrap();
    let rows = order_rows(&[&trimmed], &users);
    let csv = orders_to_delimited(&rows, ExportFormat::Csv);
    assert!(csv.contains("\"Amina Tester\""));
    assert!(csv.ends_with(",shipped"));

    ctx.api.delete_order(order.id).await.unwrap();
    assert!(ctx.api.get_order(order.id).await.unwrap_err().is_not_found());
    ctx.api.delete_user(shopper.id).await.unwrap();
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_order_for_unknown_user_is_rejected() {
    let ctx = TestContext::new().await;
    let category = ctx.category("Orphans").await;
    let cumin = ctx.product(&category, "Cumin", 150).await;

    let err = ctx
        .api
        .create_order(&NewOrder {
            user_id: spice_hub_core::UserId::new(),
            status: OrderStatus::Pending,
            total_amount: Decimal::from(300),
            shipping_method: ShippingMethod::Express,
            city: "Mombasa".to_string(),
            area: "Nyali".to_string(),
            address: String::new(),
            phone_number: "0798765432".to_string(),
            apartment: String::new(),
            pay_on_delivery: false,
            paid: false,
            mpesa_code: Some("QWE123RTY4".to_string()),
            additional_note: None,
            internal_notes: None,
            items: vec![item(&cumin, 200)],
        })
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}
