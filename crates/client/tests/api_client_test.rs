//! Contract tests for `ApiClient` against a mocked REST API.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use secrecy::SecretString;
use serde_json::json;
use spice_hub_client::{ApiClient, ClientError};
use spice_hub_core::models::{GuestCartLine, NewCartItem, ProductQuery};
use spice_hub_core::{CartId, GuestSessionId, ProductId};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn product_json(id: ProductId, name: &str, price: f64) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "price": price,
        "originalPrice": null,
        "stock": 40,
        "rating": 4.5,
        "reviewCount": 2,
        "isSale": false,
        "isNew": true,
        "isFeatured": true,
        "containers": ["jar", "refill"],
        "description": "Whole seeds",
        "images": [],
        "status": "active",
        "cost_per_item": null,
        "main_image": null,
        "category_id": "3f0b1f6c-1d7e-4a54-9a55-7c2f4d8e9a10",
        "category": { "id": "3f0b1f6c-1d7e-4a54-9a55-7c2f4d8e9a10", "name": "Seeds" },
        "created_at": "2025-03-01T10:00:00Z"
    })
}

// -- Errors --

#[tokio::test]
async fn not_found_carries_detail() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/carts/carts/user/sb-1"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "detail": "Cart not found" })))
        .mount(&server)
        .await;

    let client = ApiClient::new(&server.uri()).unwrap();
    let err = client.get_user_cart("sb-1").await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound(ref m) if m == "Cart not found"));
}

#[tokio::test]
async fn api_error_carries_status_and_detail() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/guest/guest-cart/update"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({ "detail": "Quantity must be at least 1" })),
        )
        .mount(&server)
        .await;

    let client = ApiClient::new(&server.uri()).unwrap();
    let line = GuestCartLine {
        session_id: GuestSessionId::generate(),
        product_id: ProductId::new(),
        quantity: 0,
        container: None,
    };
    let err = client.guest_cart_update(&line).await.unwrap_err();
    match err {
        ClientError::Api { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Quantity must be at least 1");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn non_json_error_body_is_kept() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/orders/orders"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let client = ApiClient::new(&server.uri()).unwrap();
    let err = client.list_orders().await.unwrap_err();
    assert!(matches!(err, ClientError::Api { status: 502, ref message } if message == "bad gateway"));
}

// -- Auth --

#[tokio::test]
async fn bearer_token_is_forwarded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/category/categories"))
        .and(header("authorization", "Bearer token-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(&server.uri())
        .unwrap()
        .with_token(Some(SecretString::from("token-123")));
    assert!(client.list_categories().await.unwrap().is_empty());
}

// -- Catalog --

#[tokio::test]
async fn list_products_sends_filters() {
    let server = MockServer::start().await;
    let id = ProductId::new();
    Mock::given(method("GET"))
        .and(path("/products/products"))
        .and(query_param("featured", "true"))
        .and(query_param("search", "cumin"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([product_json(id, "Cumin", 120.0)])),
        )
        .mount(&server)
        .await;

    let client = ApiClient::new(&server.uri()).unwrap();
    let products = client
        .list_products(&ProductQuery {
            featured: Some(true),
            search: Some("cumin".into()),
            ..ProductQuery::default()
        })
        .await
        .unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].id, id);
    assert_eq!(products[0].category_name(), Some("Seeds"));
}

#[tokio::test]
async fn active_sale_absent_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sales/sales/active"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "detail": "No active sale" })))
        .mount(&server)
        .await;

    let client = ApiClient::new(&server.uri()).unwrap();
    assert!(client.active_sale().await.unwrap().is_none());
}

// -- Carts --

#[tokio::test]
async fn add_cart_item_posts_line() {
    let server = MockServer::start().await;
    let cart_id = CartId::new();
    let product_id = ProductId::new();
    Mock::given(method("POST"))
        .and(path(format!("/carts/carts/{cart_id}/items")))
        .and(body_json(json!({
            "product_id": product_id,
            "container": "jar",
            "quantity": 250
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": cart_id,
            "user_id": "sb-1",
            "items": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(&server.uri()).unwrap();
    let cart = client
        .add_cart_item(
            cart_id,
            &NewCartItem {
                product_id,
                container: Some("jar".into()),
                quantity: 250,
            },
        )
        .await
        .unwrap();
    assert_eq!(cart.id, cart_id);
}

// -- Invoices --

#[tokio::test]
async fn invoice_is_plain_text() {
    let server = MockServer::start().await;
    let order_id = spice_hub_core::OrderId::new();
    Mock::given(method("GET"))
        .and(path(format!("/orders/orders/{order_id}/invoice")))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/plain")
                .set_body_string("SPICE HUB - INVOICE"),
        )
        .mount(&server)
        .await;

    let client = ApiClient::new(&server.uri()).unwrap();
    let text = client.order_invoice(order_id).await.unwrap();
    assert!(text.starts_with("SPICE HUB"));
}
