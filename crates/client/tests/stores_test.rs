//! Cart and wishlist stores and the user mirror, against mocked services.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use spice_hub_client::{
    ApiClient, CartStore, GuestCart, GuestWishlist, IdentityClient, IdentityUser, UserMetadata,
    WishlistStore, ensure_backend_user,
};
use spice_hub_core::models::ProductSummary;
use spice_hub_core::{CartId, CartItemId, ProductId, UserRole, WishlistId, WishlistItemId};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn summary(id: ProductId, name: &str) -> ProductSummary {
    serde_json::from_value(summary_json(id, name)).unwrap()
}

fn summary_json(id: ProductId, name: &str) -> serde_json::Value {
    json!({ "id": id, "name": name, "price": 150.0, "rating": 0.0, "reviewCount": 0 })
}

fn cart_json(cart_id: CartId, lines: &[(CartItemId, ProductId, i32)]) -> serde_json::Value {
    let items: Vec<_> = lines
        .iter()
        .map(|(item_id, product_id, quantity)| {
            json!({
                "id": item_id,
                "product_id": product_id,
                "container": null,
                "quantity": quantity,
                "product": summary_json(*product_id, "Cumin")
            })
        })
        .collect();
    json!({ "id": cart_id, "user_id": "sb-1", "items": items })
}

fn user_json(supabase_id: &str) -> serde_json::Value {
    json!({
        "id": "6f1c8a3e-2a4b-4c3d-9e8f-0a1b2c3d4e5f",
        "supabase_id": supabase_id,
        "firstName": "Amina",
        "lastName": "Otieno",
        "email": "amina@example.com",
        "role": "user",
        "created_at": "2025-03-01T10:00:00Z"
    })
}

// -- CartStore --

#[tokio::test]
async fn add_without_cart_creates_then_refreshes() {
    let server = MockServer::start().await;
    let cart_id = CartId::new();
    let product_id = ProductId::new();
    let body = cart_json(cart_id, &[(CartItemId::new(), product_id, 100)]);

    Mock::given(method("POST"))
        .and(path("/carts/carts"))
        .and(body_partial_json(json!({ "user_id": "sb-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/carts/carts/user/sb-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(&server)
        .await;

    let api = ApiClient::new(&server.uri()).unwrap();
    let mut store = CartStore::authenticated(api, "sb-1");
    store
        .add_item(summary(product_id, "Cumin"), 100, None)
        .await
        .unwrap();

    assert_eq!(store.count(), 1);
    assert_eq!(store.cart().unwrap().id, cart_id);
}

#[tokio::test]
async fn refresh_without_cart_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/carts/carts/user/sb-1"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "detail": "Cart not found" })))
        .mount(&server)
        .await;

    let api = ApiClient::new(&server.uri()).unwrap();
    let mut store = CartStore::authenticated(api, "sb-1");
    store.refresh().await.unwrap();
    assert_eq!(store.count(), 0);
}

#[tokio::test]
async fn update_to_zero_deletes_item() {
    let server = MockServer::start().await;
    let cart_id = CartId::new();
    let item_id = CartItemId::new();
    let product_id = ProductId::new();

    Mock::given(method("GET"))
        .and(path("/carts/carts/user/sb-1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(cart_json(cart_id, &[(item_id, product_id, 200)])),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("/carts/carts/{cart_id}/items/{item_id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart_json(cart_id, &[])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/carts/carts/user/sb-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(cart_json(cart_id, &[])))
        .mount(&server)
        .await;

    let api = ApiClient::new(&server.uri()).unwrap();
    let mut store = CartStore::authenticated(api, "sb-1");
    store.refresh().await.unwrap();
    assert_eq!(store.count(), 1);

    store
        .update_quantity(&item_id.to_string(), 0)
        .await
        .unwrap();
    assert_eq!(store.count(), 0);
}

#[tokio::test]
async fn merge_guest_posts_lines_and_clears() {
    let server = MockServer::start().await;
    let cart_id = CartId::new();
    let product_id = ProductId::new();
    let merged = cart_json(cart_id, &[(CartItemId::new(), product_id, 300)]);

    Mock::given(method("POST"))
        .and(path("/carts/carts"))
        .and(body_partial_json(json!({
            "user_id": "sb-1",
            "items": [{ "product_id": product_id, "quantity": 300 }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(merged.clone()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/carts/carts/user/sb-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(merged))
        .mount(&server)
        .await;

    let mut guest = GuestCart::new();
    guest.add(summary(product_id, "Cumin"), 300, None);

    let api = ApiClient::new(&server.uri()).unwrap();
    let mut store = CartStore::authenticated(api, "sb-1");
    store.merge_guest(&mut guest).await.unwrap();

    assert!(guest.is_empty());
    assert_eq!(store.count(), 1);
}

// -- WishlistStore --

#[tokio::test]
async fn wishlist_remove_uses_item_id() {
    let server = MockServer::start().await;
    let wishlist_id = WishlistId::new();
    let item_id = WishlistItemId::new();
    let product_id = ProductId::new();
    let listed = json!({
        "id": wishlist_id,
        "user_id": "sb-1",
        "items": [{ "id": item_id, "product_id": product_id, "product": summary_json(product_id, "Cloves") }]
    });
    let empty = json!({ "id": wishlist_id, "user_id": "sb-1", "items": [] });

    Mock::given(method("GET"))
        .and(path("/wishlists/wishlists/user/sb-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listed))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("/wishlists/wishlists/{wishlist_id}/items/{item_id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(empty.clone()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/wishlists/wishlists/user/sb-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(empty))
        .mount(&server)
        .await;

    let api = ApiClient::new(&server.uri()).unwrap();
    let mut store = WishlistStore::authenticated(api, "sb-1");
    store.refresh().await.unwrap();
    assert!(store.is_in_wishlist(product_id));

    let listed_after = store.toggle(summary(product_id, "Cloves")).await.unwrap();
    assert!(!listed_after);
    assert!(!store.is_in_wishlist(product_id));
}

#[tokio::test]
async fn wishlist_merge_skips_empty_guest() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/wishlists/wishlists"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let api = ApiClient::new(&server.uri()).unwrap();
    let mut store = WishlistStore::authenticated(api, "sb-1");
    store.merge_guest(&mut GuestWishlist::new()).await.unwrap();
}

// -- ensure_backend_user --

fn identity() -> IdentityUser {
    IdentityUser {
        id: "sb-9".to_string(),
        email: Some("amina@example.com".to_string()),
        user_metadata: UserMetadata {
            first_name: Some("Amina".into()),
            last_name: Some("Otieno".into()),
            role: None,
            phone: None,
        },
    }
}

#[tokio::test]
async fn existing_user_is_not_recreated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/users/by-supabase/sb-9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json("sb-9")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/users/users"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let api = ApiClient::new(&server.uri()).unwrap();
    let user = ensure_backend_user(&api, &identity()).await.unwrap();
    assert_eq!(user.supabase_id, "sb-9");
}

#[tokio::test]
async fn missing_user_is_created() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/users/by-supabase/sb-9"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "detail": "User not found" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/users/users"))
        .and(body_partial_json(json!({
            "firstName": "Amina",
            "lastName": "Otieno",
            "supabase_id": "sb-9",
            "role": "user"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(user_json("sb-9")))
        .expect(1)
        .mount(&server)
        .await;

    let api = ApiClient::new(&server.uri()).unwrap();
    let user = ensure_backend_user(&api, &identity()).await.unwrap();
    assert_eq!(user.role, UserRole::User);
}

#[tokio::test]
async fn concurrent_registration_is_refetched() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/users/by-supabase/sb-9"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "detail": "User not found" })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/users/users"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "detail": "Email already registered" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/users/by-supabase/sb-9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json("sb-9")))
        .mount(&server)
        .await;

    let api = ApiClient::new(&server.uri()).unwrap();
    let user = ensure_backend_user(&api, &identity()).await.unwrap();
    assert_eq!(user.email, "amina@example.com");
}

// -- IdentityClient --

#[tokio::test]
async fn sign_in_sends_apikey() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .and(header("apikey", "anon-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "jwt-abc",
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": "refresh-xyz",
            "user": { "id": "sb-9", "email": "amina@example.com", "user_metadata": {} }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let identity =
        IdentityClient::new(&server.uri(), &SecretString::from("anon-key")).unwrap();
    let session = identity
        .sign_in_with_password("amina@example.com", "pepper-123")
        .await
        .unwrap();
    assert_eq!(session.user.id, "sb-9");
    assert_eq!(session.expires_in, Some(3600));
}

#[tokio::test]
async fn refresh_exchanges_refresh_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "refresh_token"))
        .and(body_partial_json(json!({ "refresh_token": "refresh-xyz" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "jwt-new",
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": "refresh-next",
            "user": { "id": "sb-9", "email": "amina@example.com", "user_metadata": {} }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let identity =
        IdentityClient::new(&server.uri(), &SecretString::from("anon-key")).unwrap();
    let session = identity
        .refresh_session(&SecretString::from("refresh-xyz"))
        .await
        .unwrap();
    let tokens = session.tokens();
    assert_eq!(tokens.access_token().expose_secret(), "jwt-new");
    assert_eq!(tokens.refresh_token().unwrap().expose_secret(), "refresh-next");
    assert!(!tokens.is_expired());
}

#[tokio::test]
async fn bad_credentials_surface_provider_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid login credentials"
        })))
        .mount(&server)
        .await;

    let identity =
        IdentityClient::new(&server.uri(), &SecretString::from("anon-key")).unwrap();
    let err = identity
        .sign_in_with_password("amina@example.com", "wrong")
        .await
        .unwrap_err();
    assert_eq!(err.user_message(), "Invalid login credentials");
}
