//! Guest carts and wishlists through the REST API.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use spice_hub_client::ClientError;
use spice_hub_core::GuestSessionId;
use spice_hub_core::models::{
    GuestCartLine, GuestWishlistAdd, GuestWishlistMerge, NewWishlist, NewWishlistItem, Product,
};
use spice_hub_integration_tests::TestContext;

fn line(
    session_id: GuestSessionId,
    product: &Product,
    quantity: i32,
    container: Option<&str>,
) -> GuestCartLine {
    GuestCartLine {
        session_id,
        product_id: product.id,
        quantity,
        container: container.map(str::to_owned),
    }
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_guest_cart_merges_same_container() {
    let ctx = TestContext::new().await;
    let category = ctx.category("Guest").await;
    let cumin = ctx.product(&category, "Cumin", 150).await;
    let session = GuestSessionId::generate();

    ctx.api.guest_cart_add(&line(session, &cumin, 100, Some("jar"))).await.unwrap();
    ctx.api.guest_cart_add(&line(session, &cumin, 50, Some("jar"))).await.unwrap();
    let cart = ctx.api.guest_cart_add(&line(session, &cumin, 100, Some("refill"))).await.unwrap();

    assert_eq!(cart.session_id, session);
    assert_eq!(cart.items.len(), 2);
    let jar = cart.items.iter().find(|i| i.container.as_deref() == Some("jar")).unwrap();
    assert_eq!(jar.quantity, 150);
    assert_eq!(jar.name, cumin.name);

    ctx.api.guest_cart_clear(session).await.unwrap();
    assert!(ctx.api.guest_cart(session).await.unwrap().items.is_empty());
    ctx.api.delete_category(category.id).await.unwrap();
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_guest_cart_update_checks_quantity_and_line() {
    let ctx = TestContext::new().await;
    let category = ctx.category("Guest").await;
    let paprika = ctx.product(&category, "Paprika", 120).await;
    let session = GuestSessionId::generate();
    ctx.api.guest_cart_add(&line(session, &paprika, 100, None)).await.unwrap();

    let err = ctx
        .api
        .guest_cart_update(&line(session, &paprika, 0, None))
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(400));

    let err = ctx
        .api
        .guest_cart_update(&line(session, &paprika, 200, Some("jar")))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::NotFound(_)));

    let cart = ctx
        .api
        .guest_cart_update(&line(session, &paprika, 300, None))
        .await
        .unwrap();
    assert_eq!(cart.items[0].quantity, 300);

    ctx.api.delete_category(category.id).await.unwrap();
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_guest_cart_skips_deleted_products() {
    let ctx = TestContext::new().await;
    let category = ctx.category("Guest").await;
    let keep = ctx.product(&category, "Ginger", 90).await;
    let gone = ctx.product(&category, "Saffron", 900).await;
    let session = GuestSessionId::generate();
    ctx.api.guest_cart_add(&line(session, &keep, 100, None)).await.unwrap();
    ctx.api.guest_cart_add(&line(session, &gone, 100, None)).await.unwrap();

    ctx.api.delete_product(gone.id).await.unwrap();

    let cart = ctx.api.guest_cart(session).await.unwrap();
    assert_eq!(cart.items.len(), 1);
    assert_eq!(cart.items[0].product_id, keep.id);

    ctx.api.delete_category(category.id).await.unwrap();
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_guest_wishlist_merge_deduplicates_and_clears() {
    let ctx = TestContext::new().await;
    let shopper = ctx.user("Wanjiru").await;
    let category = ctx.category("Guest").await;
    let cinnamon = ctx.product(&category, "Cinnamon", 200).await;
    let nutmeg = ctx.product(&category, "Nutmeg", 250).await;
    ctx.api
        .create_wishlist(&NewWishlist {
            user_id: shopper.supabase_id.clone(),
            items: vec![NewWishlistItem {
                product_id: cinnamon.id,
            }],
        })
        .await
        .unwrap();

    let session = GuestSessionId::generate();
    for product in [&cinnamon, &nutmeg, &cinnamon] {
        ctx.api
            .guest_wishlist_add(&GuestWishlistAdd {
                session_id: session,
                product_id: product.id,
            })
            .await
            .unwrap();
    }
    assert_eq!(ctx.api.guest_wishlist(session).await.unwrap().items.len(), 2);

    let wishlist = ctx
        .api
        .guest_wishlist_merge(&GuestWishlistMerge {
            session_id: session,
            user_id: shopper.supabase_id.clone(),
        })
        .await
        .unwrap();
    assert_eq!(wishlist.items.len(), 2);
    assert!(wishlist.items.iter().any(|i| i.product_id == nutmeg.id));
    assert!(ctx.api.guest_wishlist(session).await.unwrap().items.is_empty());

    ctx.api.delete_user(shopper.id).await.unwrap();
    ctx.api.delete_category(category.id).await.unwrap();
}

#[tokio::test]
#[ignore = "Requires PostgreSQL (DATABASE_URL)"]
async fn test_failed_wishlist_merge_keeps_guest_items() {
    let ctx = TestContext::new().await;
    let category = ctx.category("Guest").await;
    let pepper = ctx.product(&category, "Black Pepper", 110).await;
    let session = GuestSessionId::generate();
    ctx.api
        .guest_wishlist_add(&GuestWishlistAdd {
            session_id: session,
            product_id: pepper.id,
        })
        .await
        .unwrap();

    let result = ctx
        .api
        .guest_wishlist_merge(&GuestWishlistMerge {
            session_id: session,
            user_id: "no-such-user".to_string(),
        })
        .await;
    assert!(result.is_err());

    let guest = ctx.api.guest_wishlist(session).await.unwrap();
    assert_eq!(guest.items.len(), 1);
    assert_eq!(guest.items[0].id, pepper.id);

    ctx.api.delete_category(category.id).await.unwrap();
}
