//! Wishlist route handlers (`/wishlists/wishlists`).

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post},
};
use tracing::instrument;

use spice_hub_core::models::{NewWishlist, NewWishlistItem, Wishlist};
use spice_hub_core::{WishlistId, WishlistItemId};

use crate::db::{ProductRepository, WishlistRepository};
use crate::error::{AppError, JsonBody, PathParams, Result, json_body, missing, path_params};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create))
        .route("/user/{user_id}", get(by_user))
        .route("/{wishlist_id}/items", post(add_item).delete(clear))
        .route("/{wishlist_id}/items/{item_id}", delete(remove_item))
}

async fn check_product(state: &AppState, item: &NewWishlistItem) -> Result<()> {
    if !ProductRepository::new(state.pool())
        .exists(item.product_id)
        .await?
    {
        return Err(AppError::NotFound(format!(
            "Product {} not found",
            item.product_id
        )));
    }
    Ok(())
}

/// Get or create the user's wishlist and add `items`, skipping products
/// already listed.
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    body: JsonBody<NewWishlist>,
) -> Result<Json<Wishlist>> {
    let new_wishlist = json_body(body)?;
    for item in &new_wishlist.items {
        check_product(&state, item).await?;
    }

    let repo = WishlistRepository::new(state.pool());
    let wishlist_id = repo.get_or_create(&new_wishlist.user_id).await?;
    for item in &new_wishlist.items {
        repo.add_item(wishlist_id, item.product_id).await?;
    }
    Ok(Json(repo.get(wishlist_id).await?))
}

#[instrument(skip(state))]
pub async fn by_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Wishlist>> {
    WishlistRepository::new(state.pool())
        .get_by_user(&user_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Wishlist"))
}

#[instrument(skip(state, body))]
pub async fn add_item(
    State(state): State<AppState>,
    wishlist_id: PathParams<WishlistId>,
    body: JsonBody<NewWishlistItem>,
) -> Result<Json<Wishlist>> {
    let wishlist_id = path_params(wishlist_id)?;
    let item = json_body(body)?;
    let repo = WishlistRepository::new(state.pool());
    repo.get(wishlist_id).await.map_err(missing("Wishlist"))?;
    check_product(&state, &item).await?;
    repo.add_item(wishlist_id, item.product_id).await?;
    Ok(Json(repo.get(wishlist_id).await?))
}

#[instrument(skip(state))]
pub async fn remove_item(
    State(state): State<AppState>,
    ids: PathParams<(WishlistId, WishlistItemId)>,
) -> Result<Json<Wishlist>> {
    let (wishlist_id, item_id) = path_params(ids)?;
    let repo = WishlistRepository::new(state.pool());
    repo.remove_item(wishlist_id, item_id)
        .await
        .map_err(missing("Wishlist item"))?;
    Ok(Json(repo.get(wishlist_id).await.map_err(missing("Wishlist"))?))
}

#[instrument(skip(state))]
pub async fn clear(
    State(state): State<AppState>,
    wishlist_id: PathParams<WishlistId>,
) -> Result<Json<Wishlist>> {
    let wishlist_id = path_params(wishlist_id)?;
    let repo = WishlistRepository::new(state.pool());
    repo.get(wishlist_id).await.map_err(missing("Wishlist"))?;
    repo.clear(wishlist_id).await?;
    Ok(Json(repo.get(wishlist_id).await?))
}
