//! Guest wishlist route handlers (`/guest/guest-wishlist`).

use axum::{
    Json, Router,
    extract::State,
    routing::{delete, get, post},
};
use tracing::instrument;

use spice_hub_core::models::{
    Detail, GuestWishlist, GuestWishlistAdd, GuestWishlistMerge, Product, Wishlist,
};
use spice_hub_core::{GuestSessionId, ProductId};

use crate::db::{ProductRepository, WishlistRepository};
use crate::error::{AppError, JsonBody, PathParams, Result, json_body, path_params};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/add", post(add))
        .route("/merge", post(merge))
        .route("/{session_id}", get(show).delete(clear))
        .route("/{session_id}/{product_id}", delete(remove))
}

/// Summaries of the listed products that still exist, in list order.
async fn render(state: &AppState, session_id: GuestSessionId, ids: &[ProductId]) -> Result<GuestWishlist> {
    let products = ProductRepository::new(state.pool()).list_by_ids(ids).await?;
    let items = ids
        .iter()
        .filter_map(|id| products.iter().find(|p| p.id == *id).map(Product::summary))
        .collect();
    Ok(GuestWishlist { session_id, items })
}

#[instrument(skip(state, body))]
pub async fn add(
    State(state): State<AppState>,
    body: JsonBody<GuestWishlistAdd>,
) -> Result<Json<GuestWishlist>> {
    let add = json_body(body)?;
    if !ProductRepository::new(state.pool())
        .exists(add.product_id)
        .await?
    {
        return Err(AppError::not_found("Product"));
    }
    let ids = state
        .guests()
        .add_to_wishlist(add.session_id, add.product_id)
        .await;
    Ok(Json(render(&state, add.session_id, &ids).await?))
}

#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    session_id: PathParams<GuestSessionId>,
) -> Result<Json<GuestWishlist>> {
    let session_id = path_params(session_id)?;
    let ids = state.guests().wishlist(session_id).await;
    Ok(Json(render(&state, session_id, &ids).await?))
}

#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    ids: PathParams<(GuestSessionId, ProductId)>,
) -> Result<Json<Detail>> {
    let (session_id, product_id) = path_params(ids)?;
    state
        .guests()
        .remove_from_wishlist(session_id, product_id)
        .await;
    Ok(Json(Detail::new("Item removed from wishlist")))
}

#[instrument(skip(state))]
pub async fn clear(
    State(state): State<AppState>,
    session_id: PathParams<GuestSessionId>,
) -> Result<Json<Detail>> {
    let session_id = path_params(session_id)?;
    state.guests().clear_wishlist(session_id).await;
    Ok(Json(Detail::new("Wishlist cleared")))
}

/// Copy the guest wishlist into the user's wishlist, then clear it.
///
/// The guest list is kept if any write fails so the merge can be retried.
#[instrument(skip(state, body))]
pub async fn merge(
    State(state): State<AppState>,
    body: JsonBody<GuestWishlistMerge>,
) -> Result<Json<Wishlist>> {
    let merge = json_body(body)?;
    let guest_ids = state.guests().wishlist(merge.session_id).await;

    let existing: Vec<ProductId> = ProductRepository::new(state.pool())
        .list_by_ids(&guest_ids)
        .await?
        .into_iter()
        .map(|p| p.id)
        .collect();

    let repo = WishlistRepository::new(state.pool());
    let wishlist_id = repo.get_or_create(&merge.user_id).await?;
    for product_id in guest_ids.iter().filter(|id| existing.contains(id)) {
        repo.add_item(wishlist_id, *product_id).await?;
    }
    state.guests().clear_wishlist(merge.session_id).await;
    tracing::info!(
        user_id = %merge.user_id,
        merged = existing.len(),
        "Guest wishlist merged"
    );
    Ok(Json(repo.get(wishlist_id).await?))
}
