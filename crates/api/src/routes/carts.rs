//! Cart route handlers (`/carts/carts`).
//!
//! Every mutation answers with the full cart so clients can re-render
//! without a second request.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get, post, put},
};
use tracing::instrument;

use spice_hub_core::models::{Cart, CartItemUpdate, NewCart, NewCartItem};
use spice_hub_core::{CartId, CartItemId};

use crate::db::{CartRepository, ProductRepository};
use crate::error::{AppError, JsonBody, PathParams, Result, json_body, missing, path_params};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create))
        .route("/user/{user_id}", get(by_user))
        .route("/items/{item_id}", put(update_item))
        .route("/{cart_id}/items", post(add_item).delete(clear))
        .route("/{cart_id}/items/{item_id}", delete(remove_item))
}

fn check_quantity(quantity: i32) -> Result<()> {
    if quantity <= 0 {
        return Err(AppError::BadRequest(
            "Quantity must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

/// Verify an item before it is merged into a cart.
async fn check_item(state: &AppState, item: &NewCartItem) -> Result<()> {
    check_quantity(item.quantity)?;
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

/// Get or create the user's cart and merge `items` into it.
#[instrument(skip(state, body))]
pub async fn create(State(state): State<AppState>, body: JsonBody<NewCart>) -> Result<Json<Cart>> {
    let new_cart = json_body(body)?;
    for item in &new_cart.items {
        check_item(&state, item).await?;
    }

    let repo = CartRepository::new(state.pool());
    let cart_id = repo.get_or_create(&new_cart.user_id).await?;
    for item in &new_cart.items {
        repo.add_item(cart_id, item).await?;
    }
    Ok(Json(repo.get(cart_id).await?))
}

#[instrument(skip(state))]
pub async fn by_user(State(state): State<AppState>, Path(user_id): Path<String>) -> Result<Json<Cart>> {
    CartRepository::new(state.pool())
        .get_by_user(&user_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Cart"))
}

#[instrument(skip(state, body))]
pub async fn add_item(
    State(state): State<AppState>,
    cart_id: PathParams<CartId>,
    body: JsonBody<NewCartItem>,
) -> Result<Json<Cart>> {
    let cart_id = path_params(cart_id)?;
    let item = json_body(body)?;
    let repo = CartRepository::new(state.pool());
    repo.get(cart_id).await.map_err(missing("Cart"))?;
    check_item(&state, &item).await?;
    repo.add_item(cart_id, &item).await?;
    Ok(Json(repo.get(cart_id).await?))
}

#[instrument(skip(state, body))]
pub async fn update_item(
    State(state): State<AppState>,
    item_id: PathParams<CartItemId>,
    body: JsonBody<CartItemUpdate>,
) -> Result<Json<Cart>> {
    let item_id = path_params(item_id)?;
    let update = json_body(body)?;
    check_quantity(update.quantity)?;
    let cart = CartRepository::new(state.pool())
        .update_item(item_id, &update)
        .await
        .map_err(missing("Cart item"))?;
    Ok(Json(cart))
}

#[instrument(skip(state))]
pub async fn remove_item(
    State(state): State<AppState>,
    ids: PathParams<(CartId, CartItemId)>,
) -> Result<Json<Cart>> {
    let (cart_id, item_id) = path_params(ids)?;
    let repo = CartRepository::new(state.pool());
    repo.remove_item(cart_id, item_id)
        .await
        .map_err(missing("Cart item"))?;
    Ok(Json(repo.get(cart_id).await.map_err(missing("Cart"))?))
}

#[instrument(skip(state))]
pub async fn clear(State(state): State<AppState>, cart_id: PathParams<CartId>) -> Result<Json<Cart>> {
    let cart_id = path_params(cart_id)?;
    let repo = CartRepository::new(state.pool());
    repo.get(cart_id).await.map_err(missing("Cart"))?;
    repo.clear(cart_id).await?;
    Ok(Json(repo.get(cart_id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_quantity() {
        assert!(check_quantity(1).is_ok());
        assert!(matches!(check_quantity(0), Err(AppError::BadRequest(_))));
        assert!(matches!(check_quantity(-100), Err(AppError::BadRequest(_))));
    }
}
