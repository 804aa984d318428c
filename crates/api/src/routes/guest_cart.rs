//! Guest cart route handlers (`/guest/guest-cart`).
//!
//! Lines are held in the in-memory [`GuestStore`](crate::guest::GuestStore)
//! and enriched with current product data on every read. Lines whose product
//! has since been deleted are left out.

use std::collections::HashMap;

use axum::{
    Json, Router,
    extract::State,
    routing::{delete, get, post, put},
};
use tracing::instrument;

use spice_hub_core::models::{Detail, GuestCart, GuestCartItem, GuestCartLine, Product};
use spice_hub_core::{GuestSessionId, ProductId};

use crate::db::ProductRepository;
use crate::error::{AppError, JsonBody, PathParams, Result, json_body, path_params};
use crate::guest::GuestLine;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/add", post(add))
        .route("/update", put(update))
        .route("/{session_id}", get(show).delete(clear))
        .route("/{session_id}/{product_id}", delete(remove))
}

fn enrich(line: &GuestLine, product: &Product) -> GuestCartItem {
    GuestCartItem {
        product_id: product.id,
        name: product.name.clone(),
        price: product.price,
        main_image: product.display_image().map(str::to_owned),
        category_name: product.category_name().map(str::to_owned),
        rating: Some(product.rating),
        review_count: Some(product.review_count),
        is_sale: Some(product.is_sale),
        is_new: Some(product.is_new),
        container: line.container.clone(),
        quantity: line.quantity,
    }
}

async fn render(state: &AppState, session_id: GuestSessionId, lines: &[GuestLine]) -> Result<GuestCart> {
    let ids: Vec<ProductId> = lines.iter().map(|l| l.product_id).collect();
    let products: HashMap<ProductId, Product> = ProductRepository::new(state.pool())
        .list_by_ids(&ids)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let items = lines
        .iter()
        .filter_map(|line| products.get(&line.product_id).map(|p| enrich(line, p)))
        .collect();
    Ok(GuestCart { session_id, items })
}

fn check_quantity(quantity: i32) -> Result<()> {
    if quantity < 1 {
        return Err(AppError::BadRequest(
            "Quantity must be at least 1".to_string(),
        ));
    }
    Ok(())
}

#[instrument(skip(state, body))]
pub async fn add(State(state): State<AppState>, body: JsonBody<GuestCartLine>) -> Result<Json<GuestCart>> {
    let line = json_body(body)?;
    check_quantity(line.quantity)?;
    if !ProductRepository::new(state.pool())
        .exists(line.product_id)
        .await?
    {
        return Err(AppError::not_found("Product"));
    }

    let lines = state
        .guests()
        .add_to_cart(line.session_id, line.product_id, line.quantity, line.container)
        .await;
    Ok(Json(render(&state, line.session_id, &lines).await?))
}

#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    session_id: PathParams<GuestSessionId>,
) -> Result<Json<GuestCart>> {
    let session_id = path_params(session_id)?;
    let lines = state.guests().cart(session_id).await;
    Ok(Json(render(&state, session_id, &lines).await?))
}

#[instrument(skip(state, body))]
pub async fn update(
    State(state): State<AppState>,
    body: JsonBody<GuestCartLine>,
) -> Result<Json<GuestCart>> {
    let line = json_body(body)?;
    check_quantity(line.quantity)?;
    let lines = state
        .guests()
        .update_cart(
            line.session_id,
            line.product_id,
            line.quantity,
            line.container.as_deref(),
        )
        .await
        .ok_or_else(|| AppError::NotFound("Item not found in cart".to_string()))?;
    Ok(Json(render(&state, line.session_id, &lines).await?))
}

#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    ids: PathParams<(GuestSessionId, ProductId)>,
) -> Result<Json<Detail>> {
    let (session_id, product_id) = path_params(ids)?;
    state.guests().remove_from_cart(session_id, product_id).await;
    Ok(Json(Detail::new("Item removed from cart")))
}

#[instrument(skip(state))]
pub async fn clear(
    State(state): State<AppState>,
    session_id: PathParams<GuestSessionId>,
) -> Result<Json<Detail>> {
    let session_id = path_params(session_id)?;
    state.guests().clear_cart(session_id).await;
    Ok(Json(Detail::new("Cart cleared")))
}
