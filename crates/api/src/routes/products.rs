//! Product route handlers (`/products/products`).

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use tracing::instrument;

use spice_hub_core::ProductId;
use spice_hub_core::models::{Detail, NewProduct, Product, ProductQuery, ProductUpdate};

use crate::db::{CategoryRepository, ProductRepository};
use crate::error::{
    AppError, JsonBody, PathParams, QueryParams, Result, json_body, missing, path_params,
    query_params,
};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show).put(update).delete(destroy))
}

#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    body: JsonBody<NewProduct>,
) -> Result<(StatusCode, Json<Product>)> {
    let new_product = json_body(body)?;
    if !CategoryRepository::new(state.pool())
        .exists(new_product.category_id)
        .await?
    {
        return Err(AppError::not_found("Category"));
    }
    let product = ProductRepository::new(state.pool())
        .create(&new_product)
        .await?;
    tracing::info!(product_id = %product.id, name = %product.name, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

/// List products, optionally filtered by `category_id`, `featured`,
/// `on_sale`, or a `search` term.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    query: QueryParams<ProductQuery>,
) -> Result<Json<Vec<Product>>> {
    let query = query_params(query)?;
    Ok(Json(ProductRepository::new(state.pool()).list(&query).await?))
}

#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, id: PathParams<ProductId>) -> Result<Json<Product>> {
    let id = path_params(id)?;
    ProductRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Product"))
}

#[instrument(skip(state, body))]
pub async fn update(
    State(state): State<AppState>,
    id: PathParams<ProductId>,
    body: JsonBody<ProductUpdate>,
) -> Result<Json<Product>> {
    let id = path_params(id)?;
    let update = json_body(body)?;
    if let Some(category_id) = update.category_id
        && !CategoryRepository::new(state.pool()).exists(category_id).await?
    {
        return Err(AppError::not_found("Category"));
    }
    let product = ProductRepository::new(state.pool())
        .update(id, &update)
        .await
        .map_err(missing("Product"))?;
    Ok(Json(product))
}

#[instrument(skip(state))]
pub async fn destroy(State(state): State<AppState>, id: PathParams<ProductId>) -> Result<Json<Detail>> {
    let id = path_params(id)?;
    ProductRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(missing("Product"))?;
    Ok(Json(Detail::new("Product deleted")))
}
