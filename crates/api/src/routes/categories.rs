//! Category route handlers (`/category/categories`).

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use tracing::instrument;

use spice_hub_core::CategoryId;
use spice_hub_core::models::{Category, CategoryUpdate, Detail, NewCategory};

use crate::db::CategoryRepository;
use crate::error::{AppError, JsonBody, PathParams, Result, json_body, missing, path_params};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(show).put(update).delete(destroy))
}

#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    body: JsonBody<NewCategory>,
) -> Result<(StatusCode, Json<Category>)> {
    let new_category = json_body(body)?;
    let category = CategoryRepository::new(state.pool())
        .create(&new_category)
        .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    Ok(Json(CategoryRepository::new(state.pool()).list().await?))
}

/// Category with summaries of its products.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    id: PathParams<CategoryId>,
) -> Result<Json<Category>> {
    let id = path_params(id)?;
    CategoryRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Category"))
}

#[instrument(skip(state, body))]
pub async fn update(
    State(state): State<AppState>,
    id: PathParams<CategoryId>,
    body: JsonBody<CategoryUpdate>,
) -> Result<Json<Category>> {
    let id = path_params(id)?;
    let update = json_body(body)?;
    let category = CategoryRepository::new(state.pool())
        .update(id, &update)
        .await
        .map_err(missing("Category"))?;
    Ok(Json(category))
}

#[instrument(skip(state))]
pub async fn destroy(
    State(state): State<AppState>,
    id: PathParams<CategoryId>,
) -> Result<Json<Detail>> {
    let id = path_params(id)?;
    CategoryRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(missing("Category"))?;
    Ok(Json(Detail::new("Category deleted")))
}
