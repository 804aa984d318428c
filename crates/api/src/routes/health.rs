//! Health bundle route handlers (`/health/health`).

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use tracing::instrument;

use spice_hub_core::HealthCategoryId;
use spice_hub_core::models::{Detail, HealthCategory, HealthCategoryUpdate, NewHealthCategory};

use crate::db::HealthRepository;
use crate::error::{AppError, JsonBody, PathParams, Result, json_body, missing, path_params};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_active).post(create))
        .route("/all", get(list_all))
        .route("/{id}", get(show).put(update).delete(destroy))
}

#[instrument(skip(state))]
pub async fn list_active(State(state): State<AppState>) -> Result<Json<Vec<HealthCategory>>> {
    Ok(Json(HealthRepository::new(state.pool()).list(true).await?))
}

#[instrument(skip(state))]
pub async fn list_all(State(state): State<AppState>) -> Result<Json<Vec<HealthCategory>>> {
    Ok(Json(HealthRepository::new(state.pool()).list(false).await?))
}

#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    id: PathParams<HealthCategoryId>,
) -> Result<Json<HealthCategory>> {
    let id = path_params(id)?;
    HealthRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Health category"))
}

#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    body: JsonBody<NewHealthCategory>,
) -> Result<(StatusCode, Json<HealthCategory>)> {
    let new_category = json_body(body)?;
    let category = HealthRepository::new(state.pool())
        .create(&new_category)
        .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

#[instrument(skip(state, body))]
pub async fn update(
    State(state): State<AppState>,
    id: PathParams<HealthCategoryId>,
    body: JsonBody<HealthCategoryUpdate>,
) -> Result<Json<HealthCategory>> {
    let id = path_params(id)?;
    let update = json_body(body)?;
    let category = HealthRepository::new(state.pool())
        .update(id, &update)
        .await
        .map_err(missing("Health category"))?;
    Ok(Json(category))
}

#[instrument(skip(state))]
pub async fn destroy(
    State(state): State<AppState>,
    id: PathParams<HealthCategoryId>,
) -> Result<Json<Detail>> {
    let id = path_params(id)?;
    HealthRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(missing("Health category"))?;
    Ok(Json(Detail::new("Health category deleted")))
}
