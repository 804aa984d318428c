//! Meal kit route handlers (`/meals/meals`).

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use tracing::instrument;

use spice_hub_core::MealId;
use spice_hub_core::models::{Detail, Meal, MealUpdate, NewMeal};

use crate::db::MealRepository;
use crate::error::{AppError, JsonBody, PathParams, Result, json_body, missing, path_params};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_active).post(create))
        .route("/all", get(list_all))
        .route("/{id}", get(show).put(update).delete(destroy))
}

/// Meals shown in the smart shop.
#[instrument(skip(state))]
pub async fn list_active(State(state): State<AppState>) -> Result<Json<Vec<Meal>>> {
    Ok(Json(MealRepository::new(state.pool()).list(true).await?))
}

/// Every meal, including inactive ones.
#[instrument(skip(state))]
pub async fn list_all(State(state): State<AppState>) -> Result<Json<Vec<Meal>>> {
    Ok(Json(MealRepository::new(state.pool()).list(false).await?))
}

#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, id: PathParams<MealId>) -> Result<Json<Meal>> {
    let id = path_params(id)?;
    MealRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Meal"))
}

#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    body: JsonBody<NewMeal>,
) -> Result<(StatusCode, Json<Meal>)> {
    let new_meal = json_body(body)?;
    let meal = MealRepository::new(state.pool()).create(&new_meal).await?;
    Ok((StatusCode::CREATED, Json(meal)))
}

#[instrument(skip(state, body))]
pub async fn update(
    State(state): State<AppState>,
    id: PathParams<MealId>,
    body: JsonBody<MealUpdate>,
) -> Result<Json<Meal>> {
    let id = path_params(id)?;
    let update = json_body(body)?;
    let meal = MealRepository::new(state.pool())
        .update(id, &update)
        .await
        .map_err(missing("Meal"))?;
    Ok(Json(meal))
}

#[instrument(skip(state))]
pub async fn destroy(State(state): State<AppState>, id: PathParams<MealId>) -> Result<Json<Detail>> {
    let id = path_params(id)?;
    MealRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(missing("Meal"))?;
    Ok(Json(Detail::new("Meal deleted")))
}
