//! User route handlers (`/users/users`).

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use tracing::instrument;

use spice_hub_core::UserId;
use spice_hub_core::models::{Detail, NewUser, User, UserUpdate};

use crate::db::{RepositoryError, UserRepository};
use crate::error::{AppError, JsonBody, PathParams, Result, json_body, missing, path_params};
use crate::state::AppState;

const EMAIL_TAKEN: &str = "Email already registered";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/by-supabase/{supabase_id}", get(by_supabase_id))
        .route("/{id}", get(show).put(update).delete(destroy))
}

#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    body: JsonBody<NewUser>,
) -> Result<(StatusCode, Json<User>)> {
    let new_user = json_body(body)?;
    let repo = UserRepository::new(state.pool());

    if repo.get_by_email(&new_user.email).await?.is_some() {
        return Err(AppError::BadRequest(EMAIL_TAKEN.to_string()));
    }

    let user = repo.create(&new_user).await.map_err(|e| match e {
        RepositoryError::Conflict(msg) => AppError::BadRequest(msg),
        other => other.into(),
    })?;
    tracing::info!(user_id = %user.id, "User created");
    Ok((StatusCode::CREATED, Json(user)))
}

#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<User>>> {
    Ok(Json(UserRepository::new(state.pool()).list().await?))
}

#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    id: PathParams<UserId>,
) -> Result<Json<User>> {
    let id = path_params(id)?;
    UserRepository::new(state.pool())
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("User"))
}

#[instrument(skip(state))]
pub async fn by_supabase_id(
    State(state): State<AppState>,
    Path(supabase_id): Path<String>,
) -> Result<Json<User>> {
    UserRepository::new(state.pool())
        .get_by_supabase_id(&supabase_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("User"))
}

#[instrument(skip(state, body))]
pub async fn update(
    State(state): State<AppState>,
    id: PathParams<UserId>,
    body: JsonBody<UserUpdate>,
) -> Result<Json<User>> {
    let id = path_params(id)?;
    let update = json_body(body)?;
    let user = UserRepository::new(state.pool())
        .update(id, &update)
        .await
        .map_err(missing("User"))?;
    Ok(Json(user))
}

#[instrument(skip(state))]
pub async fn destroy(
    State(state): State<AppState>,
    id: PathParams<UserId>,
) -> Result<Json<Detail>> {
    let id = path_params(id)?;
    UserRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(missing("User"))?;
    Ok(Json(Detail::new("User deleted")))
}
