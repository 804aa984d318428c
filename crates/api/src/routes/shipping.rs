//! Shipping address route handlers (`/shippingAddresses/shipping`).

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
};
use tracing::instrument;

use spice_hub_core::models::{
    Detail, NewShippingAddress, ShippingAddress, ShippingAddressUpdate,
};
use spice_hub_core::{ShippingAddressId, UserId};

use crate::db::{ShippingRepository, UserRepository};
use crate::error::{AppError, JsonBody, PathParams, Result, json_body, missing, path_params};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create))
        .route("/user/{user_id}", get(by_user))
        .route("/{id}", put(update).delete(destroy))
}

/// Save the user's single address. A second one is a conflict.
#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    body: JsonBody<NewShippingAddress>,
) -> Result<(StatusCode, Json<ShippingAddress>)> {
    let new_address = json_body(body)?;
    if !UserRepository::new(state.pool())
        .exists(new_address.user_id)
        .await?
    {
        return Err(AppError::not_found("User"));
    }
    let address = ShippingRepository::new(state.pool())
        .create(&new_address)
        .await?;
    Ok((StatusCode::CREATED, Json(address)))
}

#[instrument(skip(state))]
pub async fn by_user(
    State(state): State<AppState>,
    user_id: PathParams<UserId>,
) -> Result<Json<ShippingAddress>> {
    let user_id = path_params(user_id)?;
    ShippingRepository::new(state.pool())
        .get_by_user(user_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Shipping address"))
}

#[instrument(skip(state, body))]
pub async fn update(
    State(state): State<AppState>,
    id: PathParams<ShippingAddressId>,
    body: JsonBody<ShippingAddressUpdate>,
) -> Result<Json<ShippingAddress>> {
    let id = path_params(id)?;
    let update = json_body(body)?;
    let address = ShippingRepository::new(state.pool())
        .update(id, &update)
        .await
        .map_err(missing("Shipping address"))?;
    Ok(Json(address))
}

#[instrument(skip(state))]
pub async fn destroy(
    State(state): State<AppState>,
    id: PathParams<ShippingAddressId>,
) -> Result<Json<Detail>> {
    let id = path_params(id)?;
    ShippingRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(missing("Shipping address"))?;
    Ok(Json(Detail::new("Shipping address deleted")))
}
