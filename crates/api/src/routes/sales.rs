//! Sale route handlers (`/sales/sales`).

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use tracing::instrument;

use spice_hub_core::SaleId;
use spice_hub_core::models::{Detail, NewSale, Sale, SaleUpdate};

use crate::db::{ProductRepository, SaleRepository};
use crate::error::{AppError, JsonBody, PathParams, Result, json_body, missing, path_params};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/active", get(active))
        .route("/{id}", get(show).put(update).delete(destroy))
}

#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Sale>>> {
    Ok(Json(SaleRepository::new(state.pool()).list().await?))
}

/// The sale currently running on the storefront.
#[instrument(skip(state))]
pub async fn active(State(state): State<AppState>) -> Result<Json<Sale>> {
    SaleRepository::new(state.pool())
        .active()
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("No active sale".to_string()))
}

#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, id: PathParams<SaleId>) -> Result<Json<Sale>> {
    let id = path_params(id)?;
    SaleRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Sale"))
}

#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    body: JsonBody<NewSale>,
) -> Result<(StatusCode, Json<Sale>)> {
    let new_sale = json_body(body)?;
    if new_sale.end_date <= new_sale.start_date {
        return Err(AppError::BadRequest(
            "Sale must end after it starts".to_string(),
        ));
    }
    let product_ids: Vec<_> = new_sale.products.iter().map(|p| p.product_id).collect();
    if let Some(missing_id) = ProductRepository::new(state.pool())
        .first_missing(&product_ids)
        .await?
    {
        return Err(AppError::NotFound(format!("Product {missing_id} not found")));
    }

    let sale = SaleRepository::new(state.pool()).create(&new_sale).await?;
    tracing::info!(sale_id = %sale.id, name = %sale.name, "Sale created");
    Ok((StatusCode::CREATED, Json(sale)))
}

#[instrument(skip(state, body))]
pub async fn update(
    State(state): State<AppState>,
    id: PathParams<SaleId>,
    body: JsonBody<SaleUpdate>,
) -> Result<Json<Sale>> {
    let id = path_params(id)?;
    let update = json_body(body)?;
    let sale = SaleRepository::new(state.pool())
        .update(id, &update)
        .await
        .map_err(missing("Sale"))?;
    Ok(Json(sale))
}

#[instrument(skip(state))]
pub async fn destroy(State(state): State<AppState>, id: PathParams<SaleId>) -> Result<Json<Detail>> {
    let id = path_params(id)?;
    SaleRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(missing("Sale"))?;
    Ok(Json(Detail::new("Sale deleted")))
}
