//! Review route handlers (`/reviews/reviews`).
//!
//! Creating or deleting a review recomputes the product's `rating` and
//! `reviewCount`.

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use tracing::instrument;

use spice_hub_core::models::{Detail, NewReview, Review, ReviewUpdate};
use spice_hub_core::{ProductId, ReviewId, UserId};

use crate::db::{ProductRepository, ReviewRepository, UserRepository};
use crate::error::{AppError, JsonBody, PathParams, Result, json_body, missing, path_params};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/product/{product_id}", get(by_product))
        .route("/user/{user_id}", get(by_user))
        .route("/{id}", get(show).put(update).delete(destroy))
}

#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    body: JsonBody<NewReview>,
) -> Result<(StatusCode, Json<Review>)> {
    let new_review = json_body(body)?;
    let products = ProductRepository::new(state.pool());

    if !products.exists(new_review.product_id).await? {
        return Err(AppError::not_found("Product"));
    }
    if !UserRepository::new(state.pool())
        .exists(new_review.user_id)
        .await?
    {
        return Err(AppError::not_found("User"));
    }

    let review = ReviewRepository::new(state.pool()).create(&new_review).await?;
    products.refresh_rating(review.product_id).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Review>>> {
    Ok(Json(ReviewRepository::new(state.pool()).list().await?))
}

#[instrument(skip(state))]
pub async fn by_product(
    State(state): State<AppState>,
    product_id: PathParams<ProductId>,
) -> Result<Json<Vec<Review>>> {
    let product_id = path_params(product_id)?;
    Ok(Json(
        ReviewRepository::new(state.pool())
            .list_by_product(product_id)
            .await?,
    ))
}

#[instrument(skip(state))]
pub async fn by_user(
    State(state): State<AppState>,
    user_id: PathParams<UserId>,
) -> Result<Json<Vec<Review>>> {
    let user_id = path_params(user_id)?;
    Ok(Json(
        ReviewRepository::new(state.pool())
            .list_by_user(user_id)
            .await?,
    ))
}

#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, id: PathParams<ReviewId>) -> Result<Json<Review>> {
    let id = path_params(id)?;
    ReviewRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Review"))
}

#[instrument(skip(state, body))]
pub async fn update(
    State(state): State<AppState>,
    id: PathParams<ReviewId>,
    body: JsonBody<ReviewUpdate>,
) -> Result<Json<Review>> {
    let id = path_params(id)?;
    let update = json_body(body)?;
    let review = ReviewRepository::new(state.pool())
        .update(id, &update)
        .await
        .map_err(missing("Review"))?;
    if update.rating.is_some() {
        ProductRepository::new(state.pool())
            .refresh_rating(review.product_id)
            .await?;
    }
    Ok(Json(review))
}

#[instrument(skip(state))]
pub async fn destroy(State(state): State<AppState>, id: PathParams<ReviewId>) -> Result<Json<Detail>> {
    let id = path_params(id)?;
    let product_id = ReviewRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(missing("Review"))?;
    ProductRepository::new(state.pool())
        .refresh_rating(product_id)
        .await?;
    Ok(Json(Detail::new("Review deleted")))
}
