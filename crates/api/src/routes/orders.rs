//! Order route handlers (`/orders/orders`).

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, put},
};
use tracing::instrument;

use spice_hub_core::analytics::{self, CategorySales, TopProduct};
use spice_hub_core::invoice::{invoice_filename, render_invoice};
use spice_hub_core::models::{
    Detail, NewOrder, Order, OrderItem, OrderItemUpdate, OrderUpdate, ProductQuery,
};
use spice_hub_core::{OrderId, OrderItemId, UserId};

use crate::db::{OrderRepository, ProductRepository, UserRepository};
use crate::error::{AppError, JsonBody, PathParams, Result, json_body, missing, path_params};
use crate::state::AppState;

const TOP_PRODUCTS: usize = 5;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/user/{user_id}", get(by_user))
        .route("/items/topProducts", get(top_products))
        .route("/items/categorySales", get(category_sales))
        .route("/items/{item_id}", put(update_item).delete(delete_item))
        .route("/{id}", get(show).put(update).delete(destroy))
        .route("/{id}/invoice", get(invoice))
}

#[instrument(skip(state, body))]
pub async fn create(
    State(state): State<AppState>,
    body: JsonBody<NewOrder>,
) -> Result<(StatusCode, Json<Order>)> {
    let new_order = json_body(body)?;

    if !UserRepository::new(state.pool())
        .exists(new_order.user_id)
        .await?
    {
        return Err(AppError::not_found("User"));
    }

    let product_ids: Vec<_> = new_order.items.iter().map(|i| i.product_id).collect();
    if let Some(missing_id) = ProductRepository::new(state.pool())
        .first_missing(&product_ids)
        .await?
    {
        return Err(AppError::NotFound(format!("Product {missing_id} not found")));
    }

    let order = OrderRepository::new(state.pool()).create(&new_order).await?;
    tracing::info!(
        order_id = %order.id,
        items = order.items.len(),
        total = %order.total_amount,
        "Order placed"
    );
    Ok((StatusCode::CREATED, Json(order)))
}

#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Order>>> {
    Ok(Json(OrderRepository::new(state.pool()).list().await?))
}

#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, id: PathParams<OrderId>) -> Result<Json<Order>> {
    let id = path_params(id)?;
    OrderRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::not_found("Order"))
}

#[instrument(skip(state))]
pub async fn by_user(
    State(state): State<AppState>,
    user_id: PathParams<UserId>,
) -> Result<Json<Vec<Order>>> {
    let user_id = path_params(user_id)?;
    Ok(Json(
        OrderRepository::new(state.pool())
            .list_by_user(user_id)
            .await?,
    ))
}

#[instrument(skip(state, body))]
pub async fn update(
    State(state): State<AppState>,
    id: PathParams<OrderId>,
    body: JsonBody<OrderUpdate>,
) -> Result<Json<Order>> {
    let id = path_params(id)?;
    let update = json_body(body)?;
    let order = OrderRepository::new(state.pool())
        .update(id, &update)
        .await
        .map_err(missing("Order"))?;
    tracing::info!(order_id = %order.id, status = %order.status, paid = order.paid, "Order updated");
    Ok(Json(order))
}

#[instrument(skip(state))]
pub async fn destroy(State(state): State<AppState>, id: PathParams<OrderId>) -> Result<Json<Detail>> {
    let id = path_params(id)?;
    OrderRepository::new(state.pool())
        .delete(id)
        .await
        .map_err(missing("Order"))?;
    Ok(Json(Detail::new("Order deleted")))
}

#[instrument(skip(state, body))]
pub async fn update_item(
    State(state): State<AppState>,
    item_id: PathParams<OrderItemId>,
    body: JsonBody<OrderItemUpdate>,
) -> Result<Json<OrderItem>> {
    let item_id = path_params(item_id)?;
    let update = json_body(body)?;
    let item = OrderRepository::new(state.pool())
        .update_item(item_id, &update)
        .await
        .map_err(missing("Order item"))?;
    Ok(Json(item))
}

#[instrument(skip(state))]
pub async fn delete_item(
    State(state): State<AppState>,
    item_id: PathParams<OrderItemId>,
) -> Result<Json<Detail>> {
    let item_id = path_params(item_id)?;
    OrderRepository::new(state.pool())
        .delete_item(item_id)
        .await
        .map_err(missing("Order item"))?;
    Ok(Json(Detail::new("Order item deleted")))
}

/// Best sellers by revenue at current prices.
#[instrument(skip(state))]
pub async fn top_products(State(state): State<AppState>) -> Result<Json<Vec<TopProduct>>> {
    let orders = OrderRepository::new(state.pool()).list().await?;
    let products = ProductRepository::new(state.pool())
        .list(&ProductQuery::default())
        .await?;
    Ok(Json(analytics::top_products(&orders, &products, TOP_PRODUCTS)))
}

/// Grams sold and revenue per category.
#[instrument(skip(state))]
pub async fn category_sales(State(state): State<AppState>) -> Result<Json<Vec<CategorySales>>> {
    let orders = OrderRepository::new(state.pool()).list().await?;
    let products = ProductRepository::new(state.pool())
        .list(&ProductQuery::default())
        .await?;
    Ok(Json(analytics::category_sales(&orders, &products)))
}

/// Plain-text invoice as a download.
#[instrument(skip(state))]
pub async fn invoice(
    State(state): State<AppState>,
    id: PathParams<OrderId>,
) -> Result<impl IntoResponse> {
    let id = path_params(id)?;
    let order = OrderRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::not_found("Order"))?;

    let disposition = format!("attachment; filename={}", invoice_filename(&order));
    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        render_invoice(&order),
    ))
}
