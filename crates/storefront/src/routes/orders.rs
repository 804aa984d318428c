//! Order confirmation and tracking pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use spice_hub_core::tracking::{TrackingStep, tracking_steps};
use spice_hub_core::{OrderId, OrderStatus};

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{OptionalAuth, RequireAuth, Shopper};
use crate::views::{Layout, OrderView};

#[derive(Template, WebTemplate)]
#[template(path = "orders/confirmation.html")]
pub struct ConfirmationTemplate {
    pub layout: Layout,
    pub order: OrderView,
}

/// Thank-you page after checkout. Only the order's owner may see it.
///
/// # Errors
///
/// Returns 404 if the order does not exist or belongs to someone else.
#[instrument(skip(user, shopper), fields(user_id = %user.user_id))]
pub async fn confirmation(
    RequireAuth(user): RequireAuth,
    shopper: Shopper,
    Path(id): Path<OrderId>,
) -> Result<ConfirmationTemplate> {
    let order = shopper.api().get_order(id).await?;
    if order.user_id != user.user_id {
        tracing::warn!(order_id = %id, "Confirmation requested for another user's order");
        return Err(AppError::NotFound(format!("order {id}")));
    }
    Ok(ConfirmationTemplate {
        order: OrderView::from(&order),
        layout: shopper.layout().await,
    })
}

#[derive(Debug, Default, Deserialize)]
pub struct LookupQuery {
    pub order_id: Option<String>,
}

/// Parsed lookup input. Accepts the bare id or one pasted with spaces.
fn parse_order_id(raw: &str) -> Option<OrderId> {
    raw.trim().parse().ok()
}

#[derive(Template, WebTemplate)]
#[template(path = "orders/lookup.html")]
pub struct LookupTemplate {
    pub layout: Layout,
    pub order_id: String,
}

/// Order lookup form. A submitted id redirects to its tracking page.
#[instrument(skip(shopper))]
pub async fn lookup(shopper: Shopper, Query(query): Query<LookupQuery>) -> Response {
    let raw = query.order_id.unwrap_or_default();
    if !raw.trim().is_empty() {
        if let Some(id) = parse_order_id(&raw) {
            return Redirect::to(&format!("/track-order/{id}")).into_response();
        }
        shopper
            .flash
            .error("That doesn't look like an order number.")
            .await;
    }
    LookupTemplate {
        order_id: raw,
        layout: shopper.layout().await,
    }
    .into_response()
}

#[derive(Template, WebTemplate)]
#[template(path = "orders/track.html")]
pub struct TrackTemplate {
    pub layout: Layout,
    pub order: OrderView,
    pub steps: Vec<TrackingStep>,
    pub cancelled: bool,
    /// Delivery address and phone are only shown to the order's owner.
    pub show_contact: bool,
}

/// Progress of an order through pending, confirmed, processing, shipped,
/// and delivered.
///
/// # Errors
///
/// Returns 404 if the order does not exist.
#[instrument(skip(viewer, shopper))]
pub async fn track(
    OptionalAuth(viewer): OptionalAuth,
    shopper: Shopper,
    Path(id): Path<OrderId>,
) -> Result<TrackTemplate> {
    let order = shopper.api().get_order(id).await?;
    Ok(TrackTemplate {
        show_contact: viewer.is_some_and(|v| v.user_id == order.user_id),
        steps: tracking_steps(order.status),
        cancelled: order.status == OrderStatus::Cancelled,
        order: OrderView::from(&order),
        layout: shopper.layout().await,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_order_id() {
        let id = OrderId::new();
        assert_eq!(parse_order_id(&format!("  {id} ")), Some(id));
        assert_eq!(parse_order_id("#6F1C8A3E"), None);
    }
}
