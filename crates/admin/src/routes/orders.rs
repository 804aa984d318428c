//! Order management route handlers.

use std::collections::HashMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query},
    http::header,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use spice_hub_core::analytics::filter_orders_by_status;
use spice_hub_core::export::{ExportFormat, ORDER_HEADERS, OrderExportRow, order_rows};
use spice_hub_core::invoice::invoice_filename;
use spice_hub_core::models::{Order, OrderUpdate, User};
use spice_hub_core::pricing::OrderTotals;
use spice_hub_core::{OrderId, OrderItemId, OrderStatus, UserId, format_ksh};

use crate::filters;
use crate::forms::{checked, non_blank};
use crate::middleware::RequireAdmin;
use crate::views::{Layout, OrderItemRow, OrderRow, SelectOption, export_response, users_by_id};

#[derive(Debug, Default, Deserialize)]
pub struct OrderFilter {
    pub status: Option<String>,
    pub q: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>,
    pub status: Option<String>,
    pub q: Option<String>,
}

/// Whether `order` matches a search for `query`: order id, or the
/// customer's name or email.
fn order_matches(order: &Order, users: &HashMap<UserId, &User>, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    let reference = order.reference().to_lowercase();
    if order.id.to_string().contains(&query) || reference.trim_start_matches('#').contains(&query)
    {
        return true;
    }
    users.get(&order.user_id).is_some_and(|u| {
        u.full_name().to_lowercase().contains(&query) || u.email.to_lowercase().contains(&query)
    })
}

/// Orders passing the status filter and search.
fn select<'a>(
    orders: &'a [Order],
    users: &HashMap<UserId, &User>,
    status: &str,
    query: &str,
) -> Vec<&'a Order> {
    filter_orders_by_status(orders, status)
        .into_iter()
        .filter(|o| order_matches(o, users, query))
        .collect()
}

fn status_options(current: &str) -> Vec<SelectOption> {
    OrderStatus::ALL
        .iter()
        .map(|s| SelectOption::new(s.as_str(), s.label(), current))
        .collect()
}

#[derive(Template, WebTemplate)]
#[template(path = "orders/index.html")]
pub struct OrdersIndexTemplate {
    pub layout: Layout,
    pub orders: Vec<OrderRow>,
    pub total: usize,
    pub status: String,
    pub search: String,
    pub statuses: Vec<SelectOption>,
}

/// Order listing with status filter and search.
#[instrument(skip(admin), fields(user_id = %admin.admin.user_id))]
pub async fn index(admin: RequireAdmin, Query(filter): Query<OrderFilter>) -> OrdersIndexTemplate {
    let (orders, users) = tokio::join!(admin.api.list_orders(), admin.api.list_users());
    let orders = admin.or_default(orders, "Failed to load orders.").await;
    let users = admin.or_default(users, "Failed to load customers.").await;

    let status = non_blank(filter.status.as_deref()).unwrap_or_else(|| "all".to_string());
    let search = non_blank(filter.q.as_deref()).unwrap_or_default();
    let by_id = users_by_id(&users);
    let rows = select(&orders, &by_id, &status, &search)
        .into_iter()
        .map(|o| OrderRow::new(o, &by_id))
        .collect();

    let mut statuses = vec![SelectOption::new("all", "All statuses", &status)];
    statuses.extend(status_options(&status));
    OrdersIndexTemplate {
        orders: rows,
        total: orders.len(),
        status,
        search,
        statuses,
        layout: admin.layout("/orders").await,
    }
}

/// Export the orders matching the current filter.
#[instrument(skip(admin), fields(user_id = %admin.admin.user_id))]
pub async fn export(admin: RequireAdmin, Query(query): Query<ExportQuery>) -> Response {
    let format = match query.format.as_deref().unwrap_or("csv").parse::<ExportFormat>() {
        Ok(format) => format,
        Err(e) => {
            admin.flash.error(e.to_string()).await;
            return Redirect::to("/orders").into_response();
        }
    };
    let (orders, users) = tokio::join!(admin.api.list_orders(), admin.api.list_users());
    let (orders, users) = match (orders, users) {
        (Ok(orders), Ok(users)) => (orders, users),
        (Err(e), _) | (_, Err(e)) => {
            admin.report(&e, "Failed to export orders.").await;
            return Redirect::to("/orders").into_response();
        }
    };

    let by_id = users_by_id(&users);
    let selected = select(
        &orders,
        &by_id,
        query.status.as_deref().unwrap_or_default(),
        query.q.as_deref().unwrap_or_default(),
    );
    let cells: Vec<_> = order_rows(&selected, &users)
        .iter()
        .map(OrderExportRow::cells)
        .collect();
    tracing::info!(rows = cells.len(), format = %format, "Orders exported");
    export_response("orders", "Orders", format, &ORDER_HEADERS, &cells)
}

#[derive(Template, WebTemplate)]
#[template(path = "orders/show.html")]
pub struct OrderShowTemplate {
    pub layout: Layout,
    pub order: OrderRow,
    pub items: Vec<OrderItemRow>,
    pub statuses: Vec<SelectOption>,
    pub notes: Vec<String>,
    pub phone: String,
    pub city: String,
    pub area: String,
    pub address: String,
    pub apartment: String,
    pub shipping_method: String,
    pub mpesa_code: Option<String>,
    pub customer_note: Option<String>,
    pub subtotal: String,
    pub shipping: String,
}

/// Order detail.
#[instrument(skip(admin), fields(user_id = %admin.admin.user_id))]
pub async fn show(admin: RequireAdmin, Path(id): Path<OrderId>) -> Response {
    let order = match admin.api.get_order(id).await {
        Ok(order) => order,
        Err(e) => {
            admin.report(&e, "Failed to load order.").await;
            return Redirect::to("/orders").into_response();
        }
    };
    let customer = admin
        .or_default(
            admin.api.get_user(order.user_id).await.map(Some),
            "Failed to load customer.",
        )
        .await;
    let users: HashMap<UserId, &User> = customer.iter().map(|u| (u.id, u)).collect();
    let totals = OrderTotals::for_order(&order);

    OrderShowTemplate {
        order: OrderRow::new(&order, &users),
        items: order.items.iter().map(OrderItemRow::from).collect(),
        statuses: status_options(order.status.as_str()),
        notes: order.internal_notes.clone().unwrap_or_default(),
        phone: order.phone_number.clone(),
        city: order.city.clone(),
        area: order.area.clone(),
        address: order.address.clone(),
        apartment: order.apartment.clone(),
        shipping_method: order.shipping_method.as_str().to_string(),
        mpesa_code: order.mpesa_code.clone(),
        customer_note: order.additional_note.clone(),
        subtotal: format_ksh(totals.subtotal),
        shipping: format_ksh(totals.shipping),
        layout: admin.layout("/orders").await,
    }
    .into_response()
}

/// Download the order's plain-text invoice.
#[instrument(skip(admin), fields(user_id = %admin.admin.user_id))]
pub async fn invoice(admin: RequireAdmin, Path(id): Path<OrderId>) -> Response {
    let order = match admin.api.get_order(id).await {
        Ok(order) => order,
        Err(e) => {
            admin.report(&e, "Failed to load order.").await;
            return Redirect::to("/orders").into_response();
        }
    };
    match admin.api.order_invoice(id).await {
        Ok(text) => (
            [
                (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", invoice_filename(&order)),
                ),
            ],
            text,
        )
            .into_response(),
        Err(e) => {
            admin.report(&e, "Failed to generate invoice.").await;
            Redirect::to(&format!("/orders/{id}")).into_response()
        }
    }
}

/// Where to go after an order action. Only order pages are allowed.
fn back_to(back: Option<&str>, id: OrderId) -> String {
    match back {
        Some(path) if path.starts_with("/orders") && !path.starts_with("//") => path.to_string(),
        _ => format!("/orders/{id}"),
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
    #[serde(default)]
    pub back: Option<String>,
}

/// Change an order's status.
#[instrument(skip(admin, form), fields(user_id = %admin.admin.user_id))]
pub async fn update_status(
    admin: RequireAdmin,
    Path(id): Path<OrderId>,
    Form(form): Form<StatusForm>,
) -> Redirect {
    let target = back_to(form.back.as_deref(), id);
    let Ok(status) = form.status.parse::<OrderStatus>() else {
        admin.flash.error(format!("Unknown status \"{}\".", form.status)).await;
        return Redirect::to(&target);
    };
    let update = OrderUpdate {
        status: Some(status),
        ..OrderUpdate::default()
    };
    match admin.api.update_order(id, &update).await {
        Ok(order) => {
            tracing::info!(order_id = %id, status = %status, "Order status changed");
            admin
                .flash
                .success(format!("Order {} is now {}.", order.reference(), status.label()))
                .await;
        }
        Err(e) => admin.report(&e, "Failed to update order status.").await,
    }
    Redirect::to(&target)
}

#[derive(Debug, Deserialize)]
pub struct PaidForm {
    #[serde(default)]
    pub paid: Option<String>,
    #[serde(default)]
    pub back: Option<String>,
}

/// Mark an order paid or unpaid.
#[instrument(skip(admin, form), fields(user_id = %admin.admin.user_id))]
pub async fn set_paid(
    admin: RequireAdmin,
    Path(id): Path<OrderId>,
    Form(form): Form<PaidForm>,
) -> Redirect {
    let paid = checked(form.paid.as_deref());
    let update = OrderUpdate {
        paid: Some(paid),
        ..OrderUpdate::default()
    };
    match admin.api.update_order(id, &update).await {
        Ok(order) => {
            let state = if paid { "paid" } else { "unpaid" };
            admin
                .flash
                .success(format!("Order {} marked {state}.", order.reference()))
                .await;
        }
        Err(e) => admin.report(&e, "Failed to update payment.").await,
    }
    Redirect::to(&back_to(form.back.as_deref(), id))
}

#[derive(Debug, Deserialize)]
pub struct NoteForm {
    pub note: String,
}

/// Append an internal note. Notes are only visible in the back-office.
#[instrument(skip(admin, form), fields(user_id = %admin.admin.user_id))]
pub async fn add_note(
    admin: RequireAdmin,
    Path(id): Path<OrderId>,
    Form(form): Form<NoteForm>,
) -> Redirect {
    let target = format!("/orders/{id}");
    let Some(note) = non_blank(Some(&form.note)) else {
        admin.flash.error("Note cannot be empty.").await;
        return Redirect::to(&target);
    };
    let order = match admin.api.get_order(id).await {
        Ok(order) => order,
        Err(e) => {
            admin.report(&e, "Failed to load order.").await;
            return Redirect::to(&target);
        }
    };
    let mut notes = order.internal_notes.unwrap_or_default();
    let stamp = chrono::Utc::now().format("%Y-%m-%d %H:%M");
    notes.push(format!("{} ({stamp}): {note}", admin.admin.name));
    let update = OrderUpdate {
        internal_notes: Some(notes),
        ..OrderUpdate::default()
    };
    match admin.api.update_order(id, &update).await {
        Ok(_) => admin.flash.success("Note added.").await,
        Err(e) => admin.report(&e, "Failed to add note.").await,
    }
    Redirect::to(&target)
}

/// Remove a line from an order.
#[instrument(skip(admin), fields(user_id = %admin.admin.user_id))]
pub async fn delete_item(
    admin: RequireAdmin,
    Path((id, item_id)): Path<(OrderId, OrderItemId)>,
) -> Redirect {
    match admin.api.delete_order_item(item_id).await {
        Ok(_) => {
            tracing::info!(order_id = %id, item_id = %item_id, "Order item removed");
            admin.flash.success("Item removed.").await;
        }
        Err(e) => admin.report(&e, "Failed to remove item.").await,
    }
    Redirect::to(&format!("/orders/{id}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use spice_hub_core::{ShippingMethod, UserRole};

    fn user() -> User {
        User {
            id: UserId::new(),
            supabase_id: "sb-1".to_string(),
            first_name: "Amina".to_string(),
            last_name: "Wanjiru".to_string(),
            email: "amina@example.com".to_string(),
            phone_number: None,
            role: UserRole::User,
            is_active: true,
            is_verified: true,
            avatar_url: None,
            created_at: Utc::now(),
            updated_at: None,
            last_login: None,
        }
    }

    fn order(user_id: UserId, status: OrderStatus) -> Order {
        Order {
            id: OrderId::new(),
            user_id,
            status,
            total_amount: Decimal::from(500),
            shipping_method: ShippingMethod::Standard,
            city: "Nairobi".to_string(),
            area: "Westlands".to_string(),
            address: String::new(),
            phone_number: "0712345678".to_string(),
            apartment: String::new(),
            pay_on_delivery: true,
            paid: false,
            mpesa_code: None,
            additional_note: None,
            internal_notes: None,
            created_at: Utc::now(),
            items: vec![],
        }
    }

    #[test]
    fn test_search_by_customer_or_id() {
        let amina = user();
        let users = vec![amina.clone()];
        let by_id = users_by_id(&users);
        let placed = order(amina.id, OrderStatus::Pending);
        let stranger = order(UserId::new(), OrderStatus::Pending);

        assert!(order_matches(&placed, &by_id, "wanjiru"));
        assert!(order_matches(&placed, &by_id, "AMINA@"));
        assert!(!order_matches(&stranger, &by_id, "amina"));

        let short: String = stranger.id.to_string().chars().take(6).collect();
        assert!(order_matches(&stranger, &by_id, &short));
        assert!(order_matches(&stranger, &by_id, " "));
    }

    #[test]
    fn test_select_combines_status_and_search() {
        let amina = user();
        let users = vec![amina.clone()];
        let by_id = users_by_id(&users);
        let orders = vec![
            order(amina.id, OrderStatus::Shipped),
            order(amina.id, OrderStatus::Pending),
            order(UserId::new(), OrderStatus::Shipped),
        ];
        assert_eq!(select(&orders, &by_id, "shipped", "").len(), 2);
        assert_eq!(select(&orders, &by_id, "shipped", "amina").len(), 1);
        assert_eq!(select(&orders, &by_id, "all", "amina").len(), 2);
    }

    #[test]
    fn test_back_to_only_allows_order_pages() {
        let id = OrderId::new();
        assert_eq!(back_to(Some("/orders?status=pending"), id), "/orders?status=pending");
        assert_eq!(back_to(Some("https://evil.example"), id), format!("/orders/{id}"));
        assert_eq!(back_to(None, id), format!("/orders/{id}"));
    }
}
