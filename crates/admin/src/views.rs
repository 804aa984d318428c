//! Display rows for back-office tables.

use std::collections::HashMap;

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    http::header,
    response::{IntoResponse, Response},
};
use chrono::Utc;

use spice_hub_core::analytics::customer_stats;
use spice_hub_core::export::{Cell, ExportFormat, export_filename, to_delimited};
use spice_hub_core::models::{Order, OrderItem, User};
use spice_hub_core::{UserId, format_grams, format_ksh};

use crate::models::FlashMessage;

/// Chrome shared by every page: sidebar, signed-in admin, notices.
#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub admin_name: Option<String>,
    pub current_path: String,
    pub flash: Vec<FlashMessage>,
}

impl Layout {
    /// Whether a sidebar link to `prefix` should be highlighted.
    #[must_use]
    pub fn is_active(&self, prefix: &str) -> bool {
        if prefix == "/" {
            self.current_path == "/"
        } else {
            self.current_path.starts_with(prefix)
        }
    }
}

/// `<option>` of a select box.
#[derive(Debug, Clone)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl SelectOption {
    #[must_use]
    pub fn new(value: impl Into<String>, label: impl Into<String>, current: &str) -> Self {
        let value = value.into();
        Self {
            selected: value == current,
            label: label.into(),
            value,
        }
    }
}

/// Row of the orders table.
#[derive(Debug, Clone)]
pub struct OrderRow {
    pub id: String,
    pub reference: String,
    pub customer: String,
    pub email: String,
    pub date: String,
    pub items: usize,
    pub payment: String,
    pub paid: bool,
    pub total: String,
    pub status: String,
    pub status_key: String,
}

impl OrderRow {
    /// Row for `order`, naming the customer from `users` when known.
    #[must_use]
    pub fn new(order: &Order, users: &HashMap<UserId, &User>) -> Self {
        let user = users.get(&order.user_id);
        Self {
            id: order.id.to_string(),
            reference: order.reference(),
            customer: user.map_or_else(|| "Unknown".to_string(), |u| u.full_name()),
            email: user.map(|u| u.email.clone()).unwrap_or_default(),
            date: order.created_at.format("%Y-%m-%d %H:%M").to_string(),
            items: order.items.len(),
            payment: order.payment_method().label().to_string(),
            paid: order.paid,
            total: format_ksh(order.total_amount),
            status: order.status.label().to_string(),
            status_key: order.status.as_str().to_string(),
        }
    }
}

/// Order line on the detail page, with its id for deletion.
#[derive(Debug, Clone)]
pub struct OrderItemRow {
    pub id: String,
    pub name: String,
    pub container: Option<String>,
    pub quantity: String,
    pub unit_price: String,
    pub line_total: String,
}

impl From<&OrderItem> for OrderItemRow {
    fn from(item: &OrderItem) -> Self {
        Self {
            id: item.id.to_string(),
            name: item.display_name().to_string(),
            container: item.container.clone(),
            quantity: format_grams(item.quantity),
            unit_price: format_ksh(item.price),
            line_total: format_ksh(item.line_total()),
        }
    }
}

/// Row of the customers table.
#[derive(Debug, Clone)]
pub struct CustomerRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: String,
    pub orders: usize,
    pub total_spent: String,
    pub joined: String,
}

impl CustomerRow {
    #[must_use]
    pub fn new(user: &User, orders: &[Order]) -> Self {
        let stats = customer_stats(user.id, orders);
        Self {
            id: user.id.to_string(),
            name: user.full_name(),
            email: user.email.clone(),
            phone: user.phone_number.clone().unwrap_or_default(),
            role: user.role.as_str().to_string(),
            orders: stats.orders,
            total_spent: format_ksh(stats.total_spent),
            joined: user.created_at.format("%Y-%m-%d").to_string(),
        }
    }
}

/// Index users by id for order rows.
#[must_use]
pub fn users_by_id(users: &[User]) -> HashMap<UserId, &User> {
    users.iter().map(|u| (u.id, u)).collect()
}

/// Printable export page. The browser's print dialog opens on load.
#[derive(Template, WebTemplate)]
#[template(path = "export_print.html")]
pub struct ExportPrintTemplate {
    pub title: String,
    pub generated: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Respond with an export of `rows`: a CSV or tab-separated download, or a
/// printable page.
#[must_use]
pub fn export_response(
    kind: &str,
    title: &str,
    format: ExportFormat,
    headers: &[&str],
    rows: &[Vec<Cell>],
) -> Response {
    let now = Utc::now();
    if format == ExportFormat::Print {
        return ExportPrintTemplate {
            title: title.to_string(),
            generated: now.format("%Y-%m-%d %H:%M UTC").to_string(),
            headers: headers.iter().map(|h| (*h).to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|cell| cell.text().to_string()).collect())
                .collect(),
        }
        .into_response();
    }

    let filename = export_filename(kind, format, now.date_naive());
    (
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        to_delimited(headers, rows, format),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_is_active() {
        let layout = Layout {
            current_path: "/orders/abc".to_string(),
            ..Layout::default()
        };
        assert!(layout.is_active("/orders"));
        assert!(!layout.is_active("/"));
        assert!(!layout.is_active("/products"));
    }

    #[test]
    fn test_csv_export_is_an_attachment() {
        let rows = vec![vec![Cell::Quoted("Amina Wanjiru".into()), Cell::Plain("2".into())]];
        let response = export_response(
            "customers",
            "Customers",
            ExportFormat::Csv,
            &["Name", "Orders"],
            &rows,
        );
        let headers = response.headers();
        assert_eq!(
            headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()),
            Some("text/csv; charset=utf-8")
        );
        let disposition = headers
            .get(header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        assert!(disposition.starts_with("attachment; filename=\"customers-export-"));
        assert!(disposition.ends_with(".csv\""));
    }

    #[test]
    fn test_select_option_marks_current() {
        assert!(SelectOption::new("shipped", "Shipped", "shipped").selected);
        assert!(!SelectOption::new("pending", "Pending", "shipped").selected);
    }
}
