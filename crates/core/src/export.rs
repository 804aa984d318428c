//! Order and customer exports for the back-office.
//!
//! CSV and tab-separated ("Excel") output are produced here. The printable
//! HTML variant is rendered by the admin templates from the same rows.

use core::fmt;
use core::str::FromStr;
use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::analytics::customer_stats;
use crate::models::{Order, User};
use crate::types::UserId;

/// Headers of the orders export.
pub const ORDER_HEADERS: [&str; 8] = [
    "Order ID", "Customer", "Email", "Date", "Items", "Payment", "Total", "Status",
];

/// Headers of the customers export.
pub const CUSTOMER_HEADERS: [&str; 5] = ["Name", "Email", "Orders", "Total Spent", "Join Date"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExportError {
    #[error("unknown export format: {0}")]
    UnknownFormat(String),
}

/// Output format chosen from the export menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    /// Tab-separated values, which spreadsheet tools open directly.
    Excel,
    /// Printable HTML page.
    Print,
}

impl ExportFormat {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Excel => "excel",
            Self::Print => "print",
        }
    }

    #[must_use]
    pub const fn delimiter(&self) -> char {
        match self {
            Self::Excel => '\t',
            Self::Csv | Self::Print => ',',
        }
    }

    #[must_use]
    pub const fn content_type(&self) -> &'static str {
        match self {
            Self::Csv => "text/csv; charset=utf-8",
            Self::Excel => "text/tab-separated-values; charset=utf-8",
            Self::Print => "text/html; charset=utf-8",
        }
    }

    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Excel => "xls",
            Self::Print => "html",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "excel" | "xls" | "tsv" => Ok(Self::Excel),
            "print" | "pdf" | "html" => Ok(Self::Print),
            other => Err(ExportError::UnknownFormat(other.to_owned())),
        }
    }
}

/// `orders-export-2025-05-04.csv` and friends.
#[must_use]
pub fn export_filename(kind: &str, format: ExportFormat, date: NaiveDate) -> String {
    format!(
        "{kind}-export-{}.{}",
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

/// One exported field. Free-text fields are quoted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Plain(String),
    Quoted(String),
}

impl Cell {
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Plain(s) | Self::Quoted(s) => s,
        }
    }

    fn render(&self, delimiter: char) -> String {
        match self {
            Self::Quoted(s) => format!("\"{}\"", s.replace('"', "\"\"")),
            Self::Plain(s) if s.contains(delimiter) || s.contains('"') || s.contains('\n') => {
                format!("\"{}\"", s.replace('"', "\"\""))
            }
            Self::Plain(s) => s.clone(),
        }
    }
}

/// A row of the orders export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderExportRow {
    pub order_id: String,
    pub customer: String,
    pub email: String,
    pub date: String,
    pub items: usize,
    pub payment: String,
    pub total: Decimal,
    pub status: String,
}

impl OrderExportRow {
    #[must_use]
    pub fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::Plain(self.order_id.clone()),
            Cell::Quoted(self.customer.clone()),
            Cell::Plain(self.email.clone()),
            Cell::Quoted(self.date.clone()),
            Cell::Plain(self.items.to_string()),
            Cell::Quoted(self.payment.clone()),
            Cell::Plain(self.total.normalize().to_string()),
            Cell::Plain(self.status.clone()),
        ]
    }
}

/// Build order rows, resolving customer name and email from `users`.
/// Unknown customers export as `Unknown` with an empty email.
#[must_use]
pub fn order_rows(orders: &[&Order], users: &[User]) -> Vec<OrderExportRow> {
    let by_id: HashMap<UserId, &User> = users.iter().map(|u| (u.id, u)).collect();
    orders
        .iter()
        .map(|order| {
            let user = by_id.get(&order.user_id);
            OrderExportRow {
                order_id: order.id.to_string(),
                customer: user.map_or_else(|| "Unknown".to_owned(), |u| u.full_name()),
                email: user.map(|u| u.email.clone()).unwrap_or_default(),
                date: order.created_at.format("%Y-%m-%d %H:%M").to_string(),
                items: order.items.len(),
                payment: order.payment_method().label().to_owned(),
                total: order.total_amount,
                status: order.status.as_str().to_owned(),
            }
        })
        .collect()
}

/// A row of the customers export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerExportRow {
    pub name: String,
    pub email: String,
    pub orders: usize,
    pub total_spent: Decimal,
    pub joined: String,
}

impl CustomerExportRow {
    #[must_use]
    pub fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::Quoted(self.name.clone()),
            Cell::Plain(self.email.clone()),
            Cell::Plain(self.orders.to_string()),
            Cell::Plain(self.total_spent.normalize().to_string()),
            Cell::Quoted(self.joined.clone()),
        ]
    }
}

#[must_use]
pub fn customer_rows(users: &[&User], orders: &[Order]) -> Vec<CustomerExportRow> {
    users
        .iter()
        .map(|user| {
            let stats = customer_stats(user.id, orders);
            CustomerExportRow {
                name: user.full_name(),
                email: user.email.clone(),
                orders: stats.orders,
                total_spent: stats.total_spent,
                joined: user.created_at.format("%Y-%m-%d").to_string(),
            }
        })
        .collect()
}

/// Join a header line and rows with `format`'s delimiter, one line per row.
#[must_use]
pub fn to_delimited(headers: &[&str], rows: &[Vec<Cell>], format: ExportFormat) -> String {
    let delimiter = format.delimiter();
    let sep = delimiter.to_string();
    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(headers.join(&sep));
    for row in rows {
        let rendered: Vec<String> = row.iter().map(|cell| cell.render(delimiter)).collect();
        lines.push(rendered.join(&sep));
    }
    lines.join("\n")
}

/// Orders export as CSV or tab-separated text.
#[must_use]
pub fn orders_to_delimited(rows: &[OrderExportRow], format: ExportFormat) -> String {
    let cells: Vec<Vec<Cell>> = rows.iter().map(OrderExportRow::cells).collect();
    to_delimited(&ORDER_HEADERS, &cells, format)
}

/// Customers export as CSV or tab-separated text.
#[must_use]
pub fn customers_to_delimited(rows: &[CustomerExportRow], format: ExportFormat) -> String {
    let cells: Vec<Vec<Cell>> = rows.iter().map(CustomerExportRow::cells).collect();
    to_delimited(&CUSTOMER_HEADERS, &cells, format)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::models::OrderItem;
    use crate::types::{
        OrderId, OrderItemId, OrderStatus, ProductId, ShippingMethod, UserRole,
    };
    use chrono::{TimeZone, Utc};

    fn user() -> User {
        User {
            id: UserId::new(),
            supabase_id: "sb-1".into(),
            first_name: "Achieng".into(),
            last_name: "O\"Neil".into(),
            email: "achieng@example.com".into(),
            phone_number: None,
            role: UserRole::User,
            is_active: true,
            is_verified: true,
            avatar_url: None,
            created_at: Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap(),
            updated_at: None,
            last_login: None,
        }
    }

    fn order(user_id: UserId) -> Order {
        Order {
            id: OrderId::new(),
            user_id,
            status: OrderStatus::Delivered,
            total_amount: Decimal::new(125_050, 2),
            shipping_method: ShippingMethod::Express,
            city: "Mombasa".into(),
            area: "Nyali".into(),
            address: "Links Rd".into(),
            phone_number: "0711".into(),
            apartment: String::new(),
            pay_on_delivery: false,
            paid: true,
            mpesa_code: Some("ABC".into()),
            additional_note: None,
            internal_notes: None,
            created_at: Utc.with_ymd_and_hms(2025, 2, 3, 4, 5, 0).unwrap(),
            items: vec![OrderItem {
                id: OrderItemId::new(),
                product_id: ProductId::new(),
                container: None,
                name: None,
                image: None,
                quantity: 100,
                price: Decimal::from(750),
            }],
        }
    }

    #[test]
    fn test_orders_csv() {
        let u = user();
        let o = order(u.id);
        let rows = order_rows(&[&o], &[u]);
        let csv = orders_to_delimited(&rows, ExportFormat::Csv);
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Order ID,Customer,Email,Date,Items,Payment,Total,Status"
        );
        assert_eq!(
            lines.next().unwrap(),
            format!(
                "{},\"Achieng O\"\"Neil\",achieng@example.com,\"2025-02-03 04:05\",1,\"M-Pesa\",1250.5,delivered",
                o.id
            )
        );
    }

    #[test]
    fn test_excel_uses_tabs() {
        let o = order(UserId::new());
        let rows = order_rows(&[&o], &[]);
        let tsv = orders_to_delimited(&rows, ExportFormat::Excel);
        let line = tsv.lines().nth(1).unwrap();
        assert_eq!(line.split('\t').count(), 8);
        assert!(line.contains("\"Unknown\""));
    }

    #[test]
    fn test_customer_rows() {
        let u = user();
        let orders = vec![order(u.id), order(u.id)];
        let rows = customer_rows(&[&u], &orders);
        assert_eq!(rows[0].orders, 2);
        assert_eq!(rows[0].total_spent, Decimal::new(250_100, 2));
        let csv = customers_to_delimited(&rows, ExportFormat::Csv);
        assert!(csv.starts_with("Name,Email,Orders,Total Spent,Join Date\n"));
        assert!(csv.ends_with(",2,2501,\"2024-12-01\""));
    }

    #[test]
    fn test_format_parse_and_filename() {
        assert_eq!("Excel".parse::<ExportFormat>().unwrap(), ExportFormat::Excel);
        assert!("docx".parse::<ExportFormat>().is_err());
        let date = NaiveDate::from_ymd_opt(2025, 5, 4).unwrap();
        assert_eq!(
            export_filename("orders", ExportFormat::Csv, date),
            "orders-export-2025-05-04.csv"
        );
    }
}
