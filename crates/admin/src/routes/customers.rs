//! Customer listing and export.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::Query,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use spice_hub_core::analytics::search_customers;
use spice_hub_core::export::{CUSTOMER_HEADERS, CustomerExportRow, ExportFormat, customer_rows};
use spice_hub_core::UserRole;
use spice_hub_core::models::User;

use crate::filters;
use crate::forms::non_blank;
use crate::middleware::RequireAdmin;
use crate::views::{CustomerRow, Layout, export_response};

#[derive(Debug, Default, Deserialize)]
pub struct CustomerQuery {
    pub q: Option<String>,
    pub format: Option<String>,
}

/// Shoppers matching `query`. Admin and guest accounts are left out.
fn shoppers<'a>(users: &'a [User], query: &str) -> Vec<&'a User> {
    search_customers(users, query)
        .into_iter()
        .filter(|u| u.role == UserRole::User)
        .collect()
}

#[derive(Template, WebTemplate)]
#[template(path = "customers/index.html")]
pub struct CustomersIndexTemplate {
    pub layout: Layout,
    pub customers: Vec<CustomerRow>,
    pub search: String,
}

/// Customer listing with name or email search.
#[instrument(skip(admin), fields(user_id = %admin.admin.user_id))]
pub async fn index(
    admin: RequireAdmin,
    Query(query): Query<CustomerQuery>,
) -> CustomersIndexTemplate {
    let (users, orders) = tokio::join!(admin.api.list_users(), admin.api.list_orders());
    let users = admin.or_default(users, "Failed to load customers.").await;
    let orders = admin.or_default(orders, "Failed to load orders.").await;

    let search = non_blank(query.q.as_deref()).unwrap_or_default();
    CustomersIndexTemplate {
        customers: shoppers(&users, &search)
            .into_iter()
            .map(|u| CustomerRow::new(u, &orders))
            .collect(),
        search,
        layout: admin.layout("/customers").await,
    }
}

/// Export the customers matching the current search.
#[instrument(skip(admin), fields(user_id = %admin.admin.user_id))]
pub async fn export(admin: RequireAdmin, Query(query): Query<CustomerQuery>) -> Response {
    let format = match query.format.as_deref().unwrap_or("csv").parse::<ExportFormat>() {
        Ok(format) => format,
        Err(e) => {
            admin.flash.error(e.to_string()).await;
            return Redirect::to("/customers").into_response();
        }
    };
    let (users, orders) = tokio::join!(admin.api.list_users(), admin.api.list_orders());
    let (users, orders) = match (users, orders) {
        (Ok(users), Ok(orders)) => (users, orders),
        (Err(e), _) | (_, Err(e)) => {
            admin.report(&e, "Failed to export customers.").await;
            return Redirect::to("/customers").into_response();
        }
    };

    let selected = shoppers(&users, query.q.as_deref().unwrap_or_default());
    let cells: Vec<_> = customer_rows(&selected, &orders)
        .iter()
        .map(CustomerExportRow::cells)
        .collect();
    tracing::info!(rows = cells.len(), format = %format, "Customers exported");
    export_response("customers", "Customers", format, &CUSTOMER_HEADERS, &cells)
}
