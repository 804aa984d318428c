//! Dashboard route handler.

use askama::Template;
use askama_web::WebTemplate;
use tracing::instrument;

use spice_hub_core::analytics::{
    CategorySales, MonthlySales, TopProduct, category_sales, orders_by_month, recent_orders,
    top_products, total_revenue,
};
use spice_hub_core::models::ProductQuery;
use spice_hub_core::{UserRole, format_grams, format_ksh};

use crate::filters;
use crate::middleware::RequireAdmin;
use crate::views::{Layout, OrderRow, users_by_id};

/// Number of rows in the recent orders and top products panels.
const PANEL_ROWS: usize = 5;

/// Headline numbers.
#[derive(Debug, Clone)]
pub struct DashboardMetrics {
    pub revenue: String,
    pub orders: usize,
    pub products: usize,
    pub customers: usize,
}

/// Monthly chart row. `bar` is the percentage of the busiest month.
#[derive(Debug, Clone)]
pub struct MonthView {
    pub month: String,
    pub revenue: String,
    pub orders: usize,
    pub bar: i64,
}

impl MonthView {
    fn rows(months: &[MonthlySales]) -> Vec<Self> {
        let busiest = months.iter().map(|m| m.orders).max().unwrap_or(0);
        months
            .iter()
            .map(|m| Self {
                month: m.month.clone(),
                revenue: format_ksh(m.revenue),
                orders: m.orders,
                bar: percent(m.orders, busiest),
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct TopProductView {
    pub name: String,
    pub price: String,
    pub sold: String,
    pub revenue: String,
}

impl From<&TopProduct> for TopProductView {
    fn from(product: &TopProduct) -> Self {
        Self {
            name: product.name.clone(),
            price: format_ksh(product.price),
            sold: format_grams(i32::try_from(product.sales).unwrap_or(i32::MAX)),
            revenue: format_ksh(product.revenue),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CategoryShareView {
    pub name: String,
    pub color: String,
    pub share: i64,
    pub revenue: String,
}

impl CategoryShareView {
    fn rows(sales: &[CategorySales]) -> Vec<Self> {
        let total: i64 = sales.iter().map(|c| c.value).sum();
        sales
            .iter()
            .map(|c| Self {
                name: c.name.clone(),
                color: c.color.clone(),
                share: c.share_of(total),
                revenue: format_ksh(c.revenue),
            })
            .collect()
    }
}

fn percent(part: usize, whole: usize) -> i64 {
    if whole == 0 {
        return 0;
    }
    i64::try_from(part * 100 / whole).unwrap_or(100)
}

#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub layout: Layout,
    pub metrics: DashboardMetrics,
    pub months: Vec<MonthView>,
    pub top_products: Vec<TopProductView>,
    pub categories: Vec<CategoryShareView>,
    pub recent_orders: Vec<OrderRow>,
}

/// Dashboard overview computed from orders, products, and users.
#[instrument(skip(admin), fields(user_id = %admin.admin.user_id))]
pub async fn index(admin: RequireAdmin) -> DashboardTemplate {
    let query = ProductQuery::default();
    let (orders, products, users) = tokio::join!(
        admin.api.list_orders(),
        admin.api.list_products(&query),
        admin.api.list_users(),
    );
    let orders = admin.or_default(orders, "Failed to load orders.").await;
    let products = admin.or_default(products, "Failed to load products.").await;
    let users = admin.or_default(users, "Failed to load customers.").await;

    let by_id = users_by_id(&users);
    DashboardTemplate {
        metrics: DashboardMetrics {
            revenue: format_ksh(total_revenue(&orders)),
            orders: orders.len(),
            products: products.len(),
            customers: users.iter().filter(|u| u.role == UserRole::User).count(),
        },
        months: MonthView::rows(&orders_by_month(&orders)),
        top_products: top_products(&orders, &products, PANEL_ROWS)
            .iter()
            .map(TopProductView::from)
            .collect(),
        categories: CategoryShareView::rows(&category_sales(&orders, &products)),
        recent_orders: recent_orders(&orders, PANEL_ROWS)
            .into_iter()
            .map(|o| OrderRow::new(o, &by_id))
            .collect(),
        layout: admin.layout("/").await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_month_bars_relative_to_busiest() {
        let months = vec![
            MonthlySales {
                month: "Jan".into(),
                revenue: Decimal::from(1000),
                orders: 4,
            },
            MonthlySales {
                month: "Feb".into(),
                revenue: Decimal::ZERO,
                orders: 1,
            },
        ];
        let rows = MonthView::rows(&months);
        assert_eq!(rows.first().map(|r| r.bar), Some(100));
        assert_eq!(rows.get(1).map(|r| r.bar), Some(25));
        assert_eq!(rows.first().map(|r| r.revenue.as_str()), Some("Ksh 1000.00"));
    }

    #[test]
    fn test_category_shares() {
        let sales = vec![
            CategorySales {
                name: "Seeds".into(),
                value: 300,
                revenue: Decimal::from(900),
                color: "#99582A".into(),
            },
            CategorySales {
                name: "Blends".into(),
                value: 100,
                revenue: Decimal::from(150),
                color: "#B5764A".into(),
            },
        ];
        let rows = CategoryShareView::rows(&sales);
        assert_eq!(rows.first().map(|r| r.share), Some(75));
        assert_eq!(rows.get(1).map(|r| r.share), Some(25));
    }

    #[test]
    fn test_percent_of_zero() {
        assert_eq!(percent(3, 0), 0);
    }
}
