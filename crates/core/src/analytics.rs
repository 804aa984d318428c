//! Dashboard aggregates computed over orders.
//!
//! Revenue is only recognised for delivered orders. Gram quantities are
//! converted to 100 g units before multiplying by a price.

use std::collections::HashMap;

use chrono::Datelike;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Order, Product, User};
use crate::types::{OrderStatus, ProductId, UserId, grams_to_units};

/// Chart colours assigned to categories in first-seen order.
pub const CATEGORY_COLORS: [&str; 5] = ["#99582A", "#B5764A", "#D19B6A", "#E8C18C", "#FFE6A7"];

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Sum of `total_amount` across delivered orders.
#[must_use]
pub fn total_revenue(orders: &[Order]) -> Decimal {
    orders
        .iter()
        .filter(|o| o.status == OrderStatus::Delivered)
        .map(|o| o.total_amount)
        .sum()
}

/// Revenue and order count for one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlySales {
    pub month: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub revenue: Decimal,
    pub orders: usize,
}

/// Bucket orders by month name, Jan..Dec, keeping only months with orders.
///
/// Every order is counted; only delivered orders add revenue.
#[must_use]
pub fn orders_by_month(orders: &[Order]) -> Vec<MonthlySales> {
    let mut buckets: [(Decimal, usize); 12] = [(Decimal::ZERO, 0); 12];
    for order in orders {
        let Some(bucket) = buckets.get_mut(order.created_at.month0() as usize) else {
            continue;
        };
        bucket.1 += 1;
        if order.status == OrderStatus::Delivered {
            bucket.0 += order.total_amount;
        }
    }
    MONTHS
        .iter()
        .zip(buckets)
        .filter(|(_, (_, count))| *count > 0)
        .map(|(month, (revenue, count))| MonthlySales {
            month: (*month).to_owned(),
            revenue,
            orders: count,
        })
        .collect()
}

/// The `n` newest orders.
#[must_use]
pub fn recent_orders(orders: &[Order], n: usize) -> Vec<&Order> {
    let mut sorted: Vec<&Order> = orders.iter().collect();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    sorted.truncate(n);
    sorted
}

/// Best-selling product by revenue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopProduct {
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    /// Grams sold.
    pub sales: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub revenue: Decimal,
}

/// Top `n` products by revenue at current product prices.
///
/// Lines whose product no longer exists are skipped.
#[must_use]
pub fn top_products(orders: &[Order], products: &[Product], n: usize) -> Vec<TopProduct> {
    let by_id: HashMap<ProductId, &Product> = products.iter().map(|p| (p.id, p)).collect();
    let mut stats: Vec<TopProduct> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for item in orders.iter().flat_map(|o| &o.items) {
        let Some(product) = by_id.get(&item.product_id) else {
            continue;
        };
        let slot = *index.entry(product.name.clone()).or_insert_with(|| {
            stats.push(TopProduct {
                name: product.name.clone(),
                price: product.price,
                sales: 0,
                revenue: Decimal::ZERO,
            });
            stats.len() - 1
        });
        if let Some(entry) = stats.get_mut(slot) {
            entry.sales += i64::from(item.quantity);
            entry.revenue += grams_to_units(item.quantity) * product.price;
        }
    }

    stats.sort_by(|a, b| b.revenue.cmp(&a.revenue));
    stats.truncate(n);
    stats
}

/// Sales share of one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySales {
    pub name: String,
    /// Grams sold.
    pub value: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub revenue: Decimal,
    pub color: String,
}

impl CategorySales {
    /// Percentage of `total_value` this category accounts for, rounded.
    #[must_use]
    pub fn share_of(&self, total_value: i64) -> i64 {
        if total_value <= 0 {
            return 0;
        }
        (Decimal::from(self.value) * Decimal::ONE_HUNDRED / Decimal::from(total_value))
            .round()
            .try_into()
            .unwrap_or(0)
    }
}

/// Grams sold and revenue per category, most sold first.
///
/// Revenue uses the price each line was bought at. Colours cycle through
/// [`CATEGORY_COLORS`] in the order categories are first seen.
#[must_use]
pub fn category_sales(orders: &[Order], products: &[Product]) -> Vec<CategorySales> {
    let by_id: HashMap<ProductId, &Product> = products.iter().map(|p| (p.id, p)).collect();
    let mut stats: Vec<CategorySales> = Vec::new();

    for item in orders.iter().flat_map(|o| &o.items) {
        let Some(category) = by_id
            .get(&item.product_id)
            .and_then(|p| p.category_name())
        else {
            continue;
        };
        let revenue = grams_to_units(item.quantity) * item.price;
        if let Some(entry) = stats.iter_mut().find(|s| s.name == category) {
            entry.value += i64::from(item.quantity);
            entry.revenue += revenue;
        } else {
            let color = CATEGORY_COLORS
                .get(stats.len() % CATEGORY_COLORS.len())
                .copied()
                .unwrap_or("#99582A");
            stats.push(CategorySales {
                name: category.to_owned(),
                value: i64::from(item.quantity),
                revenue,
                color: color.to_owned(),
            });
        }
    }

    stats.sort_by(|a, b| b.value.cmp(&a.value));
    stats
}

/// Per-customer order totals for the customers page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CustomerStats {
    pub orders: usize,
    pub total_spent: Decimal,
}

#[must_use]
pub fn customer_stats(user_id: UserId, orders: &[Order]) -> CustomerStats {
    orders
        .iter()
        .filter(|o| o.user_id == user_id)
        .fold(CustomerStats::default(), |acc, o| CustomerStats {
            orders: acc.orders + 1,
            total_spent: acc.total_spent + o.total_amount,
        })
}

/// Orders matching a status filter. `"all"` or an empty filter keeps
/// everything; otherwise the comparison ignores case.
#[must_use]
pub fn filter_orders_by_status<'a>(orders: &'a [Order], status: &str) -> Vec<&'a Order> {
    let status = status.trim();
    if status.is_empty() || status.eq_ignore_ascii_case("all") {
        return orders.iter().collect();
    }
    orders
        .iter()
        .filter(|o| o.status.as_str().eq_ignore_ascii_case(status))
        .collect()
}

/// Customers whose first name, last name, or email contains `query`.
#[must_use]
pub fn search_customers<'a>(users: &'a [User], query: &str) -> Vec<&'a User> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return users.iter().collect();
    }
    users
        .iter()
        .filter(|u| {
            u.first_name.to_lowercase().contains(&query)
                || u.last_name.to_lowercase().contains(&query)
                || u.email.to_lowercase().contains(&query)
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::models::{CategoryRef, OrderItem};
    use crate::types::{
        CategoryId, OrderId, OrderItemId, PublishStatus, ShippingMethod, UserRole,
    };
    use chrono::{TimeZone, Utc};

    fn product(name: &str, price: i64, category: &str) -> Product {
        Product {
            id: ProductId::new(),
            name: name.into(),
            price: Decimal::from(price),
            original_price: None,
            stock: 1,
            rating: 0.0,
            review_count: 0,
            is_sale: false,
            is_new: false,
            is_featured: false,
            containers: vec![],
            description: None,
            images: vec![],
            status: PublishStatus::Active,
            cost_per_item: None,
            main_image: None,
            category_id: CategoryId::new(),
            category: Some(CategoryRef {
                id: CategoryId::new(),
                name: category.into(),
                image: None,
            }),
            created_at: Utc::now(),
        }
    }

    fn order(month: u32, status: OrderStatus, total: i64, lines: &[(&Product, i32)]) -> Order {
        Order {
            id: OrderId::new(),
            user_id: UserId::new(),
            status,
            total_amount: Decimal::from(total),
            shipping_method: ShippingMethod::Standard,
            city: "Nairobi".into(),
            area: "CBD".into(),
            address: String::new(),
            phone_number: "0700".into(),
            apartment: String::new(),
            pay_on_delivery: true,
            paid: false,
            mpesa_code: None,
            additional_note: None,
            internal_notes: None,
            created_at: Utc.with_ymd_and_hms(2025, month, 10, 12, 0, 0).unwrap(),
            items: lines
                .iter()
                .map(|(p, grams)| OrderItem {
                    id: OrderItemId::new(),
                    product_id: p.id,
                    container: None,
                    name: Some(p.name.clone()),
                    image: None,
                    quantity: *grams,
                    price: p.price,
                })
                .collect(),
        }
    }

    #[test]
    fn test_total_revenue_counts_delivered_only() {
        let orders = [
            order(1, OrderStatus::Delivered, 1000, &[]),
            order(1, OrderStatus::Pending, 500, &[]),
            order(2, OrderStatus::Delivered, 250, &[]),
        ];
        assert_eq!(total_revenue(&orders), Decimal::from(1250));
    }

    #[test]
    fn test_orders_by_month_in_calendar_order() {
        let orders = [
            order(3, OrderStatus::Delivered, 100, &[]),
            order(1, OrderStatus::Pending, 700, &[]),
            order(3, OrderStatus::Shipped, 50, &[]),
        ];
        let months = orders_by_month(&orders);
        assert_eq!(months.len(), 2);
        assert_eq!(months[0].month, "Jan");
        assert_eq!(months[0].orders, 1);
        assert_eq!(months[0].revenue, Decimal::ZERO);
        assert_eq!(months[1].month, "Mar");
        assert_eq!(months[1].orders, 2);
        assert_eq!(months[1].revenue, Decimal::from(100));
    }

    #[test]
    fn test_recent_orders_newest_first() {
        let orders: Vec<_> = (1..=7)
            .map(|m| order(m, OrderStatus::Pending, 1, &[]))
            .collect();
        let recent = recent_orders(&orders, 5);
        assert_eq!(recent.len(), 5);
        assert_eq!(recent[0].created_at.month(), 7);
        assert_eq!(recent[4].created_at.month(), 3);
    }

    #[test]
    fn test_top_products_by_revenue() {
        let saffron = product("Saffron", 2000, "Premium");
        let cumin = product("Cumin", 200, "Seeds");
        let orders = [
            order(1, OrderStatus::Delivered, 0, &[(&cumin, 500), (&saffron, 100)]),
            order(2, OrderStatus::Pending, 0, &[(&cumin, 300)]),
        ];
        let top = top_products(&orders, &[saffron.clone(), cumin.clone()], 5);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].name, "Saffron");
        assert_eq!(top[0].revenue, Decimal::from(2000));
        assert_eq!(top[1].sales, 800);
        assert_eq!(top[1].revenue, Decimal::from(1600));
    }

    #[test]
    fn test_category_sales_colors_and_order() {
        let cumin = product("Cumin", 200, "Seeds");
        let paprika = product("Paprika", 300, "Powders");
        let orders = [order(
            1,
            OrderStatus::Delivered,
            0,
            &[(&cumin, 100), (&paprika, 400)],
        )];
        let sales = category_sales(&orders, &[cumin, paprika]);
        assert_eq!(sales[0].name, "Powders");
        assert_eq!(sales[0].color, "#B5764A");
        assert_eq!(sales[0].revenue, Decimal::from(1200));
        assert_eq!(sales[1].color, "#99582A");
        assert_eq!(sales[0].share_of(500), 80);
    }

    #[test]
    fn test_filter_orders_by_status() {
        let orders = [
            order(1, OrderStatus::Delivered, 1, &[]),
            order(1, OrderStatus::Pending, 1, &[]),
        ];
        assert_eq!(filter_orders_by_status(&orders, "all").len(), 2);
        assert_eq!(filter_orders_by_status(&orders, "Delivered").len(), 1);
        assert!(filter_orders_by_status(&orders, "shipped").is_empty());
    }

    #[test]
    fn test_customer_stats_and_search() {
        let user = User {
            id: UserId::new(),
            supabase_id: "sb".into(),
            first_name: "Wanjiru".into(),
            last_name: "Kamau".into(),
            email: "wk@example.com".into(),
            phone_number: None,
            role: UserRole::User,
            is_active: true,
            is_verified: false,
            avatar_url: None,
            created_at: Utc::now(),
            updated_at: None,
            last_login: None,
        };
        let mut mine = order(1, OrderStatus::Pending, 300, &[]);
        mine.user_id = user.id;
        let orders = [mine, order(1, OrderStatus::Pending, 900, &[])];
        let stats = customer_stats(user.id, &orders);
        assert_eq!(stats.orders, 1);
        assert_eq!(stats.total_spent, Decimal::from(300));

        let users = [user];
        assert_eq!(search_customers(&users, "KAMAU").len(), 1);
        assert!(search_customers(&users, "otieno").is_empty());
    }
}
