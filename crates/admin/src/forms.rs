//! Parsing helpers for back-office form fields.
//!
//! HTML forms post everything as text. Lists are comma-separated, item
//! lines are one per row with `|` between fields, and checkboxes are only
//! present when ticked.

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;

use spice_hub_core::ProductId;
use spice_hub_core::models::{Product, slugify};

/// `"jar, pouch,,bag "` becomes `["jar", "pouch", "bag"]`.
#[must_use]
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Trimmed text, or `None` when blank.
#[must_use]
pub fn non_blank(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// A ticked checkbox posts `on`; an unticked one posts nothing.
#[must_use]
pub fn checked(raw: Option<&str>) -> bool {
    raw.is_some_and(|v| matches!(v, "on" | "true" | "1" | "yes"))
}

/// Parse a money field. Blank is `None`.
///
/// # Errors
///
/// Returns `field`'s error message if the value is not a non-negative number.
pub fn optional_amount(raw: Option<&str>, field: &'static str) -> Result<Option<Decimal>, String> {
    match non_blank(raw) {
        None => Ok(None),
        Some(value) => match value.parse::<Decimal>() {
            Ok(amount) if amount >= Decimal::ZERO => Ok(Some(amount)),
            _ => Err(format!("{field} must be a number of at least 0.")),
        },
    }
}

/// Parse a required money field.
///
/// # Errors
///
/// Returns a message naming `field` if the value is missing or invalid.
pub fn amount(raw: &str, field: &'static str) -> Result<Decimal, String> {
    optional_amount(Some(raw), field)?.ok_or_else(|| format!("{field} is required."))
}

/// Parse the value of an `<input type="datetime-local">`, taken as UTC.
///
/// # Errors
///
/// Returns a message naming `field` if the value is not a date and time.
pub fn datetime(raw: &str, field: &'static str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .map(|naive| naive.and_utc())
        .map_err(|_| format!("{field} must be a date and time."))
}

/// Format a timestamp for an `<input type="datetime-local">`.
#[must_use]
pub fn datetime_value(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M").to_string()
}

/// One `|`-separated row of an item list, resolved against the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemLine {
    pub product_id: ProductId,
    pub product_name: String,
    /// Remaining fields after the product name, trimmed.
    pub fields: Vec<String>,
}

impl ItemLine {
    /// Quantity and unit from the second and third fields.
    ///
    /// # Errors
    ///
    /// Returns a message naming the product if either is missing or the
    /// quantity is not a positive number.
    pub fn quantity_and_unit(&self) -> Result<(f64, String), String> {
        let quantity = self
            .fields
            .first()
            .and_then(|q| q.parse::<f64>().ok())
            .filter(|q| q.is_finite() && *q > 0.0)
            .ok_or_else(|| format!("{} needs a quantity greater than 0.", self.product_name))?;
        let unit = self
            .fields
            .get(1)
            .filter(|u| !u.is_empty())
            .cloned()
            .ok_or_else(|| format!("{} needs a unit.", self.product_name))?;
        Ok((quantity, unit))
    }
}

/// Split `raw` into rows and resolve each row's first field to a product by
/// name, ignoring case and spacing. Blank rows are skipped.
///
/// # Errors
///
/// Returns a message naming the first row whose product is unknown.
pub fn item_lines(raw: &str, products: &[Product]) -> Result<Vec<ItemLine>, String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let mut parts = line.split('|').map(str::trim);
            let name = parts.next().unwrap_or_default();
            let slug = slugify(name);
            let product = products
                .iter()
                .find(|p| p.slug() == slug)
                .ok_or_else(|| format!("Unknown product \"{name}\"."))?;
            Ok(ItemLine {
                product_id: product.id,
                product_name: product.name.clone(),
                fields: parts.map(str::to_owned).collect(),
            })
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use spice_hub_core::CategoryId;
    use spice_hub_core::PublishStatus;

    fn product(name: &str) -> Product {
        Product {
            id: ProductId::new(),
            name: name.to_string(),
            price: Decimal::from(200),
            original_price: None,
            stock: 10,
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
            category: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list(" jar, pouch,,bag "), vec!["jar", "pouch", "bag"]);
        assert!(split_list("  ").is_empty());
    }

    #[test]
    fn test_checked() {
        assert!(checked(Some("on")));
        assert!(!checked(None));
        assert!(!checked(Some("off")));
    }

    #[test]
    fn test_amounts() {
        assert_eq!(optional_amount(Some(" "), "Price").unwrap(), None);
        assert_eq!(
            optional_amount(Some("12.50"), "Price").unwrap(),
            Some(Decimal::new(1250, 2))
        );
        assert_eq!(
            amount("-1", "Price").unwrap_err(),
            "Price must be a number of at least 0."
        );
        assert_eq!(amount("", "Price").unwrap_err(), "Price is required.");
    }

    #[test]
    fn test_datetime_round_trip() {
        let at = Utc.with_ymd_and_hms(2025, 6, 1, 9, 30, 0).unwrap();
        assert_eq!(datetime_value(at), "2025-06-01T09:30");
        assert_eq!(datetime("2025-06-01T09:30", "Start").unwrap(), at);
        assert!(datetime("June 1st", "Start").is_err());
    }

    #[test]
    fn test_item_lines_resolve_by_name() {
        let products = vec![product("Black Pepper"), product("Cumin")];
        let lines = item_lines("black pepper | 1.5 | tsp\n\n Cumin|2|tbsp ", &products).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].product_name, "Black Pepper");
        assert_eq!(lines[0].fields, vec!["1.5", "tsp"]);
        assert_eq!(lines[1].product_id, products[1].id);

        let err = item_lines("Saffron | 1 | g", &products).unwrap_err();
        assert_eq!(err, "Unknown product \"Saffron\".");
    }

    #[test]
    fn test_quantity_and_unit() {
        let products = vec![product("Cumin")];
        let lines = item_lines("Cumin | 2 | tbsp\nCumin | 0 | tsp\nCumin | 1", &products).unwrap();
        assert_eq!(lines[0].quantity_and_unit().unwrap(), (2.0, "tbsp".to_string()));
        assert_eq!(
            lines[1].quantity_and_unit().unwrap_err(),
            "Cumin needs a quantity greater than 0."
        );
        assert_eq!(lines[2].quantity_and_unit().unwrap_err(), "Cumin needs a unit.");
    }
}
