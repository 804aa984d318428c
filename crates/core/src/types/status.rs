//! Status enums for various entities.
//!
//! All of these are stored as `TEXT` and travel as lowercase strings. Parsing
//! is case-insensitive because older rows and admin forms use `Active`,
//! `Delivered`, and so on.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Error returned when a status string does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: {value}")]
pub struct ParseStatusError {
    kind: &'static str,
    value: String,
}

impl ParseStatusError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

/// Implements `Display`, `FromStr`, and string serde for a unit-only enum.
macro_rules! text_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            /// All variants in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The canonical lowercase form.
            #[must_use]
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseStatusError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let lowered = s.trim().to_ascii_lowercase();
                match lowered.as_str() {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(ParseStatusError::new($kind, s)),
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

/// Role of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UserRole {
    Admin,
    #[default]
    User,
    Guest,
}

text_enum!(UserRole, "user role", {
    Admin => "admin",
    User => "user",
    Guest => "guest",
});

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Completed,
    Cancelled,
}

text_enum!(OrderStatus, "order status", {
    Pending => "pending",
    Confirmed => "confirmed",
    Processing => "processing",
    Shipped => "shipped",
    Delivered => "delivered",
    Completed => "completed",
    Cancelled => "cancelled",
});

impl OrderStatus {
    /// Human label, e.g. `Delivered`.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Confirmed => "Confirmed",
            Self::Processing => "Processing",
            Self::Shipped => "Shipped",
            Self::Delivered => "Delivered",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }
}

/// Delivery speed chosen at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ShippingMethod {
    #[default]
    Standard,
    Express,
}

text_enum!(ShippingMethod, "shipping method", {
    Standard => "standard",
    Express => "express",
});

/// Publication state of a product or category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PublishStatus {
    Active,
    #[default]
    Draft,
    Archived,
}

text_enum!(PublishStatus, "publish status", {
    Active => "active",
    Draft => "draft",
    Archived => "archived",
});

/// How an order is paid. Derived from the order's `payOnDelivery` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PaymentMethod {
    PayOnDelivery,
    Mpesa,
}

impl PaymentMethod {
    #[must_use]
    pub const fn from_pay_on_delivery(pay_on_delivery: bool) -> Self {
        if pay_on_delivery {
            Self::PayOnDelivery
        } else {
            Self::Mpesa
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::PayOnDelivery => "Pay on Delivery",
            Self::Mpesa => "M-Pesa",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("Delivered".parse::<OrderStatus>().unwrap(), OrderStatus::Delivered);
        assert_eq!(" ACTIVE ".parse::<PublishStatus>().unwrap(), PublishStatus::Active);
        assert_eq!("Admin".parse::<UserRole>().unwrap(), UserRole::Admin);
    }

    #[test]
    fn test_parse_unknown_status() {
        let err = "lost".parse::<OrderStatus>().unwrap_err();
        assert_eq!(err.to_string(), "invalid order status: lost");
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&ShippingMethod::Express).unwrap();
        assert_eq!(json, "\"express\"");
        let parsed: OrderStatus = serde_json::from_str("\"Shipped\"").unwrap();
        assert_eq!(parsed, OrderStatus::Shipped);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
        assert_eq!(UserRole::default(), UserRole::User);
        assert_eq!(PublishStatus::default(), PublishStatus::Draft);
        assert_eq!(ShippingMethod::default(), ShippingMethod::Standard);
    }

    #[test]
    fn test_payment_method_label() {
        assert_eq!(PaymentMethod::from_pay_on_delivery(true).label(), "Pay on Delivery");
        assert_eq!(PaymentMethod::from_pay_on_delivery(false).to_string(), "M-Pesa");
    }

    #[test]
    fn test_all_lists_every_variant() {
        assert_eq!(OrderStatus::ALL.len(), 7);
        assert_eq!(OrderStatus::ALL[0], OrderStatus::Pending);
    }
}
