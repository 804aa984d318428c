//! Saved shipping addresses. Each user has at most one.

use serde::{Deserialize, Serialize};

use crate::types::{ShippingAddressId, UserId};

/// Account owner details embedded in a shipping address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressOwner {
    pub id: UserId,
    #[serde(rename = "firstName")]
    pub first_name: String,
    #[serde(rename = "lastName")]
    pub last_name: String,
    pub email: String,
    #[serde(rename = "phoneNumber", default)]
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub id: ShippingAddressId,
    pub country: String,
    pub city: String,
    pub area: String,
    pub user_id: UserId,
    #[serde(default)]
    pub user: Option<AddressOwner>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewShippingAddress {
    pub country: String,
    pub city: String,
    pub area: String,
    pub user_id: UserId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddressUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
}
