//! Wire models shared by the API, the client, and the web frontends.
//!
//! Field names follow the REST contract (`firstName`, `isSale`,
//! `payOnDelivery`, ...). Money fields travel as JSON numbers.

pub mod cart;
pub mod catalog;
pub mod order;
pub mod review;
pub mod sale;
pub mod shipping;
pub mod smart_shop;
pub mod user;

pub use cart::*;
pub use catalog::*;
pub use order::*;
pub use review::*;
pub use sale::*;
pub use shipping::*;
pub use smart_shop::*;
pub use user::*;

use serde::{Deserialize, Serialize};

/// Body of simple acknowledgements and error responses: `{"detail": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detail {
    pub detail: String,
}

impl Detail {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}
