//! Product reviews.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::UserSummary;
use crate::types::{ProductId, ReviewId, UserId};

/// Product reference embedded in a review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewedProduct {
    pub id: ProductId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub product_id: ProductId,
    pub user_id: UserId,
    pub rating: f64,
    #[serde(default)]
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub user: Option<UserSummary>,
    #[serde(default)]
    pub product: Option<ReviewedProduct>,
}

impl Review {
    /// Name to print next to the review.
    #[must_use]
    pub fn author(&self) -> String {
        self.user
            .as_ref()
            .and_then(|u| u.first_name.clone())
            .unwrap_or_else(|| "Customer".to_owned())
    }
}

/// Payload for `POST /reviews/reviews`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReview {
    pub product_id: ProductId,
    pub user_id: UserId,
    pub rating: f64,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Payload for `PUT /reviews/reviews/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}
