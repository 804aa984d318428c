//! Session-related types for admin authentication.
//!
//! Types stored in the session for authentication state and notices.

use serde::{Deserialize, Serialize};

use spice_hub_core::UserId;
use spice_hub_core::models::User;

/// Session-stored admin identity.
///
/// Only users whose backend role is `admin` are ever stored here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentAdmin {
    /// Backend user id.
    pub user_id: UserId,
    /// Identity provider subject id.
    pub supabase_id: String,
    pub email: String,
    /// Display name.
    pub name: String,
}

impl From<&User> for CurrentAdmin {
    fn from(user: &User) -> Self {
        let name = user.full_name();
        Self {
            user_id: user.id,
            supabase_id: user.supabase_id.clone(),
            email: user.email.clone(),
            name: if name.is_empty() { user.email.clone() } else { name },
        }
    }
}

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
}

impl FlashKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

/// Notice shown once on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub kind: FlashKind,
    pub message: String,
}

/// Session keys for admin authentication data.
pub mod keys {
    /// Key for storing the current logged-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";

    /// Key for the identity provider tokens.
    pub const AUTH_TOKENS: &str = "auth_tokens";

    /// Key for pending notices.
    pub const FLASH: &str = "flash";
}
