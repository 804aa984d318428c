//! Session-related types.
//!
//! Types stored in the session for authentication, guest shopping, and
//! flash messages.

use serde::{Deserialize, Serialize};

use spice_hub_client::IdentityUser;
use spice_hub_core::UserRole;
use spice_hub_core::models::User;

/// Session-stored user identity.
///
/// `user_id` is the backend user id (orders, reviews, shipping); carts and
/// wishlists are keyed by `supabase_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub user_id: spice_hub_core::UserId,
    pub supabase_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
}

impl CurrentUser {
    /// Session identity of a mirrored backend user.
    #[must_use]
    pub fn from_backend(user: &User, identity: &IdentityUser) -> Self {
        Self {
            user_id: user.id,
            supabase_id: identity.id.clone(),
            email: identity.email.clone().unwrap_or_else(|| user.email.clone()),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            role: user.role,
        }
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.first_name.is_empty() {
            &self.email
        } else {
            &self.first_name
        }
    }
}

/// Severity of a flash message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashKind {
    Success,
    Error,
    Info,
}

impl FlashKind {
    /// CSS modifier used by the toast markup.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
        }
    }
}

/// One-shot message shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub kind: FlashKind,
    pub message: String,
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the identity provider tokens.
    pub const AUTH_TOKENS: &str = "auth_tokens";

    /// Key for the guest session id.
    pub const GUEST_SESSION: &str = "guest_session";

    /// Key for the guest cart.
    pub const GUEST_CART: &str = "guest_cart";

    /// Key for the guest wishlist.
    pub const GUEST_WISHLIST: &str = "guest_wishlist";

    /// Key for pending flash messages.
    pub const FLASH: &str = "flash";
}
