//! Session-held models of the storefront.

pub mod session;

pub use session::{CurrentUser, FlashKind, FlashMessage, keys as session_keys};
