//! Session-held models of the back-office.

pub mod session;

pub use session::{CurrentAdmin, FlashKind, FlashMessage, keys as session_keys};
