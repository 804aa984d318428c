//! HTTP middleware stack and request extractors for the storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions with `PostgreSQL` store)
//!
//! # Extractors
//!
//! - [`OptionalAuth`] / [`RequireAuth`] - signed-in user from the session
//! - [`GuestSession`] - guest id, cart, and wishlist from the session
//! - [`Flash`] - queue and drain one-shot messages
//! - [`Shopper`] - all of the above plus the cart and wishlist stores

pub mod auth;
pub mod flash;
pub mod guest;
pub mod request_id;
pub mod session;
pub mod shopper;

pub use auth::{
    AuthRejection, OptionalAuth, RequireAuth, clear_current_user, set_current_user, signed_in,
};
pub use flash::Flash;
pub use guest::GuestSession;
pub use request_id::request_id_middleware;
pub use session::{create_session_layer, session_layer};
pub use shopper::Shopper;
