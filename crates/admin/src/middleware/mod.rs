//! HTTP middleware stack and extractors for admin.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions with `PostgreSQL` store)
//!
//! Authentication is enforced per handler by [`RequireAdmin`].

pub mod auth;
pub mod flash;
pub mod request_id;
pub mod session;

pub use auth::{AdminRejection, RequireAdmin, clear_current_admin, set_current_admin};
pub use flash::Flash;
pub use request_id::request_id_middleware;
pub use session::{create_session_layer, session_layer};
