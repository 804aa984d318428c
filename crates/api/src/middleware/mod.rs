//! HTTP middleware for the REST API.
//!
//! # Middleware Stack (order matters)
//!
//! Layers are applied in reverse order (last added = first executed):
//!
//! 1. Sentry layers (outermost)
//! 2. `CorsLayer`
//! 3. `TraceLayer` (request span with `request_id` and `user_sub` fields)
//! 4. `request_id_middleware`
//! 5. `bearer_auth`

pub mod auth;
pub mod request_id;

pub use auth::bearer_auth;
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
