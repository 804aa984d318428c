//! Unified error handling with Sentry integration.
//!
//! Every handler returns `Result<T, AppError>`. Errors render as
//! `{"detail": "..."}` with the matching status code. Server errors are
//! captured to Sentry and their details are never sent to the client.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Json, Path, Query};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use spice_hub_core::models::Detail;

use crate::db::RepositoryError;

/// Application-level error type for the REST API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Resource not found. The message is returned as-is.
    #[error("{0}")]
    NotFound(String),

    /// Request rejected by a business rule.
    #[error("{0}")]
    BadRequest(String),

    /// Request conflicts with existing data.
    #[error("{0}")]
    Conflict(String),

    /// Bearer token missing or invalid.
    #[error("{0}")]
    Unauthorized(String),

    /// Body, path, or query could not be parsed.
    #[error("{0}")]
    Unprocessable(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Status code for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Database(RepositoryError::NotFound) | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Database(RepositoryError::Conflict(_)) | Self::Conflict(_) => {
                StatusCode::CONFLICT
            }
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    pub fn not_found(what: &str) -> Self {
        Self::NotFound(format!("{what} not found"))
    }
}

/// Map `RepositoryError::NotFound` to a 404 naming `what`; other repository
/// errors pass through.
pub fn missing(what: &'static str) -> impl FnOnce(RepositoryError) -> AppError {
    move |e| match e {
        RepositoryError::NotFound => AppError::not_found(what),
        other => AppError::Database(other),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(RepositoryError::NotFound) => "Not found".to_string(),
            Self::Database(RepositoryError::Conflict(msg)) => msg.clone(),
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        (status, Json(Detail::new(message))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// JSON body extractor whose rejection the handler maps with [`json_body`].
pub type JsonBody<T> = std::result::Result<Json<T>, JsonRejection>;

/// Path extractor whose rejection the handler maps with [`path_params`].
pub type PathParams<T> = std::result::Result<Path<T>, PathRejection>;

/// Query extractor whose rejection the handler maps with [`query_params`].
pub type QueryParams<T> = std::result::Result<Query<T>, QueryRejection>;

/// Unwrap a JSON body, turning a rejection into a 422.
///
/// # Errors
///
/// Returns `AppError::Unprocessable` with the rejection text.
pub fn json_body<T>(body: JsonBody<T>) -> Result<T> {
    body.map(|Json(value)| value)
        .map_err(|rejection| AppError::Unprocessable(rejection.body_text()))
}

/// Unwrap path parameters, turning a malformed UUID into a 422.
///
/// # Errors
///
/// Returns `AppError::Unprocessable` with the rejection text.
pub fn path_params<T>(path: PathParams<T>) -> Result<T> {
    path.map(|Path(value)| value)
        .map_err(|rejection| AppError::Unprocessable(rejection.body_text()))
}

/// Unwrap query parameters, turning a rejection into a 422.
///
/// # Errors
///
/// Returns `AppError::Unprocessable` with the rejection text.
pub fn query_params<T>(query: QueryParams<T>) -> Result<T> {
    query
        .map(|Query(value)| value)
        .map_err(|rejection| AppError::Unprocessable(rejection.body_text()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = AppError::not_found("Cart");
        assert_eq!(err.to_string(), "Cart not found");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::BadRequest("Email already registered".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Conflict("exists".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::NotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Database(RepositoryError::DataCorruption(
                "bad status".into()
            ))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Unprocessable("bad uuid".into())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }
}
