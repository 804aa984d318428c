//! Spice Hub storefront library.
//!
//! Server-rendered shop pages over the REST API. The router is built here
//! so it can be exercised in tests with an in-memory session store; the
//! binary adds the Postgres session layer, Sentry, and path normalization.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
pub mod views;

use std::time::Duration;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Request, Response, StatusCode},
    routing::get,
};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::{Level, Span, field::Empty};

use crate::middleware::request_id_middleware;
use crate::state::AppState;

/// Directory served under `/static`.
pub const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Build the storefront router. Callers add the session layer.
pub fn app(state: AppState) -> Router {
    let trace = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<Body>| {
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = Empty,
                status = Empty,
                latency_ms = Empty,
            )
        })
        .on_response(
            |response: &Response<Body>, latency: Duration, span: &Span| {
                span.record("status", response.status().as_u16());
                span.record(
                    "latency_ms",
                    u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                );
                DefaultOnResponse::new()
                    .level(Level::INFO)
                    .on_response(response, latency, span);
            },
        );

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(trace)
        .with_state(state)
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Readiness: the session database and the API must both answer.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    if let Err(e) = sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        tracing::warn!(error = %e, "Session database not ready");
        return StatusCode::SERVICE_UNAVAILABLE;
    }
    match state.api().list_categories().await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "API not ready");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
