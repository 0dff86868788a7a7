//! GreenBasket Storefront library.
//!
//! This crate provides the storefront functionality as a library,
//! allowing it to be tested and reused.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod commerce;
pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Router, routing::get};

use state::AppState;

/// Build the full application router (routes, sessions, middleware).
///
/// The Sentry tower layers and the static file service are added by the
/// binary; everything else lives here so integration tests drive the same
/// stack the binary serves.
#[must_use]
pub fn build_app(app_state: AppState) -> Router {
    let session_layer = middleware::create_session_layer(app_state.config());

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .layer(axum::middleware::from_fn(
            middleware::security_headers_middleware,
        ))
        .layer(session_layer)
        .layer(axum::middleware::from_fn(middleware::csp_nonce_middleware))
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(app_state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies the remote commerce API answers before returning OK.
/// Returns 503 Service Unavailable if the API is not reachable.
async fn readiness(State(app_state): State<AppState>) -> StatusCode {
    match app_state.commerce().ping().await {
        Ok(()) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
