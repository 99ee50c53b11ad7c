// src/routes/health.rs
//! API health check endpoint.
//!
//! Used by container orchestrators and CI to verify that the service is
//! running. It reports which store backend is configured but never touches
//! the store itself.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use super::AppState;

/// JSON response body for the `/health` endpoint.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    store: String,
}

/// Handle `GET /health`.
async fn health(State((_service, config)): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        store: config.store_backend.to_string(),
    })
}

/// Subrouter containing the `/health` route.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
