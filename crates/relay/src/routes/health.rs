//! Health check endpoints.

use axum::{extract::State, http::StatusCode};

use crate::state::AppState;

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Loads the city catalog if it is still empty, so a failed startup preload
/// recovers without waiting for a webhook. Returns 503 Service Unavailable
/// while the catalog cannot be loaded.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    let cities = state.cities();
    if cities.is_empty().await {
        // Failure is logged by refresh
        let _ = cities.refresh().await;
    }

    if cities.is_empty().await {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    }
}
