//! HTTP route handlers for the relay.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                  - Liveness
//! GET  /health/ready            - Readiness (city catalog loaded)
//!
//! # Shopify webhooks
//! POST /webhooks/orders/create  - Create a courier label for a new order
//! GET  /webhooks/orders/create  - Endpoint liveness probe
//! ```

pub mod health;
pub mod webhook;

use axum::{Router, routing::get};

use crate::state::AppState;

/// Create the Shopify webhook routes router.
pub fn webhook_routes() -> Router<AppState> {
    Router::new().route(
        "/orders/create",
        get(webhook::probe).post(webhook::create_order),
    )
}

/// Create all routes for the relay.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .nest("/webhooks", webhook_routes())
}
