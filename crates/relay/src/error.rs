//! Webhook error handling with Sentry integration.
//!
//! Every way a delivery can fail maps onto one [`WebhookError`] variant, and
//! each variant onto a status code and a JSON body `{ "error", "details"? }`.
//! Server-side failures are captured to Sentry before responding.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::laar::LaarError;
use crate::shipment::TransformError;

/// Handler-level error for the order webhook.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// No webhook secret is configured; nothing can be verified.
    #[error("Webhook secret not configured")]
    MissingSecret,

    /// The HMAC header is missing or does not match the body.
    #[error("Unauthorized webhook")]
    SignatureInvalid,

    /// The body is not a JSON order.
    #[error("Malformed webhook payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),

    /// The order is missing data or names an unknown city.
    #[error("{0}")]
    Transform(#[from] TransformError),

    /// The built shipment fails business rules.
    #[error("Validation errors")]
    Validation(Vec<String>),

    /// Obtaining a courier token failed.
    #[error("Courier authentication failed: {0}")]
    Authentication(#[source] LaarError),

    /// Shipment creation failed.
    #[error("Failed to create shipment: {0}")]
    Courier(#[source] LaarError),

    /// The processing deadline elapsed before submission completed.
    #[error("Processing deadline exceeded")]
    DeadlineExceeded,

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl WebhookError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingSecret | Self::SignatureInvalid => StatusCode::UNAUTHORIZED,
            Self::MalformedPayload(_) | Self::Transform(_) | Self::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Authentication(err) if err.is_credentials_rejected() => StatusCode::UNAUTHORIZED,
            Self::Authentication(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Courier(LaarError::Submission { status, .. }) => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            Self::Courier(_) => StatusCode::BAD_GATEWAY,
            Self::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    const fn is_server_side(&self) -> bool {
        matches!(
            self,
            Self::Authentication(_) | Self::Courier(_) | Self::DeadlineExceeded | Self::Internal(_)
        )
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = self.status();

        if self.is_server_side() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                status = status.as_u16(),
                sentry_event_id = %event_id,
                "Webhook failed"
            );
        } else {
            tracing::warn!(error = %self, status = status.as_u16(), "Webhook rejected");
        }

        // Internal details stay in the logs
        let body = match &self {
            Self::Validation(details) => json!({
                "error": self.to_string(),
                "details": details,
            }),
            Self::Courier(LaarError::Submission { body, .. }) => json!({
                "error": "Failed to create shipment with courier",
                "details": body,
            }),
            Self::Courier(_) => json!({ "error": "Courier service error" }),
            Self::Authentication(err) if err.is_credentials_rejected() => {
                json!({ "error": "Courier rejected credentials" })
            }
            Self::Authentication(_) | Self::Internal(_) => {
                json!({ "error": "Internal server error" })
            }
            _ => json!({ "error": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `WebhookError`.
pub type Result<T> = std::result::Result<T, WebhookError>;
