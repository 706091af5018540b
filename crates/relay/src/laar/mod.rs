//! Laarcourier shipping API client.
//!
//! Creates shipping labels ("guías") for Shopify orders.
//!
//! # Architecture
//!
//! - [`LaarClient`] performs the raw HTTP calls (catalog, authentication,
//!   shipment creation) with a per-call timeout
//! - [`TokenCache`] holds the bearer token and re-authenticates on expiry
//! - [`CityCatalog`] maps city names to courier city codes, loaded once
//!   and reloaded only when empty
//!
//! Both caches are constructed once per process and shared through the
//! application state. Nothing is retried here: Shopify's webhook redelivery
//! is the only retry mechanism.

pub mod auth;
pub mod cities;
pub mod client;
pub mod tokens;

pub use auth::{AccountSummary, LaarToken};
pub use cities::CityCatalog;
pub use client::LaarClient;
pub use tokens::TokenCache;

use thiserror::Error;

/// Errors that can occur when interacting with the Laarcourier API.
#[derive(Debug, Error)]
pub enum LaarError {
    /// HTTP request failed (connection, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Authentication failed (rejected credentials or unusable response).
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// City catalog could not be loaded.
    #[error("City catalog unavailable: HTTP {status}")]
    Catalog {
        /// HTTP status returned by the catalog endpoint.
        status: u16,
    },

    /// Shipment creation was rejected by the courier.
    #[error("Shipment rejected: HTTP {status}: {body}")]
    Submission {
        /// HTTP status returned by the courier.
        status: u16,
        /// Raw response body, kept verbatim for reconciliation.
        body: String,
    },
}

impl LaarError {
    /// Whether the courier rejected our credentials outright (as opposed to
    /// a transport or parse failure).
    #[must_use]
    pub const fn is_credentials_rejected(&self) -> bool {
        matches!(self, Self::AuthenticationFailed(_))
    }

    /// Whether the courier answered 401 to a shipment request.
    #[must_use]
    pub const fn is_unauthorized_submission(&self) -> bool {
        matches!(self, Self::Submission { status: 401, .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_error_display() {
        let err = LaarError::Submission {
            status: 422,
            body: r#"{"mensaje":"ciudad inválida"}"#.to_string(),
        };
        assert_eq!(
            err.to_string(),
            r#"Shipment rejected: HTTP 422: {"mensaje":"ciudad inválida"}"#
        );
        assert!(!err.is_unauthorized_submission());
    }

    #[test]
    fn test_unauthorized_submission() {
        let err = LaarError::Submission {
            status: 401,
            body: String::new(),
        };
        assert!(err.is_unauthorized_submission());
    }

    #[test]
    fn test_authentication_failed_error() {
        let err = LaarError::AuthenticationFailed("HTTP 401: credenciales".to_string());
        assert_eq!(err.to_string(), "Authentication failed: HTTP 401: credenciales");
        assert!(err.is_credentials_rejected());
    }

    #[test]
    fn test_catalog_error_display() {
        let err = LaarError::Catalog { status: 503 };
        assert_eq!(err.to_string(), "City catalog unavailable: HTTP 503");
    }
}
