//! Shopify integration: webhook authentication and order write-back.
//!
//! - [`webhook`] verifies `x-shopify-hmac-sha256` over the raw request body
//! - [`ShopifyAdminClient`] records the label URL on the originating order

pub mod admin;
pub mod webhook;

pub use admin::ShopifyAdminClient;

use thiserror::Error;

/// Errors from the Shopify Admin API.
#[derive(Debug, Error)]
pub enum ShopifyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Shopify answered with a non-success status.
    #[error("Shopify API error: HTTP {status}: {body}")]
    Api {
        /// HTTP status returned by Shopify.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The order cannot be addressed because the webhook carried no ID.
    #[error("Order has no ID")]
    MissingOrderId,
}
