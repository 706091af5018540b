//! CLI subcommands.

pub mod auth;
pub mod cities;
pub mod preview;
pub mod sign;

use laar_relay::config::ConfigError;
use laar_relay::laar::LaarError;
use laar_relay::shipment::TransformError;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Courier call failed.
    #[error("Courier error: {0}")]
    Laar(#[from] LaarError),

    /// Reading an input file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Input file is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The order cannot be turned into a shipment.
    #[error("{0}")]
    Transform(#[from] TransformError),

    /// Requested city is not in the catalog.
    #[error("City not found: {0}")]
    CityNotFound(String),

    /// `SHOPIFY_WEBHOOK_SECRET` is not set.
    #[error("Missing environment variable: SHOPIFY_WEBHOOK_SECRET")]
    MissingWebhookSecret,

    /// The signing key was rejected.
    #[error("Signing error: {0}")]
    Signing(String),

    /// The shipment failed validation.
    #[error("Shipment is invalid ({0} errors)")]
    Invalid(usize),
}
