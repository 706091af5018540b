//! Webhook signing for manual testing.
//!
//! # Environment Variables
//!
//! - `SHOPIFY_WEBHOOK_SECRET` - The secret the relay verifies against

use std::path::Path;

use laar_relay::config::webhook_secret_from_env;
use laar_relay::shopify::webhook::{HMAC_HEADER, sign};
use secrecy::SecretString;

use super::CliError;

/// Log the signature header for the exact bytes of `file`.
pub fn run(file: &Path) -> Result<(), CliError> {
    let secret = webhook_secret_from_env().ok_or(CliError::MissingWebhookSecret)?;
    let signature = signature_for(&secret, file)?;
    tracing::info!("{HMAC_HEADER}: {signature}");
    Ok(())
}

fn signature_for(secret: &SecretString, file: &Path) -> Result<String, CliError> {
    let body = std::fs::read(file)?;
    sign(secret, &body).map_err(|e| CliError::Signing(e.to_string()))
}
