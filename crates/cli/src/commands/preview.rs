//! Dry-run an order through the shipment pipeline.
//!
//! Runs the same transform and validation as the webhook, then logs the
//! request that would be sent. Nothing is submitted and no token is fetched.

use std::path::Path;

use laar_relay::config::{LaarConfig, ShipmentConfig};
use laar_relay::laar::{CityCatalog, LaarClient};
use laar_relay::shipment::{transform, validate};
use laar_relay_core::OrderPayload;

use super::CliError;

/// Build and validate the shipment for the order in `file`.
pub async fn run(file: &Path) -> Result<(), CliError> {
    let order = read_order(file)?;

    let laar = LaarConfig::from_env()?;
    let shipment = ShipmentConfig::from_env()?;
    let catalog = CityCatalog::new(LaarClient::new(&laar)?);
    catalog.refresh().await?;

    if let Some(label) = order.shipping_label() {
        tracing::warn!(
            "Order already has a shipping label ({}); the webhook would skip it",
            label.value.as_deref().unwrap_or("-")
        );
    }

    let request = transform(&order, &catalog, &shipment).await?;
    tracing::info!("Shipment request:\n{}", serde_json::to_string_pretty(&request)?);

    let errors = validate(&request);
    if errors.is_empty() {
        tracing::info!("Shipment is valid");
        return Ok(());
    }
    for error in &errors {
        tracing::warn!("{error}");
    }
    Err(CliError::Invalid(errors.len()))
}

fn read_order(file: &Path) -> Result<OrderPayload, CliError> {
    let raw = std::fs::read(file)?;
    Ok(serde_json::from_slice(&raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_order_rejects_non_json() {
        let path = std::env::temp_dir().join("laar-cli-preview-not-json.txt");
        std::fs::write(&path, "not json").expect("write temp file");

        let result = read_order(&path);
        assert!(matches!(result, Err(CliError::Json(_))));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_read_order_missing_file() {
        let result = read_order(Path::new("/nonexistent/order.json"));
        assert!(matches!(result, Err(CliError::Io(_))));
    }
}
