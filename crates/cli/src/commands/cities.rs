//! City catalog commands.
//!
//! # Environment Variables
//!
//! - `LAAR_BASE_URL` - Courier API base URL (optional)
//! - `LAAR_USERNAME`, `LAAR_PASSWORD` - Courier credentials

use laar_relay::config::LaarConfig;
use laar_relay::laar::{CityCatalog, LaarClient};

use super::CliError;

/// Load the catalog and either list it or resolve `search`.
pub async fn run(search: Option<&str>) -> Result<(), CliError> {
    let config = LaarConfig::from_env()?;
    let catalog = CityCatalog::new(LaarClient::new(&config)?);

    tracing::info!("Fetching city catalog from {}...", config.base_url);
    let count = catalog.refresh().await?;

    if let Some(name) = search {
        let city = catalog
            .resolve(name)
            .await
            .ok_or_else(|| CliError::CityNotFound(name.to_owned()))?;
        tracing::info!(
            "{} -> codigo {} (numeric: {:?}), provincia {}",
            city.nombre,
            city.codigo,
            city.numeric_code(),
            city.provincia.as_deref().unwrap_or("-")
        );
        return Ok(());
    }

    for city in catalog.entries().await.iter() {
        tracing::info!("{:>12}  {}", city.codigo, city.nombre);
    }
    tracing::info!("{count} cities loaded");
    Ok(())
}
