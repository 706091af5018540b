//! Courier credential check.

use laar_relay::config::LaarConfig;
use laar_relay::laar::{LaarClient, TokenCache};

use super::CliError;

/// Authenticate once and log the account the credentials belong to.
pub async fn check() -> Result<(), CliError> {
    let config = LaarConfig::from_env()?;
    let tokens = TokenCache::new(LaarClient::new(&config)?, &config);

    tracing::info!("Authenticating as {}...", config.username);
    tokens.get_token().await?;

    if let Some(token) = tokens.current().await {
        let account = &token.account;
        tracing::info!(
            nombre = account.nombre.as_deref().unwrap_or("-"),
            ruc = account.ruc.as_deref().unwrap_or("-"),
            codigo_usuario = ?account.codigo_usuario,
            codigo_sucursal = ?account.codigo_sucursal,
            "Credentials accepted"
        );
        tracing::info!("Token valid until {}", token.expires_at);
    }
    Ok(())
}
