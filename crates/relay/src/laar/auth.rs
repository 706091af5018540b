//! Laarcourier authentication module.
//!
//! Exchanges username/password for a bearer token. The courier does not
//! report a lifetime, so the caller supplies the validity window.

use chrono::{DateTime, TimeDelta, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::LaarError;

/// Bearer token obtained from Laarcourier authentication.
#[derive(Debug, Clone)]
pub struct LaarToken {
    /// Bearer token for API requests.
    pub token: SecretString,
    /// When the token stops being trusted.
    pub expires_at: DateTime<Utc>,
    /// Account the token was issued for.
    pub account: AccountSummary,
}

/// Account details returned alongside the token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    #[serde(default)]
    pub nombre: Option<String>,
    #[serde(default)]
    pub ruc: Option<String>,
    #[serde(default)]
    pub codigo_usuario: Option<i64>,
    #[serde(default)]
    pub codigo_sucursal: Option<i64>,
}

/// Request body for Laarcourier authentication.
#[derive(Serialize)]
struct AuthRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// Response from the Laarcourier authentication endpoint.
#[derive(Deserialize)]
struct AuthResponse {
    token: String,
    #[serde(flatten)]
    account: AccountSummary,
}

/// Authenticate with Laarcourier using username and password.
///
/// # Arguments
///
/// * `endpoint` - Full URL of the `/authenticate` endpoint
/// * `ttl` - How long the returned token is trusted
///
/// # Errors
///
/// Returns `LaarError::AuthenticationFailed` on a non-success status or an
/// empty token, `LaarError::Parse` on a malformed body, and `LaarError::Http`
/// on transport failures.
#[instrument(skip(client, password, ttl), fields(username = %username))]
pub async fn authenticate(
    client: &reqwest::Client,
    endpoint: &str,
    username: &str,
    password: &SecretString,
    ttl: TimeDelta,
) -> Result<LaarToken, LaarError> {
    let now = Utc::now();

    let response = client
        .post(endpoint)
        .json(&AuthRequest {
            username,
            password: password.expose_secret(),
        })
        .send()
        .await?;

    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        tracing::error!(status = status.as_u16(), body = %body, "Laarcourier authentication rejected");
        return Err(LaarError::AuthenticationFailed(format!("HTTP {status}: {body}")));
    }

    let auth_response: AuthResponse = serde_json::from_str(&body)?;
    if auth_response.token.is_empty() {
        return Err(LaarError::AuthenticationFailed(
            "response did not contain a token".to_string(),
        ));
    }

    Ok(LaarToken {
        token: SecretString::from(auth_response.token),
        expires_at: now + ttl,
        account: auth_response.account,
    })
}

impl LaarToken {
    /// Check if the token has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Check if the token is expired at the given instant.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
