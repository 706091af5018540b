//! Laarcourier REST API client.
//!
//! Thin wrapper over `reqwest` for the three courier endpoints. Caching lives
//! in [`super::TokenCache`] and [`super::CityCatalog`].

use std::sync::Arc;

use chrono::TimeDelta;
use laar_relay_core::{CityEntry, ShipmentRequest, ShipmentResult};
use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

use super::LaarError;
use super::auth::{LaarToken, authenticate};
use crate::config::LaarConfig;

/// Laarcourier API client.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct LaarClient {
    inner: Arc<LaarClientInner>,
}

struct LaarClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl std::fmt::Debug for LaarClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LaarClient")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}

impl LaarClient {
    /// Create a new client with the configured per-call timeout.
    ///
    /// # Errors
    ///
    /// Returns `LaarError::Http` if the HTTP client cannot be built.
    pub fn new(config: &LaarConfig) -> Result<Self, LaarError> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .build()?;

        Ok(Self::with_http_client(client, &config.base_url))
    }

    /// Create a client around an existing `reqwest::Client`.
    #[must_use]
    pub fn with_http_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            inner: Arc::new(LaarClientInner {
                client,
                base_url: base_url.trim_end_matches('/').to_string(),
            }),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.inner.base_url)
    }

    /// Fetch the full city catalog.
    ///
    /// # Errors
    ///
    /// Returns `LaarError::Catalog` on a non-success status, `LaarError::Parse`
    /// on a malformed body, and `LaarError::Http` on transport failures.
    #[instrument(skip(self))]
    pub async fn fetch_cities(&self) -> Result<Vec<CityEntry>, LaarError> {
        let response = self
            .inner
            .client
            .get(self.endpoint("ciudades"))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LaarError::Catalog {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Exchange credentials for a bearer token valid for `ttl`.
    ///
    /// # Errors
    ///
    /// See [`authenticate`].
    pub async fn authenticate(
        &self,
        username: &str,
        password: &SecretString,
        ttl: TimeDelta,
    ) -> Result<LaarToken, LaarError> {
        authenticate(
            &self.inner.client,
            &self.endpoint("authenticate"),
            username,
            password,
            ttl,
        )
        .await
    }

    /// Create a cash ("contado") shipment and return its tracking data.
    ///
    /// # Errors
    ///
    /// Returns `LaarError::Submission` carrying the courier's status and raw
    /// body on a non-success response. Never retried.
    #[instrument(skip(self, request, token), fields(destination = ?request.destination.city_code))]
    pub async fn create_shipment(
        &self,
        request: &ShipmentRequest,
        token: &SecretString,
    ) -> Result<ShipmentResult, LaarError> {
        let response = self
            .inner
            .client
            .post(self.endpoint("guias/contado"))
            .bearer_auth(token.expose_secret())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = status.as_u16(),
                body = %body,
                "Laarcourier rejected shipment"
            );
            return Err(LaarError::Submission {
                status: status.as_u16(),
                body,
            });
        }

        let result: ShipmentResult = serde_json::from_str(&body)?;
        tracing::info!(guia = %result.guia, url = %result.url, "Shipment created");
        Ok(result)
    }
}
