//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::RelayConfig;
use crate::laar::{CityCatalog, LaarClient, LaarError, TokenCache};
use crate::shopify::{ShopifyAdminClient, ShopifyError};

/// Error constructing the outbound clients.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("courier client: {0}")]
    Laar(#[from] LaarError),
    #[error("shopify client: {0}")]
    Shopify(#[from] ShopifyError),
}

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Holds the single city catalog and token
/// cache for the process.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: RelayConfig,
    laar: LaarClient,
    cities: CityCatalog,
    tokens: TokenCache,
    shopify: ShopifyAdminClient,
}

impl AppState {
    /// Build the outbound clients and empty caches from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be constructed.
    pub fn new(config: RelayConfig) -> Result<Self, StateError> {
        let laar = LaarClient::new(&config.laar)?;
        let shopify = ShopifyAdminClient::new(&config.shopify, config.laar.http_timeout())?;
        Ok(Self::from_parts(config, laar, shopify))
    }

    /// Assemble state from already-built clients.
    #[must_use]
    pub fn from_parts(config: RelayConfig, laar: LaarClient, shopify: ShopifyAdminClient) -> Self {
        let cities = CityCatalog::new(laar.clone());
        let tokens = TokenCache::new(laar.clone(), &config.laar);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                laar,
                cities,
                tokens,
                shopify,
            }),
        }
    }

    /// Get a reference to the relay configuration.
    #[must_use]
    pub fn config(&self) -> &RelayConfig {
        &self.inner.config
    }

    /// Get a reference to the Laarcourier client.
    #[must_use]
    pub fn laar(&self) -> &LaarClient {
        &self.inner.laar
    }

    /// Get a reference to the city catalog.
    #[must_use]
    pub fn cities(&self) -> &CityCatalog {
        &self.inner.cities
    }

    /// Get a reference to the courier token cache.
    #[must_use]
    pub fn tokens(&self) -> &TokenCache {
        &self.inner.tokens
    }

    /// Get a reference to the Shopify Admin client.
    #[must_use]
    pub fn shopify(&self) -> &ShopifyAdminClient {
        &self.inner.shopify
    }
}
