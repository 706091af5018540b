//! Process-wide Laarcourier city catalog.
//!
//! Loaded at startup and trusted until restart. A lookup only triggers a
//! reload when the catalog is entirely empty, so renamed or new cities are
//! not picked up until the process restarts.

use std::sync::Arc;

use laar_relay_core::CityEntry;
use tokio::sync::RwLock;
use tracing::instrument;

use super::{LaarClient, LaarError};

/// City name to courier code mapping.
#[derive(Clone)]
pub struct CityCatalog {
    inner: Arc<CityCatalogInner>,
}

struct CityCatalogInner {
    client: LaarClient,
    cities: RwLock<Arc<Vec<CityEntry>>>,
}

impl CityCatalog {
    /// Create an empty catalog; the first lookup loads it.
    #[must_use]
    pub fn new(client: LaarClient) -> Self {
        Self::with_entries(client, Vec::new())
    }

    /// Create a catalog pre-populated with `entries`.
    #[must_use]
    pub fn with_entries(client: LaarClient, entries: Vec<CityEntry>) -> Self {
        Self {
            inner: Arc::new(CityCatalogInner {
                client,
                cities: RwLock::new(Arc::new(entries)),
            }),
        }
    }

    /// Reload the catalog from the courier, replacing it wholesale.
    ///
    /// On failure the previous catalog is left untouched.
    ///
    /// # Errors
    ///
    /// Returns the fetch error after logging it.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<usize, LaarError> {
        match self.inner.client.fetch_cities().await {
            Ok(cities) => {
                let count = cities.len();
                *self.inner.cities.write().await = Arc::new(cities);
                tracing::info!(count, "City catalog loaded");
                Ok(count)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load city catalog");
                Err(e)
            }
        }
    }

    /// Find a city by name, case-insensitively.
    ///
    /// Loads the catalog first if it is empty. Returns `None` when the city
    /// is not listed or the catalog could not be loaded.
    #[instrument(skip(self))]
    pub async fn resolve(&self, name: &str) -> Option<CityEntry> {
        if self.is_empty().await {
            tracing::warn!("City catalog is empty, reloading");
            // Failure is already logged by refresh; the lookup reports no match.
            let _ = self.refresh().await;
        }

        let cities = self.entries().await;
        let found = cities.iter().find(|city| city.matches(name)).cloned();
        if found.is_none() {
            tracing::debug!(city = %name, "City not in catalog");
        }
        found
    }

    /// Snapshot of the current catalog.
    pub async fn entries(&self) -> Arc<Vec<CityEntry>> {
        Arc::clone(&*self.inner.cities.read().await)
    }

    /// Number of cities currently loaded.
    pub async fn len(&self) -> usize {
        self.inner.cities.read().await.len()
    }

    /// Whether no cities are loaded.
    pub async fn is_empty(&self) -> bool {
        self.inner.cities.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> CityCatalog {
        // Unroutable base URL: any fetch would fail, proving lookups stay local.
        let client = LaarClient::with_http_client(reqwest::Client::new(), "http://127.0.0.1:9");
        CityCatalog::with_entries(
            client,
            vec![
                CityEntry::new("Quito", "201001001"),
                CityEntry::new("Guayaquil", "170"),
            ],
        )
    }

    #[tokio::test]
    async fn test_resolve_is_case_insensitive() {
        let catalog = catalog();
        let city = catalog.resolve("GUAYAQUIL").await.expect("city found");
        assert_eq!(city.codigo, "170");
    }

    #[tokio::test]
    async fn test_resolve_miss_returns_none_without_refresh() {
        let catalog = catalog();
        assert!(catalog.resolve("Atlantis").await.is_none());
        assert_eq!(catalog.len().await, 2);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_catalog() {
        let catalog = catalog();
        assert!(catalog.refresh().await.is_err());
        assert_eq!(catalog.len().await, 2);
        assert!(catalog.resolve("quito").await.is_some());
    }

    #[tokio::test]
    async fn test_empty_catalog_with_failed_refresh_resolves_nothing() {
        let client = LaarClient::with_http_client(reqwest::Client::new(), "http://127.0.0.1:9");
        let catalog = CityCatalog::new(client);
        assert!(catalog.resolve("Quito").await.is_none());
        assert!(catalog.is_empty().await);
    }
}
