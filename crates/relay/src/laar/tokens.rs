//! Process-wide Laarcourier bearer token cache.

use std::sync::Arc;

use chrono::TimeDelta;
use secrecy::SecretString;
use tokio::sync::RwLock;
use tracing::instrument;

use super::auth::LaarToken;
use super::{LaarClient, LaarError};
use crate::config::LaarConfig;

/// Holds the current bearer token and re-authenticates when it expires.
///
/// The lock is never held across the authentication call, so concurrent
/// callers that all see a stale token may each re-authenticate. Every
/// result is a valid token and the last write wins.
#[derive(Clone)]
pub struct TokenCache {
    inner: Arc<TokenCacheInner>,
}

struct TokenCacheInner {
    client: LaarClient,
    username: String,
    password: SecretString,
    ttl: TimeDelta,
    token: RwLock<Option<LaarToken>>,
}

impl TokenCache {
    /// Create an empty cache. The first [`get_token`](Self::get_token)
    /// authenticates.
    #[must_use]
    pub fn new(client: LaarClient, config: &LaarConfig) -> Self {
        Self {
            inner: Arc::new(TokenCacheInner {
                client,
                username: config.username.clone(),
                password: config.password.clone(),
                ttl: TimeDelta::seconds(i64::from(config.token_ttl_secs)),
                token: RwLock::new(None),
            }),
        }
    }

    /// Return a valid bearer token, authenticating if none is cached or the
    /// cached one has expired.
    ///
    /// # Errors
    ///
    /// Propagates authentication failures; nothing is retried.
    #[instrument(skip(self))]
    pub async fn get_token(&self) -> Result<SecretString, LaarError> {
        if let Some(token) = self.inner.token.read().await.as_ref()
            && !token.is_expired()
        {
            return Ok(token.token.clone());
        }

        tracing::info!("Requesting new Laarcourier token");
        let token = self
            .inner
            .client
            .authenticate(&self.inner.username, &self.inner.password, self.inner.ttl)
            .await?;
        let secret = token.token.clone();

        *self.inner.token.write().await = Some(token);

        Ok(secret)
    }

    /// The cached token, if any, whether or not it has expired.
    pub async fn current(&self) -> Option<LaarToken> {
        self.inner.token.read().await.clone()
    }

    /// Drop the cached token so the next call re-authenticates.
    pub async fn invalidate(&self) {
        *self.inner.token.write().await = None;
    }
}
