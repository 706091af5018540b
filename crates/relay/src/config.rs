//! Relay configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `LAAR_USERNAME` - Laarcourier API username
//! - `LAAR_PASSWORD` - Laarcourier API password
//! - `LAAR_ORIGIN_ID` - Sender identification (RUC) printed on every label
//! - `LAAR_ORIGIN_NAME` - Sender name
//! - `LAAR_ORIGIN_ADDRESS` - Sender pickup address
//! - `LAAR_ORIGIN_PHONE` - Sender phone
//! - `SHOPIFY_STORE` - Shopify store (`your-store` or `your-store.myshopify.com`)
//! - `SHOPIFY_ACCESS_TOKEN` - Admin API access token used for order write-back
//!
//! ## Optional
//! - `SHOPIFY_WEBHOOK_SECRET` - Webhook signing secret (unset: every webhook is rejected)
//! - `RELAY_HOST` - Bind address (default: 127.0.0.1)
//! - `RELAY_PORT` - Listen port (default: 3000)
//! - `WEBHOOK_DEADLINE_SECS` - Processing deadline up to label creation (default: 60)
//! - `LAAR_BASE_URL` - Courier API base URL (default: <https://api.laarcourier.com:9727>)
//! - `LAAR_TOKEN_TTL_SECS` - Assumed bearer token lifetime (default: 3600)
//! - `LAAR_HTTP_TIMEOUT_SECS` - Per-call timeout for outbound requests (default: 30)
//! - `LAAR_SERVICE_TYPE` - Courier service type code (default: 2012020020091)
//! - `LAAR_PACKAGE_SIZE` - Declared package size (default: Mediano)
//! - `LAAR_ORIGIN_CITY` - Sender city name in the courier catalog (default: Quito)
//! - `LAAR_ORIGIN_REFERENCE` - Sender address reference (default: empty)
//! - `LAAR_ORIGIN_MOBILE` - Sender mobile (default: `LAAR_ORIGIN_PHONE`)
//! - `SHOPIFY_API_VERSION` - Admin API version (default: 2025-04)
//! - `SHOPIFY_ADMIN_BASE_URL` - Override for the Admin API host (testing)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`, `SENTRY_TRACES_SAMPLE_RATE`

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

pub const DEFAULT_LAAR_BASE_URL: &str = "https://api.laarcourier.com:9727";
pub const DEFAULT_SERVICE_TYPE: &str = "2012020020091";
pub const DEFAULT_PACKAGE_SIZE: &str = "Mediano";
pub const DEFAULT_ORIGIN_CITY: &str = "Quito";
pub const DEFAULT_SHOPIFY_API_VERSION: &str = "2025-04";
/// The courier does not report token lifetimes; one hour is assumed.
pub const DEFAULT_TOKEN_TTL_SECS: u32 = 3600;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.0;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Relay application configuration.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Deadline for everything up to and including label creation
    pub webhook_deadline_secs: u64,
    /// Laarcourier API configuration
    pub laar: LaarConfig,
    /// Shopify configuration
    pub shopify: ShopifyConfig,
    /// Fixed shipment fields (sender block, service type, package size)
    pub shipment: ShipmentConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Laarcourier API configuration.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct LaarConfig {
    /// API base URL without a trailing slash
    pub base_url: String,
    pub username: String,
    pub password: SecretString,
    /// How long a freshly issued token is trusted
    pub token_ttl_secs: u32,
    /// Per-call timeout for every outbound request
    pub http_timeout_secs: u64,
}

impl std::fmt::Debug for LaarConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LaarConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .finish()
    }
}

/// Shopify configuration.
///
/// Implements `Debug` manually to redact the access token and webhook secret.
#[derive(Clone)]
pub struct ShopifyConfig {
    /// Store handle or domain (e.g., your-store.myshopify.com)
    pub store: String,
    /// Admin API version (e.g., 2025-04)
    pub api_version: String,
    /// Admin API access token (write access to orders)
    pub access_token: SecretString,
    /// Shared secret for webhook HMAC verification
    pub webhook_secret: Option<SecretString>,
    /// Replaces `https://{store}` as the Admin API host when set
    pub admin_base_url: Option<String>,
}

impl std::fmt::Debug for ShopifyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyConfig")
            .field("store", &self.store)
            .field("api_version", &self.api_version)
            .field("access_token", &"[REDACTED]")
            .field(
                "webhook_secret",
                &self.webhook_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .field("admin_base_url", &self.admin_base_url)
            .finish()
    }
}

impl ShopifyConfig {
    /// Store domain, appending `.myshopify.com` to a bare handle.
    #[must_use]
    pub fn store_domain(&self) -> String {
        if self.store.contains('.') {
            self.store.clone()
        } else {
            format!("{}.myshopify.com", self.store)
        }
    }

    /// Base URL for Admin API requests.
    #[must_use]
    pub fn admin_base_url(&self) -> String {
        self.admin_base_url.as_ref().map_or_else(
            || format!("https://{}", self.store_domain()),
            |url| url.trim_end_matches('/').to_string(),
        )
    }
}

/// Fields every shipment request carries regardless of the order.
#[derive(Debug, Clone)]
pub struct ShipmentConfig {
    /// Courier service type code (`tipoServicio`)
    pub service_type: String,
    /// Declared package size (`tamanio`)
    pub package_size: String,
    /// Sender block
    pub origin: OriginConfig,
}

/// Sender identity and pickup address.
#[derive(Debug, Clone)]
pub struct OriginConfig {
    /// Identification (RUC)
    pub identification: String,
    /// City name, resolved against the courier catalog
    pub city: String,
    pub name: String,
    pub address: String,
    pub reference: String,
    pub phone: String,
    pub mobile: String,
}

impl RelayConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("RELAY_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("RELAY_HOST".to_string(), e.to_string()))?;
        let port = parse_env_or_default("RELAY_PORT", 3000_u16)?;
        let webhook_deadline_secs = parse_env_or_default("WEBHOOK_DEADLINE_SECS", 60_u64)?;

        let laar = LaarConfig::from_env()?;
        let shopify = ShopifyConfig::from_env()?;
        let shipment = ShipmentConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.1);

        Ok(Self {
            host,
            port,
            webhook_deadline_secs,
            laar,
            shopify,
            shipment,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Processing deadline for a single webhook delivery.
    #[must_use]
    pub const fn webhook_deadline(&self) -> Duration {
        Duration::from_secs(self.webhook_deadline_secs)
    }
}

impl LaarConfig {
    /// Load the courier section only. The CLI uses this without Shopify settings.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if credentials are missing or a value is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let base_url = get_env_or_default("LAAR_BASE_URL", DEFAULT_LAAR_BASE_URL);
        Url::parse(&base_url)
            .map_err(|e| ConfigError::InvalidEnvVar("LAAR_BASE_URL".to_string(), e.to_string()))?;

        let token_ttl_secs = parse_env_or_default("LAAR_TOKEN_TTL_SECS", DEFAULT_TOKEN_TTL_SECS)?;
        if token_ttl_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "LAAR_TOKEN_TTL_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            username: get_required_env("LAAR_USERNAME")?,
            password: get_required_secret("LAAR_PASSWORD")?,
            token_ttl_secs,
            http_timeout_secs: parse_env_or_default("LAAR_HTTP_TIMEOUT_SECS", 30_u64)?,
        })
    }

    /// Per-call timeout for outbound requests.
    #[must_use]
    pub const fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

impl ShopifyConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let access_token = get_required_env("SHOPIFY_ACCESS_TOKEN")?;
        if let Err(e) = validate_secret_strength(&access_token, "SHOPIFY_ACCESS_TOKEN") {
            tracing::warn!("SHOPIFY_ACCESS_TOKEN validation warning: {e}");
        }

        Ok(Self {
            store: get_required_env("SHOPIFY_STORE")?,
            api_version: get_env_or_default("SHOPIFY_API_VERSION", DEFAULT_SHOPIFY_API_VERSION),
            access_token: SecretString::from(access_token),
            webhook_secret: webhook_secret_from_env(),
            admin_base_url: get_optional_env("SHOPIFY_ADMIN_BASE_URL"),
        })
    }
}

/// Load the webhook secret from environment.
///
/// A missing or blank secret is not a startup error: the relay keeps
/// serving health checks and answers every webhook with 401 until it is
/// configured.
pub fn webhook_secret_from_env() -> Option<SecretString> {
    webhook_secret_from(get_optional_env("SHOPIFY_WEBHOOK_SECRET"))
}

/// An empty key would let anyone sign webhooks, so blank counts as unset.
fn webhook_secret_from(value: Option<String>) -> Option<SecretString> {
    let Some(secret) = value.filter(|s| !s.trim().is_empty()) else {
        tracing::warn!("SHOPIFY_WEBHOOK_SECRET is not set; all webhooks will be rejected");
        return None;
    };
    if let Err(e) = validate_secret_strength(&secret, "SHOPIFY_WEBHOOK_SECRET") {
        tracing::warn!("SHOPIFY_WEBHOOK_SECRET validation warning: {e}");
    }
    Some(SecretString::from(secret))
}

impl ShipmentConfig {
    /// Load the fixed shipment fields. The CLI preview uses this too.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required sender field is missing.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let phone = get_required_env("LAAR_ORIGIN_PHONE")?;
        let origin = OriginConfig {
            identification: get_required_env("LAAR_ORIGIN_ID")?,
            city: get_env_or_default("LAAR_ORIGIN_CITY", DEFAULT_ORIGIN_CITY),
            name: get_required_env("LAAR_ORIGIN_NAME")?,
            address: get_required_env("LAAR_ORIGIN_ADDRESS")?,
            reference: get_env_or_default("LAAR_ORIGIN_REFERENCE", ""),
            mobile: get_optional_env("LAAR_ORIGIN_MOBILE").unwrap_or_else(|| phone.clone()),
            phone,
        };

        Ok(Self {
            service_type: get_env_or_default("LAAR_SERVICE_TYPE", DEFAULT_SERVICE_TYPE),
            package_size: get_env_or_default("LAAR_PACKAGE_SIZE", DEFAULT_PACKAGE_SIZE),
            origin,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse an optional environment variable, falling back to `default` when unset.
fn parse_env_or_default<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |raw| {
        raw.parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Check that a secret is not a placeholder and has plausible entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
    }

    Ok(())
}
