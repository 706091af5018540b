//! Laar Relay - Shopify order webhook to Laarcourier labels.
//!
//! This binary serves the `orders/create` webhook on port 3000.
//!
//! # Architecture
//!
//! - Axum web framework, one handler per webhook delivery
//! - Laarcourier REST API for city codes, bearer tokens and shipments
//! - Shopify Admin REST API for recording the label URL on the order
//! - Process-wide city catalog and token cache, no database
//!
//! # Security
//!
//! Every delivery is authenticated with the HMAC-SHA256 signature Shopify
//! sends in `x-shopify-hmac-sha256`. Without `SHOPIFY_WEBHOOK_SECRET` all
//! deliveries are rejected.

#![cfg_attr(not(test), forbid(unsafe_code))]

use laar_relay::config::RelayConfig;
use laar_relay::state::AppState;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &RelayConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            sample_rate: config.sentry_sample_rate,
            traces_sample_rate: config.sentry_traces_sample_rate,
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Install the global subscriber: env filter, JSON on Fly.io or text
/// locally, and the Sentry bridge.
///
/// `.env` is loaded here so `RUST_LOG` from it applies.
fn init_tracing() {
    let _ = dotenvy::dotenv();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "laar_relay=info,tower_http=debug".into());

    let json_logs = std::env::var_os("FLY_APP_NAME").is_some();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true)))
        .with((!json_logs).then(tracing_subscriber::fmt::layer))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    // Subscriber first so configuration warnings are not lost. The Sentry
    // bridge resolves the client per event, so it picks up the later init.
    init_tracing();

    let config = RelayConfig::from_env().expect("Failed to load configuration");
    let _sentry_guard = init_sentry(&config);

    let addr = config.socket_addr();
    let state = AppState::new(config).expect("Failed to initialize application state");

    // On failure the first lookup retries the load
    if let Err(e) = state.cities().refresh().await {
        tracing::warn!(error = %e, "City catalog preload failed; readiness stays down");
    }

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");
    tracing::info!(%addr, "laar-relay listening");

    axum::serve(listener, laar_relay::app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Resolve on Ctrl+C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Ctrl+C handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}
