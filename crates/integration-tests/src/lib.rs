//! Integration test harness for Laar Relay.
//!
//! Spins up in-process fakes of the two external services on ephemeral
//! ports and runs the real relay router against them:
//!
//! - [`FakeCourier`] serves `/ciudades`, `/authenticate` and `/guias/contado`
//! - [`FakeShopify`] serves the Admin API order update
//! - [`TestRelay`] wires both into an [`AppState`] and serves the app
//!
//! Every fake counts its calls so tests can assert which outbound requests
//! a delivery made.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p laar-relay-integration-tests
//! ```

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU16, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use laar_relay::config::{LaarConfig, OriginConfig, RelayConfig, ShipmentConfig, ShopifyConfig};
use laar_relay::shopify::webhook::{HMAC_HEADER, sign};
use laar_relay::state::AppState;
use secrecy::SecretString;
use serde_json::{Value, json};

/// Webhook secret shared by the relay and the test client.
pub const WEBHOOK_SECRET: &str = "integration-webhook-secret";

/// Bearer token the fake courier issues.
pub const COURIER_TOKEN: &str = "fake-courier-token";

/// Admin API version the relay is configured with.
pub const API_VERSION: &str = "2025-04";

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

// =============================================================================
// Fake courier
// =============================================================================

/// Recorded traffic and scripted responses of the fake courier.
pub struct CourierState {
    pub catalog: Mutex<Vec<Value>>,
    pub catalog_calls: AtomicUsize,
    pub catalog_status: AtomicU16,
    pub auth_calls: AtomicUsize,
    pub auth_status: AtomicU16,
    pub shipment_calls: AtomicUsize,
    pub shipment_status: AtomicU16,
    pub shipment_delay_ms: AtomicU64,
    pub last_shipment: Mutex<Option<Value>>,
    pub last_bearer: Mutex<Option<String>>,
}

impl Default for CourierState {
    fn default() -> Self {
        Self {
            catalog: Mutex::new(default_catalog()),
            catalog_calls: AtomicUsize::new(0),
            catalog_status: AtomicU16::new(200),
            auth_calls: AtomicUsize::new(0),
            auth_status: AtomicU16::new(200),
            shipment_calls: AtomicUsize::new(0),
            shipment_status: AtomicU16::new(200),
            shipment_delay_ms: AtomicU64::new(0),
            last_shipment: Mutex::new(None),
            last_bearer: Mutex::new(None),
        }
    }
}

/// Catalog with the sender city and a few destinations. Codes arrive as
/// strings and numbers, the way the real catalog mixes them.
#[must_use]
pub fn default_catalog() -> Vec<Value> {
    vec![
        json!({"nombre": "Quito", "codigo": "201001001", "provincia": "Pichincha"}),
        json!({"nombre": "Guayaquil", "codigo": "170", "provincia": "Guayas"}),
        json!({"nombre": "Cuenca", "codigo": 301, "provincia": "Azuay"}),
    ]
}

/// In-process Laarcourier stand-in.
pub struct FakeCourier {
    pub base_url: String,
    pub state: Arc<CourierState>,
}

impl FakeCourier {
    pub async fn start() -> Self {
        let state = Arc::new(CourierState::default());
        let app = Router::new()
            .route("/ciudades", get(courier_cities))
            .route("/authenticate", post(courier_authenticate))
            .route("/guias/contado", post(courier_create_shipment))
            .with_state(Arc::clone(&state));

        Self {
            base_url: serve(app).await,
            state,
        }
    }

    pub fn auth_calls(&self) -> usize {
        self.state.auth_calls.load(Ordering::SeqCst)
    }

    pub fn catalog_calls(&self) -> usize {
        self.state.catalog_calls.load(Ordering::SeqCst)
    }

    pub fn shipment_calls(&self) -> usize {
        self.state.shipment_calls.load(Ordering::SeqCst)
    }

    /// Total requests of any kind.
    pub fn total_calls(&self) -> usize {
        self.auth_calls() + self.catalog_calls() + self.shipment_calls()
    }

    pub fn last_shipment(&self) -> Option<Value> {
        self.state.last_shipment.lock().unwrap().clone()
    }

    pub fn last_bearer(&self) -> Option<String> {
        self.state.last_bearer.lock().unwrap().clone()
    }

    pub fn set_catalog_status(&self, status: u16) {
        self.state.catalog_status.store(status, Ordering::SeqCst);
    }

    pub fn set_auth_status(&self, status: u16) {
        self.state.auth_status.store(status, Ordering::SeqCst);
    }

    pub fn set_shipment_status(&self, status: u16) {
        self.state.shipment_status.store(status, Ordering::SeqCst);
    }

    pub fn set_shipment_delay(&self, delay: Duration) {
        let millis = u64::try_from(delay.as_millis()).unwrap();
        self.state.shipment_delay_ms.store(millis, Ordering::SeqCst);
    }

    pub fn set_catalog(&self, entries: Vec<Value>) {
        *self.state.catalog.lock().unwrap() = entries;
    }
}

async fn courier_cities(State(state): State<Arc<CourierState>>) -> Response {
    state.catalog_calls.fetch_add(1, Ordering::SeqCst);
    let status = StatusCode::from_u16(state.catalog_status.load(Ordering::SeqCst)).unwrap();
    if !status.is_success() {
        return (status, "Servicio no disponible").into_response();
    }

    let catalog = state.catalog.lock().unwrap().clone();
    Json(Value::Array(catalog)).into_response()
}

async fn courier_authenticate(
    State(state): State<Arc<CourierState>>,
    Json(body): Json<Value>,
) -> Response {
    state.auth_calls.fetch_add(1, Ordering::SeqCst);
    let status = StatusCode::from_u16(state.auth_status.load(Ordering::SeqCst)).unwrap();
    if !status.is_success() {
        return (status, "Usuario o contraseña incorrectos").into_response();
    }

    Json(json!({
        "token": COURIER_TOKEN,
        "nombre": body["username"],
        "ruc": "1790000000001",
        "codigoUsuario": 77,
        "codigoSucursal": 1,
    }))
    .into_response()
}

async fn courier_create_shipment(
    State(state): State<Arc<CourierState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let call = state.shipment_calls.fetch_add(1, Ordering::SeqCst) + 1;
    let bearer = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(String::from);
    *state.last_bearer.lock().unwrap() = bearer;
    *state.last_shipment.lock().unwrap() = Some(body);

    let delay = state.shipment_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }

    let status = StatusCode::from_u16(state.shipment_status.load(Ordering::SeqCst)).unwrap();
    if !status.is_success() {
        return (status, r#"{"Message":"Guía rechazada"}"#).into_response();
    }

    Json(json!({
        "guia": format!("LC{call:06}"),
        "url": format!("https://labels.test/LC{call:06}.pdf"),
    }))
    .into_response()
}

// =============================================================================
// Fake Shopify Admin API
// =============================================================================

/// Recorded traffic and scripted responses of the fake Admin API.
pub struct ShopifyState {
    pub update_calls: AtomicUsize,
    pub update_status: AtomicU16,
    pub last_update: Mutex<Option<(String, Value)>>,
    pub last_access_token: Mutex<Option<String>>,
}

impl Default for ShopifyState {
    fn default() -> Self {
        Self {
            update_calls: AtomicUsize::new(0),
            update_status: AtomicU16::new(200),
            last_update: Mutex::new(None),
            last_access_token: Mutex::new(None),
        }
    }
}

/// In-process Shopify Admin API stand-in.
pub struct FakeShopify {
    pub base_url: String,
    pub state: Arc<ShopifyState>,
}

impl FakeShopify {
    pub async fn start() -> Self {
        let state = Arc::new(ShopifyState::default());
        let app = Router::new()
            .route("/admin/api/{version}/orders/{file}", put(shopify_update_order))
            .with_state(Arc::clone(&state));

        Self {
            base_url: serve(app).await,
            state,
        }
    }

    pub fn update_calls(&self) -> usize {
        self.state.update_calls.load(Ordering::SeqCst)
    }

    /// Path file name (`{id}.json`) and body of the last order update.
    pub fn last_update(&self) -> Option<(String, Value)> {
        self.state.last_update.lock().unwrap().clone()
    }

    pub fn last_access_token(&self) -> Option<String> {
        self.state.last_access_token.lock().unwrap().clone()
    }

    pub fn set_update_status(&self, status: u16) {
        self.state.update_status.store(status, Ordering::SeqCst);
    }
}

async fn shopify_update_order(
    State(state): State<Arc<ShopifyState>>,
    Path((_version, file)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.update_calls.fetch_add(1, Ordering::SeqCst);
    *state.last_access_token.lock().unwrap() = headers
        .get("x-shopify-access-token")
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    *state.last_update.lock().unwrap() = Some((file, body.clone()));

    let status = StatusCode::from_u16(state.update_status.load(Ordering::SeqCst)).unwrap();
    if !status.is_success() {
        return (status, r#"{"errors":"Service unavailable"}"#).into_response();
    }
    Json(body).into_response()
}

// =============================================================================
// Relay under test
// =============================================================================

/// Relay configuration pointed at the given fakes.
#[must_use]
pub fn test_config(courier_url: &str, shopify_url: &str) -> RelayConfig {
    RelayConfig {
        host: [127, 0, 0, 1].into(),
        port: 0,
        webhook_deadline_secs: 10,
        laar: LaarConfig {
            base_url: courier_url.to_string(),
            username: "tienda-test".to_string(),
            password: SecretString::from("courier-password"),
            token_ttl_secs: 3600,
            http_timeout_secs: 5,
        },
        shopify: ShopifyConfig {
            store: "tienda-test".to_string(),
            api_version: API_VERSION.to_string(),
            access_token: SecretString::from("shpat_integration"),
            webhook_secret: Some(SecretString::from(WEBHOOK_SECRET)),
            admin_base_url: Some(shopify_url.to_string()),
        },
        shipment: ShipmentConfig {
            service_type: "2012020020091".to_string(),
            package_size: "Mediano".to_string(),
            origin: OriginConfig {
                identification: "1790000000001".to_string(),
                city: "Quito".to_string(),
                name: "Tienda Test".to_string(),
                address: "Av. Amazonas N24".to_string(),
                reference: String::new(),
                phone: "022000000".to_string(),
                mobile: "0990000000".to_string(),
            },
        },
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 0.0,
        sentry_traces_sample_rate: 0.0,
    }
}

/// A running relay wired to fresh fakes.
pub struct TestRelay {
    pub url: String,
    pub client: reqwest::Client,
    pub state: AppState,
    pub courier: FakeCourier,
    pub shopify: FakeShopify,
}

impl TestRelay {
    pub async fn start() -> Self {
        Self::start_with(|_| {}).await
    }

    /// Start with a configuration tweak applied before the state is built.
    pub async fn start_with(configure: impl FnOnce(&mut RelayConfig)) -> Self {
        let courier = FakeCourier::start().await;
        let shopify = FakeShopify::start().await;

        let mut config = test_config(&courier.base_url, &shopify.base_url);
        configure(&mut config);

        let state = AppState::new(config).unwrap();
        let url = serve(laar_relay::app(state.clone())).await;

        Self {
            url,
            client: reqwest::Client::new(),
            state,
            courier,
            shopify,
        }
    }

    pub fn webhook_url(&self) -> String {
        format!("{}/webhooks/orders/create", self.url)
    }

    /// POST an order body signed with [`WEBHOOK_SECRET`].
    pub async fn post_order(&self, order: &Value) -> reqwest::Response {
        let body = serde_json::to_vec(order).unwrap();
        let signature = sign_body(&body);
        self.post_raw(body, Some(&signature)).await
    }

    /// POST raw bytes with an optional signature header.
    pub async fn post_raw(&self, body: Vec<u8>, signature: Option<&str>) -> reqwest::Response {
        let mut request = self
            .client
            .post(self.webhook_url())
            .header("content-type", "application/json")
            .body(body);
        if let Some(signature) = signature {
            request = request.header(HMAC_HEADER, signature);
        }
        request.send().await.unwrap()
    }
}

/// Signature Shopify would send for `body`.
#[must_use]
pub fn sign_body(body: &[u8]) -> String {
    sign(&SecretString::from(WEBHOOK_SECRET), body).unwrap()
}

/// The reference order: two line items totalling 1300 g, shipped to
/// Guayaquil, no label yet.
#[must_use]
pub fn guayaquil_order() -> Value {
    json!({
        "id": 5_551_234_567_i64,
        "created_at": "2026-03-02T10:15:00-05:00",
        "total_price": "45.90",
        "note": "Entregar en la tarde",
        "customer": {"id": 7_001_i64},
        "shipping_address": {
            "first_name": "Ana",
            "last_name": "Mora",
            "address1": "Av. 9 de Octubre 100",
            "address2": "Piso 2",
            "city": "Guayaquil",
            "phone": "0999999999"
        },
        "line_items": [
            {"name": "Camisa", "grams": 500, "quantity": 2},
            {"name": "Gorra", "grams": 300, "quantity": 1}
        ],
        "shipping_lines": [{"price": "4.50"}],
        "note_attributes": [{"name": "gift", "value": "no"}]
    })
}
