//! End-to-end tests for the `orders/create` webhook.
//!
//! Each test runs the real router against fresh courier and Shopify fakes
//! and asserts both the response and the outbound traffic it caused.

use std::time::Duration;

use laar_relay::shopify::webhook::sign;
use laar_relay_core::LABEL_ATTRIBUTE;
use laar_relay_integration_tests::{COURIER_TOKEN, TestRelay, guayaquil_order, sign_body};
use secrecy::SecretString;
use serde_json::{Value, json};

// =============================================================================
// Happy path
// =============================================================================

#[tokio::test]
async fn test_guayaquil_order_creates_label() {
    let relay = TestRelay::start().await;

    let response = relay.post_order(&guayaquil_order()).await;
    assert_eq!(response.status(), 200);
    assert!(response.headers().contains_key("x-request-id"));

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["guia"], "LC000001");
    assert_eq!(body["urlEtiqueta"], "https://labels.test/LC000001.pdf");

    let shipment = relay.courier.last_shipment().expect("shipment submitted");
    assert_eq!(shipment["peso"], json!(1.3));
    assert_eq!(shipment["noPiezas"], json!(2));
    assert_eq!(shipment["destino"]["ciudadD"], json!(170));
    assert_eq!(shipment["origen"]["ciudadO"], json!(201_001_001));
    assert_eq!(shipment["destino"]["nombreD"], "Ana Mora");
    assert_eq!(shipment["contiene"], "Camisa, Gorra");
    assert_eq!(shipment["valorDeclarado"], json!(45.9));
    assert_eq!(shipment["costoflete"], json!(4.5));
    assert_eq!(shipment["comentario"], "Entregar en la tarde");
    assert_eq!(shipment["tipoServicio"], "2012020020091");
    assert_eq!(shipment["cod"], json!(false));
    assert_eq!(relay.courier.last_bearer().as_deref(), Some(COURIER_TOKEN));
}

#[tokio::test]
async fn test_label_is_written_back_to_order() {
    let relay = TestRelay::start().await;

    let response = relay.post_order(&guayaquil_order()).await;
    assert_eq!(response.status(), 200);

    assert_eq!(relay.shopify.update_calls(), 1);
    assert_eq!(
        relay.shopify.last_access_token().as_deref(),
        Some("shpat_integration")
    );

    let (file, body) = relay.shopify.last_update().expect("order updated");
    assert_eq!(file, "5551234567.json");
    assert_eq!(body["order"]["id"], json!(5_551_234_567_i64));

    let attributes = body["order"]["note_attributes"].as_array().unwrap();
    assert_eq!(attributes.len(), 2);
    assert_eq!(attributes[0]["name"], "gift");
    assert_eq!(attributes[1]["name"], LABEL_ATTRIBUTE);
    assert_eq!(attributes[1]["value"], "https://labels.test/LC000001.pdf");
}

#[tokio::test]
async fn test_catalog_loaded_lazily_once() {
    let relay = TestRelay::start().await;

    relay.post_order(&guayaquil_order()).await;
    relay.post_order(&guayaquil_order()).await;

    assert_eq!(relay.courier.catalog_calls(), 1);
    assert_eq!(relay.courier.auth_calls(), 1);
    assert_eq!(relay.courier.shipment_calls(), 2);
}

// =============================================================================
// Idempotency
// =============================================================================

#[tokio::test]
async fn test_already_labeled_order_is_not_resubmitted() {
    let relay = TestRelay::start().await;
    let mut order = guayaquil_order();
    order["note_attributes"] = json!([
        {"name": LABEL_ATTRIBUTE, "value": "https://labels.test/OLD.pdf"}
    ]);

    let response = relay.post_order(&order).await;
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Order already has a shipping label");
    assert_eq!(body["urlEtiqueta"], "https://labels.test/OLD.pdf");

    assert_eq!(relay.courier.total_calls(), 0);
    assert_eq!(relay.shopify.update_calls(), 0);
}

// =============================================================================
// Authentication of the webhook
// =============================================================================

#[tokio::test]
async fn test_bad_signature_is_rejected() {
    let relay = TestRelay::start().await;
    let body = serde_json::to_vec(&guayaquil_order()).unwrap();
    let signature = sign_body(b"some other body");

    let response = relay.post_raw(body, Some(&signature)).await;
    assert_eq!(response.status(), 401);
    assert_eq!(relay.courier.total_calls(), 0);
}

#[tokio::test]
async fn test_missing_signature_is_rejected() {
    let relay = TestRelay::start().await;
    let body = serde_json::to_vec(&guayaquil_order()).unwrap();

    let response = relay.post_raw(body, None).await;
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_signature_covers_exact_bytes() {
    let relay = TestRelay::start().await;
    let compact = serde_json::to_vec(&guayaquil_order()).unwrap();
    let pretty = serde_json::to_vec_pretty(&guayaquil_order()).unwrap();

    // Same JSON value, different bytes
    let response = relay.post_raw(pretty, Some(&sign_body(&compact))).await;
    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_missing_secret_rejects_everything() {
    let relay = TestRelay::start_with(|config| config.shopify.webhook_secret = None).await;

    let response = relay.post_order(&guayaquil_order()).await;
    assert_eq!(response.status(), 401);
    assert_eq!(relay.courier.total_calls(), 0);
}

#[tokio::test]
async fn test_blank_secret_rejects_empty_key_signatures() {
    let relay = TestRelay::start_with(|config| {
        config.shopify.webhook_secret = Some(SecretString::from(""));
    })
    .await;
    let body = serde_json::to_vec(&guayaquil_order()).unwrap();
    let signature = sign(&SecretString::from(""), &body).unwrap();

    let response = relay.post_raw(body, Some(&signature)).await;
    assert_eq!(response.status(), 401);
    assert_eq!(relay.courier.total_calls(), 0);
    assert_eq!(relay.shopify.update_calls(), 0);
}

// =============================================================================
// Order problems
// =============================================================================

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let relay = TestRelay::start().await;
    let body = b"{not json".to_vec();
    let signature = sign_body(&body);

    let response = relay.post_raw(body, Some(&signature)).await;
    assert_eq!(response.status(), 400);
    assert_eq!(relay.courier.total_calls(), 0);
}

#[tokio::test]
async fn test_missing_shipping_address_makes_no_outbound_calls() {
    let relay = TestRelay::start().await;
    let mut order = guayaquil_order();
    order.as_object_mut().unwrap().remove("shipping_address");

    let response = relay.post_order(&order).await;
    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("shipping_address"));
    assert_eq!(relay.courier.total_calls(), 0);
    assert_eq!(relay.shopify.update_calls(), 0);
}

#[tokio::test]
async fn test_unknown_city_does_not_authenticate() {
    let relay = TestRelay::start().await;
    let mut order = guayaquil_order();
    order["shipping_address"]["city"] = json!("Atlantis");

    let response = relay.post_order(&order).await;
    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Invalid destination city: Atlantis");
    assert_eq!(relay.courier.auth_calls(), 0);
    assert_eq!(relay.courier.shipment_calls(), 0);
}

#[tokio::test]
async fn test_unknown_origin_city_does_not_authenticate() {
    let relay =
        TestRelay::start_with(|config| config.shipment.origin.city = "Narnia".to_string()).await;

    let response = relay.post_order(&guayaquil_order()).await;
    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Invalid origin city: Narnia");
    assert_eq!(relay.courier.auth_calls(), 0);
    assert_eq!(relay.courier.shipment_calls(), 0);
    assert_eq!(relay.shopify.update_calls(), 0);
}

#[tokio::test]
async fn test_non_numeric_city_code_fails_validation() {
    let relay = TestRelay::start().await;
    relay.courier.set_catalog(vec![
        json!({"nombre": "Quito", "codigo": "201001001"}),
        json!({"nombre": "Guayaquil", "codigo": "GYE"}),
    ]);

    let response = relay.post_order(&guayaquil_order()).await;
    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["details"], json!(["Field 'ciudadD' is required."]));
    assert_eq!(relay.courier.auth_calls(), 0);
}

// =============================================================================
// Courier failures
// =============================================================================

#[tokio::test]
async fn test_rejected_credentials_are_unauthorized() {
    let relay = TestRelay::start().await;
    relay.courier.set_auth_status(401);

    let response = relay.post_order(&guayaquil_order()).await;
    assert_eq!(response.status(), 401);
    assert_eq!(relay.courier.shipment_calls(), 0);
}

#[tokio::test]
async fn test_courier_error_status_is_passed_through() {
    let relay = TestRelay::start().await;
    relay.courier.set_shipment_status(422);

    let response = relay.post_order(&guayaquil_order()).await;
    assert_eq!(response.status(), 422);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["details"], r#"{"Message":"Guía rechazada"}"#);
    assert_eq!(relay.shopify.update_calls(), 0);
}

#[tokio::test]
async fn test_courier_unauthorized_clears_token() {
    let relay = TestRelay::start().await;
    relay.courier.set_shipment_status(401);

    let response = relay.post_order(&guayaquil_order()).await;
    assert_eq!(response.status(), 401);
    assert!(relay.state.tokens().current().await.is_none());

    relay.courier.set_shipment_status(200);
    let response = relay.post_order(&guayaquil_order()).await;
    assert_eq!(response.status(), 200);
    assert_eq!(relay.courier.auth_calls(), 2);
}

#[tokio::test]
async fn test_deadline_exceeded_is_gateway_timeout() {
    let relay = TestRelay::start_with(|config| config.webhook_deadline_secs = 1).await;
    relay.courier.set_shipment_delay(Duration::from_secs(3));

    let response = relay.post_order(&guayaquil_order()).await;
    assert_eq!(response.status(), 504);
    assert_eq!(relay.shopify.update_calls(), 0);
}

// =============================================================================
// Write-back
// =============================================================================

#[tokio::test]
async fn test_writeback_failure_still_succeeds() {
    let relay = TestRelay::start().await;
    relay.shopify.set_update_status(503);

    let response = relay.post_order(&guayaquil_order()).await;
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["guia"], "LC000001");
    assert_eq!(relay.shopify.update_calls(), 1);
}

#[tokio::test]
async fn test_order_without_id_still_succeeds() {
    let relay = TestRelay::start().await;
    let mut order = guayaquil_order();
    order.as_object_mut().unwrap().remove("id");

    let response = relay.post_order(&order).await;
    assert_eq!(response.status(), 200);
    assert_eq!(relay.shopify.update_calls(), 0);
}

// =============================================================================
// Probes
// =============================================================================

#[tokio::test]
async fn test_webhook_probe() {
    let relay = TestRelay::start().await;

    let response = relay.client.get(relay.webhook_url()).send().await.unwrap();
    assert_eq!(response.status(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["ok"], json!(true));
}

#[tokio::test]
async fn test_readiness_loads_catalog_on_demand() {
    let relay = TestRelay::start().await;
    let ready_url = format!("{}/health/ready", relay.url);

    let response = relay.client.get(&ready_url).send().await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(relay.courier.catalog_calls(), 1);

    // Populated catalog is not fetched again
    let response = relay.client.get(&ready_url).send().await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(relay.courier.catalog_calls(), 1);

    let response = relay
        .client
        .get(format!("{}/health", relay.url))
        .send()
        .await
        .unwrap();
    assert_eq!(response.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn test_readiness_recovers_after_catalog_outage() {
    let relay = TestRelay::start().await;
    let ready_url = format!("{}/health/ready", relay.url);
    relay.courier.set_catalog_status(503);

    // Startup preload fails the same way
    assert!(relay.state.cities().refresh().await.is_err());

    let response = relay.client.get(&ready_url).send().await.unwrap();
    assert_eq!(response.status(), 503);

    relay.courier.set_catalog_status(200);

    let response = relay.client.get(&ready_url).send().await.unwrap();
    assert_eq!(response.status(), 200);
    assert!(!relay.state.cities().is_empty().await);
    assert_eq!(relay.courier.shipment_calls(), 0);
}
