//! Shopify `orders/create` webhook handler.
//!
//! One delivery runs to completion: verify the signature, skip orders that
//! already carry a label, build and validate the shipment, submit it to the
//! courier, then record the label URL on the order. Everything up to and
//! including submission runs under the processing deadline; the write-back
//! does not, and its failure never fails the delivery.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::HeaderMap,
};
use laar_relay_core::{DeliveryOutcome, OrderPayload, ShipmentResult};
use secrecy::ExposeSecret;
use serde_json::{Value, json};
use tracing::{Span, instrument};

use crate::error::{Result, WebhookError};
use crate::shipment::{transform, validate};
use crate::shopify::ShopifyError;
use crate::shopify::webhook::{HMAC_HEADER, verify};
use crate::state::AppState;

/// Liveness probe for the webhook route.
pub async fn probe() -> Json<Value> {
    Json(json!({
        "ok": true,
        "message": "Order webhook endpoint is up",
    }))
}

/// Handle an `orders/create` delivery.
///
/// The body is taken as raw bytes so the signature is checked over exactly
/// what Shopify signed.
#[instrument(
    skip(state, headers, body),
    fields(order_id = tracing::field::Empty, outcome = tracing::field::Empty)
)]
pub async fn create_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>> {
    let secret = state
        .config()
        .shopify
        .webhook_secret
        .as_ref()
        .filter(|secret| !secret.expose_secret().trim().is_empty())
        .ok_or(WebhookError::MissingSecret)?;

    let signature = headers.get(HMAC_HEADER).and_then(|v| v.to_str().ok());
    if !verify(secret, &body, signature) {
        return Err(WebhookError::SignatureInvalid);
    }

    let order: OrderPayload = serde_json::from_slice(&body)?;
    if let Some(id) = order.id {
        Span::current().record("order_id", id.as_i64());
    }

    if let Some(label) = order.shipping_label() {
        Span::current().record("outcome", DeliveryOutcome::AlreadyLabeled.as_str());
        tracing::info!(label_url = ?label.value, "Order already has a shipping label");
        return Ok(Json(json!({
            "message": "Order already has a shipping label",
            "urlEtiqueta": label.value,
        })));
    }

    let shipment = tokio::time::timeout(
        state.config().webhook_deadline(),
        create_shipment(&state, &order),
    )
    .await
    .map_err(|_| WebhookError::DeadlineExceeded)??;

    let outcome = record_label(&state, &order, &shipment.url).await;
    Span::current().record("outcome", outcome.as_str());
    tracing::info!(guia = %shipment.guia, %outcome, "Shipping label created");

    Ok(Json(json!({
        "guia": shipment.guia,
        "urlEtiqueta": shipment.url,
    })))
}

/// Transform, validate, authenticate and submit.
async fn create_shipment(state: &AppState, order: &OrderPayload) -> Result<ShipmentResult> {
    let request = transform(order, state.cities(), &state.config().shipment).await?;

    let errors = validate(&request);
    if !errors.is_empty() {
        return Err(WebhookError::Validation(errors));
    }

    let token = state
        .tokens()
        .get_token()
        .await
        .map_err(WebhookError::Authentication)?;

    match state.laar().create_shipment(&request, &token).await {
        Ok(result) => Ok(result),
        Err(e) => {
            if e.is_unauthorized_submission() {
                tracing::warn!("Courier rejected bearer token, clearing cache");
                state.tokens().invalidate().await;
            }
            Err(WebhookError::Courier(e))
        }
    }
}

/// Write the label URL back to the order.
///
/// Failures leave a created label that Shopify does not know about, so they
/// are logged on the `reconciliation` target and captured to Sentry.
async fn record_label(state: &AppState, order: &OrderPayload, label_url: &str) -> DeliveryOutcome {
    let result = match order.id {
        Some(id) => {
            state
                .shopify()
                .write_back(id, label_url, &order.note_attributes)
                .await
        }
        None => Err(ShopifyError::MissingOrderId),
    };

    match result {
        Ok(()) => DeliveryOutcome::WritebackOk,
        Err(e) => {
            let event_id = sentry::capture_error(&e);
            tracing::error!(
                target: "reconciliation",
                order_id = ?order.id,
                label_url,
                error = %e,
                sentry_event_id = %event_id,
                "Label created but not recorded on order"
            );
            DeliveryOutcome::WritebackFailed
        }
    }
}
