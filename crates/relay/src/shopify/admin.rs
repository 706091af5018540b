//! Shopify Admin REST client for recording labels on orders.

use std::sync::Arc;
use std::time::Duration;

use laar_relay_core::{LABEL_ATTRIBUTE, NoteAttribute, OrderId};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::instrument;

use super::ShopifyError;
use crate::config::ShopifyConfig;

/// Shopify Admin API client.
///
/// Only used to write the label URL back onto the order, authenticated with
/// the store's Admin API access token.
#[derive(Clone)]
pub struct ShopifyAdminClient {
    inner: Arc<ShopifyAdminClientInner>,
}

struct ShopifyAdminClientInner {
    client: reqwest::Client,
    base_url: String,
    api_version: String,
    access_token: SecretString,
}

impl std::fmt::Debug for ShopifyAdminClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyAdminClient")
            .field("base_url", &self.inner.base_url)
            .field("api_version", &self.inner.api_version)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

#[derive(Serialize)]
struct OrderUpdate<'a> {
    order: OrderAttributes<'a>,
}

#[derive(Serialize)]
struct OrderAttributes<'a> {
    id: OrderId,
    note_attributes: Vec<&'a NoteAttribute>,
}

impl ShopifyAdminClient {
    /// Create a new Admin API client.
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::Http` if the HTTP client cannot be built.
    pub fn new(config: &ShopifyConfig, timeout: Duration) -> Result<Self, ShopifyError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            inner: Arc::new(ShopifyAdminClientInner {
                client,
                base_url: config.admin_base_url(),
                api_version: config.api_version.clone(),
                access_token: config.access_token.clone(),
            }),
        })
    }

    fn order_url(&self, order_id: OrderId) -> String {
        format!(
            "{}/admin/api/{}/orders/{order_id}.json",
            self.inner.base_url, self.inner.api_version
        )
    }

    /// Attach the label URL to the order as the `Guía de Envío` note attribute.
    ///
    /// Shopify replaces `note_attributes` wholesale, so `existing` attributes
    /// are sent along (minus any stale label entry).
    ///
    /// # Errors
    ///
    /// Returns `ShopifyError::Api` on a non-success status and
    /// `ShopifyError::Http` on transport failures.
    #[instrument(skip(self, existing), fields(order_id = %order_id))]
    pub async fn write_back(
        &self,
        order_id: OrderId,
        label_url: &str,
        existing: &[NoteAttribute],
    ) -> Result<(), ShopifyError> {
        let label = NoteAttribute::new(LABEL_ATTRIBUTE, label_url);
        let note_attributes = existing
            .iter()
            .filter(|attr| attr.name != LABEL_ATTRIBUTE)
            .chain(std::iter::once(&label))
            .collect();

        let body = OrderUpdate {
            order: OrderAttributes {
                id: order_id,
                note_attributes,
            },
        };

        let response = self
            .inner
            .client
            .put(self.order_url(order_id))
            .header("X-Shopify-Access-Token", self.inner.access_token.expose_secret())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ShopifyError::Api {
                status: status.as_u16(),
                body,
            });
        }

        tracing::info!("Order updated with shipping label URL");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ShopifyAdminClient {
        let config = ShopifyConfig {
            store: "tienda-test".to_string(),
            api_version: "2025-04".to_string(),
            access_token: SecretString::from("shpat_test"),
            webhook_secret: None,
            admin_base_url: None,
        };
        ShopifyAdminClient::new(&config, Duration::from_secs(5)).expect("client builds")
    }

    #[test]
    fn test_order_url() {
        assert_eq!(
            client().order_url(OrderId::new(450_789_469)),
            "https://tienda-test.myshopify.com/admin/api/2025-04/orders/450789469.json"
        );
    }

    #[test]
    fn test_debug_redacts_token() {
        let debug_output = format!("{:?}", client());
        assert!(!debug_output.contains("shpat_test"));
    }

    #[test]
    fn test_update_body_shape() {
        let gift = NoteAttribute::new("gift", "yes");
        let label = NoteAttribute::new(LABEL_ATTRIBUTE, "https://labels.test/1.pdf");
        let body = OrderUpdate {
            order: OrderAttributes {
                id: OrderId::new(1),
                note_attributes: vec![&gift, &label],
            },
        };

        let json = serde_json::to_value(&body).expect("serializes");
        assert_eq!(json["order"]["id"], 1);
        assert_eq!(json["order"]["note_attributes"][1]["name"], LABEL_ATTRIBUTE);
        assert_eq!(
            json["order"]["note_attributes"][1]["value"],
            "https://labels.test/1.pdf"
        );
    }
}
