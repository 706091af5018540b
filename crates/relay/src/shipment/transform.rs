use chrono::{SecondsFormat, Utc};
use laar_relay_core::{Destination, OrderPayload, Origin, ShipmentRequest};
use thiserror::Error;
use tracing::instrument;

use crate::config::ShipmentConfig;
use crate::laar::CityCatalog;

const DEFAULT_COMMENT: &str = "Orden de Shopify";
/// Payment type 1: sender pays the freight.
const PAYMENT_TYPE_SENDER: u8 = 1;

/// Which end of the shipment a city belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CitySide {
    Origin,
    Destination,
}

impl std::fmt::Display for CitySide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Origin => f.write_str("origin"),
            Self::Destination => f.write_str("destination"),
        }
    }
}

/// Order data problems detected while building the shipment.
#[derive(Debug, Error)]
pub enum TransformError {
    /// A section the shipment cannot be built without is absent.
    #[error("Incomplete order: missing {0}")]
    IncompleteOrder(&'static str),

    /// A city is not in the courier catalog.
    #[error("Invalid {side} city: {name}")]
    InvalidCity {
        side: CitySide,
        name: String,
    },
}

/// Build the courier shipment request for `order`.
///
/// Checks `shipping_address` and `customer` before touching the city
/// catalog, so an incomplete order causes no outbound calls.
///
/// # Errors
///
/// Returns `TransformError::IncompleteOrder` when the shipping address or
/// customer is missing, and `TransformError::InvalidCity` when the origin or
/// destination city is not in the catalog.
#[instrument(skip_all, fields(order_id = ?order.id))]
pub async fn transform(
    order: &OrderPayload,
    cities: &CityCatalog,
    config: &ShipmentConfig,
) -> Result<ShipmentRequest, TransformError> {
    let shipping = order
        .shipping_address
        .as_ref()
        .ok_or(TransformError::IncompleteOrder("shipping_address"))?;
    let customer = order
        .customer
        .as_ref()
        .ok_or(TransformError::IncompleteOrder("customer"))?;

    let origin_name = config.origin.city.as_str();
    let origin_city = cities
        .resolve(origin_name)
        .await
        .ok_or_else(|| TransformError::InvalidCity {
            side: CitySide::Origin,
            name: origin_name.to_string(),
        })?;

    let destination_name = shipping.city.as_deref().unwrap_or_default();
    let destination_city = cities
        .resolve(destination_name)
        .await
        .ok_or_else(|| TransformError::InvalidCity {
            side: CitySide::Destination,
            name: destination_name.to_string(),
        })?;

    let recipient = format!(
        "{} {}",
        shipping.first_name.as_deref().unwrap_or_default(),
        shipping.last_name.as_deref().unwrap_or_default()
    );
    let phone = non_empty(shipping.phone.as_deref());

    let contents = order
        .line_items
        .iter()
        .filter_map(|item| item.name.as_deref())
        .collect::<Vec<_>>()
        .join(", ");

    let total_price = order.total_price.unwrap_or_default();

    Ok(ShipmentRequest {
        origin: Origin {
            identification: config.origin.identification.clone(),
            city_code: origin_city.numeric_code(),
            name: config.origin.name.clone(),
            address: config.origin.address.clone(),
            reference: config.origin.reference.clone(),
            phone: config.origin.phone.clone(),
            mobile: config.origin.mobile.clone(),
        },
        destination: Destination {
            identification: customer
                .id
                .map_or_else(|| "Sin ID".to_string(), |id| id.to_string()),
            city_code: destination_city.numeric_code(),
            name: recipient.trim().to_string(),
            address: non_empty(shipping.address1.as_deref())
                .unwrap_or("Sin dirección")
                .to_string(),
            reference: shipping.address2.clone().unwrap_or_default(),
            phone: phone.unwrap_or("Sin teléfono").to_string(),
            mobile: phone.unwrap_or("Sin celular").to_string(),
        },
        service_type: config.service_type.clone(),
        pieces: order.line_items.len(),
        weight_kg: order.total_weight().to_kilograms(),
        contents,
        declared_value: total_price,
        package_size: config.package_size.clone(),
        cod: false,
        freight_cost: order.shipping_cost(),
        product_cost: total_price,
        payment_type: PAYMENT_TYPE_SENDER,
        comment: non_empty(order.note.as_deref())
            .unwrap_or(DEFAULT_COMMENT)
            .to_string(),
        ordered_at: non_empty(order.created_at.as_deref()).map_or_else(
            || Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            str::to_string,
        ),
        extras: serde_json::Map::new(),
    })
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
