//! Laarcourier shipment ("guía") wire schema.
//!
//! Field names follow the courier's Spanish JSON keys via `serde(rename)`.
//! Money and weight are decimals internally and JSON numbers on the wire.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Request body for `POST /guias/contado`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShipmentRequest {
    #[serde(rename = "origen")]
    pub origin: Origin,
    #[serde(rename = "destino")]
    pub destination: Destination,
    #[serde(rename = "tipoServicio")]
    pub service_type: String,
    /// Number of distinct line items, not total units.
    #[serde(rename = "noPiezas")]
    pub pieces: usize,
    /// Total weight in kilograms.
    #[serde(rename = "peso", with = "rust_decimal::serde::float")]
    pub weight_kg: Decimal,
    #[serde(rename = "contiene")]
    pub contents: String,
    #[serde(rename = "valorDeclarado", with = "rust_decimal::serde::float")]
    pub declared_value: Decimal,
    #[serde(rename = "tamanio")]
    pub package_size: String,
    /// Cash on delivery.
    pub cod: bool,
    #[serde(rename = "costoflete", with = "rust_decimal::serde::float")]
    pub freight_cost: Decimal,
    #[serde(rename = "costoproducto", with = "rust_decimal::serde::float")]
    pub product_cost: Decimal,
    #[serde(rename = "tipocobro")]
    pub payment_type: u8,
    #[serde(rename = "comentario")]
    pub comment: String,
    #[serde(rename = "fechaPedido")]
    pub ordered_at: String,
    pub extras: serde_json::Map<String, serde_json::Value>,
}

/// Sender block. Identity and address are fixed per deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Origin {
    #[serde(rename = "identificacion")]
    pub identification: String,
    /// `None` when the catalog code is not numeric.
    #[serde(rename = "ciudadO")]
    pub city_code: Option<i64>,
    #[serde(rename = "nombreO")]
    pub name: String,
    #[serde(rename = "direccion")]
    pub address: String,
    #[serde(rename = "referencia")]
    pub reference: String,
    #[serde(rename = "telefono")]
    pub phone: String,
    #[serde(rename = "celular")]
    pub mobile: String,
}

/// Recipient block, derived from the order's shipping address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Destination {
    #[serde(rename = "identificacionD")]
    pub identification: String,
    #[serde(rename = "ciudadD")]
    pub city_code: Option<i64>,
    #[serde(rename = "nombreD")]
    pub name: String,
    #[serde(rename = "direccion")]
    pub address: String,
    #[serde(rename = "referencia")]
    pub reference: String,
    #[serde(rename = "telefono")]
    pub phone: String,
    #[serde(rename = "celular")]
    pub mobile: String,
}

/// Courier response for a created shipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipmentResult {
    /// Tracking number.
    #[serde(deserialize_with = "crate::types::lenient::string_or_number")]
    pub guia: String,
    /// Printable label URL.
    pub url: String,
}
