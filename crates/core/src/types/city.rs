//! Laarcourier city catalog entries.

use serde::{Deserialize, Serialize};

/// One city from the courier's `/ciudades` catalog.
///
/// Only `nombre` and `codigo` take part in shipment creation; the routing
/// fields are kept so the catalog can be inspected from the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityEntry {
    /// City name as the courier spells it.
    pub nombre: String,
    /// Courier-specific city code.
    #[serde(deserialize_with = "crate::types::lenient::string_or_number")]
    pub codigo: String,
    #[serde(default)]
    pub trayecto: Option<String>,
    #[serde(default)]
    pub provincia: Option<String>,
    #[serde(default)]
    pub codigo_provincia: Option<String>,
    #[serde(default)]
    pub codigor: Option<i64>,
}

impl CityEntry {
    /// Create an entry with just a name and a code.
    #[must_use]
    pub fn new(nombre: impl Into<String>, codigo: impl Into<String>) -> Self {
        Self {
            nombre: nombre.into(),
            codigo: codigo.into(),
            trayecto: None,
            provincia: None,
            codigo_provincia: None,
            codigor: None,
        }
    }

    /// Case-insensitive exact comparison against a city name.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        self.nombre.to_lowercase() == name.to_lowercase()
    }

    /// The city code as the integer the shipment schema expects.
    ///
    /// Returns `None` when the catalog code is not numeric.
    #[must_use]
    pub fn numeric_code(&self) -> Option<i64> {
        self.codigo.trim().parse().ok()
    }
}
