//! Shopify `orders/create` webhook payload.
//!
//! Only the fields consumed by the label flow are modelled. Every field is
//! optional at the parse level; the shipment transformer decides which ones
//! are required.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::{CustomerId, OrderId};
use super::weight::Grams;

/// Name of the order note attribute that stores the courier label URL.
///
/// Its presence on an incoming order means a label was already issued.
pub const LABEL_ATTRIBUTE: &str = "Guía de Envío";

/// An order as delivered by the Shopify webhook.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderPayload {
    #[serde(default)]
    pub id: Option<OrderId>,
    #[serde(default)]
    pub shipping_address: Option<ShippingAddress>,
    #[serde(default)]
    pub customer: Option<Customer>,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    /// Order total as a decimal string (e.g. `"45.90"`).
    #[serde(default)]
    pub total_price: Option<Decimal>,
    #[serde(default)]
    pub shipping_lines: Vec<ShippingLine>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub note_attributes: Vec<NoteAttribute>,
}

/// Shipping destination of an order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShippingAddress {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub address1: Option<String>,
    #[serde(default)]
    pub address2: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// The customer who placed the order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Customer {
    #[serde(default)]
    pub id: Option<CustomerId>,
}

/// One line of the order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default)]
    pub name: Option<String>,
    /// Unit weight in grams.
    #[serde(default)]
    pub grams: Option<u64>,
    #[serde(default)]
    pub quantity: Option<u64>,
}

/// A shipping method charged on the order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShippingLine {
    #[serde(default)]
    pub price: Option<Decimal>,
}

/// A free-form name/value attribute attached to the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteAttribute {
    pub name: String,
    #[serde(default)]
    pub value: Option<String>,
}

impl NoteAttribute {
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }
}

impl OrderPayload {
    /// The existing shipping label attribute, if a label was already issued.
    #[must_use]
    pub fn shipping_label(&self) -> Option<&NoteAttribute> {
        self.note_attributes
            .iter()
            .find(|attr| attr.name == LABEL_ATTRIBUTE)
    }

    /// Total shipment weight: unit grams times quantity, summed over lines.
    #[must_use]
    pub fn total_weight(&self) -> Grams {
        self.line_items.iter().map(LineItem::weight).sum()
    }

    /// Price of the first shipping line, zero when there is none.
    #[must_use]
    pub fn shipping_cost(&self) -> Decimal {
        self.shipping_lines
            .first()
            .and_then(|line| line.price)
            .unwrap_or_default()
    }
}

impl LineItem {
    /// Line weight. Missing grams count as zero, missing quantity as one.
    #[must_use]
    pub fn weight(&self) -> Grams {
        Grams::new(self.grams.unwrap_or(0)).times(self.quantity.unwrap_or(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_order() -> OrderPayload {
        serde_json::from_str(
            r#"{
                "id": 820982911946154508,
                "total_price": "45.90",
                "note": null,
                "line_items": [
                    {"name": "Camisa", "grams": 500, "quantity": 2},
                    {"name": "Gorra", "grams": 300, "quantity": 1}
                ],
                "shipping_lines": [{"price": "4.50"}],
                "note_attributes": [{"name": "gift", "value": "yes"}]
            }"#,
        )
        .expect("valid order payload")
    }

    #[test]
    fn test_total_weight() {
        assert_eq!(sample_order().total_weight(), Grams::new(1300));
    }

    #[test]
    fn test_line_item_defaults() {
        let item = LineItem {
            name: None,
            grams: Some(200),
            quantity: None,
        };
        assert_eq!(item.weight(), Grams::new(200));
        assert_eq!(LineItem::default().weight(), Grams::new(0));
    }

    #[test]
    fn test_shipping_cost() {
        assert_eq!(sample_order().shipping_cost(), Decimal::new(450, 2));
        assert_eq!(OrderPayload::default().shipping_cost(), Decimal::ZERO);
    }

    #[test]
    fn test_total_price_parsed_from_string() {
        assert_eq!(sample_order().total_price, Some(Decimal::new(4590, 2)));
    }

    #[test]
    fn test_shipping_label_lookup() {
        let mut order = sample_order();
        assert!(order.shipping_label().is_none());

        order
            .note_attributes
            .push(NoteAttribute::new(LABEL_ATTRIBUTE, "https://labels.example/1"));
        let label = order.shipping_label().expect("label present");
        assert_eq!(label.value.as_deref(), Some("https://labels.example/1"));
    }
}
