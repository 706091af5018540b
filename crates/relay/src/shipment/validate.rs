use laar_relay_core::ShipmentRequest;

/// Check the fields the courier rejects a shipment without.
///
/// Returns human-readable messages in a fixed order (origin city, destination
/// city, service type). An empty list means the request may be submitted.
#[must_use]
pub fn validate(request: &ShipmentRequest) -> Vec<String> {
    let mut errors = Vec::new();

    if !is_valid_code(request.origin.city_code) {
        errors.push(required("ciudadO"));
    }
    if !is_valid_code(request.destination.city_code) {
        errors.push(required("ciudadD"));
    }
    if request.service_type.trim().is_empty() {
        errors.push(required("tipoServicio"));
    }

    errors
}

fn is_valid_code(code: Option<i64>) -> bool {
    code.is_some_and(|c| c > 0)
}

fn required(field: &str) -> String {
    format!("Field '{field}' is required.")
}

#[cfg(test)]
mod tests {
    use laar_relay_core::{Destination, Origin};
    use rust_decimal::Decimal;

    use super::*;

    fn request(origin: Option<i64>, destination: Option<i64>, service: &str) -> ShipmentRequest {
        ShipmentRequest {
            origin: Origin {
                identification: "1790000000001".to_string(),
                city_code: origin,
                name: "Sender".to_string(),
                address: "Av. Amazonas".to_string(),
                reference: String::new(),
                phone: "022000000".to_string(),
                mobile: "022000000".to_string(),
            },
            destination: Destination {
                identification: "42".to_string(),
                city_code: destination,
                name: "Ana Mora".to_string(),
                address: "Calle 1".to_string(),
                reference: String::new(),
                phone: "0999999999".to_string(),
                mobile: "0999999999".to_string(),
            },
            service_type: service.to_string(),
            pieces: 1,
            weight_kg: Decimal::ONE,
            contents: "Camisa".to_string(),
            declared_value: Decimal::TEN,
            package_size: "Mediano".to_string(),
            cod: false,
            freight_cost: Decimal::ZERO,
            product_cost: Decimal::TEN,
            payment_type: 1,
            comment: "Orden de Shopify".to_string(),
            ordered_at: "2026-01-10T12:00:00Z".to_string(),
            extras: serde_json::Map::new(),
        }
    }

    #[test]
    fn test_valid_request_has_no_errors() {
        assert!(validate(&request(Some(201_001_001), Some(170), "2012020020091")).is_empty());
    }

    #[test]
    fn test_missing_destination_code() {
        let errors = validate(&request(Some(201_001_001), None, "2012020020091"));
        assert_eq!(errors, vec!["Field 'ciudadD' is required.".to_string()]);
    }

    #[test]
    fn test_errors_are_reported_in_order() {
        let errors = validate(&request(None, Some(0), "  "));
        assert_eq!(
            errors,
            vec![
                "Field 'ciudadO' is required.".to_string(),
                "Field 'ciudadD' is required.".to_string(),
                "Field 'tipoServicio' is required.".to_string(),
            ]
        );
    }
}
