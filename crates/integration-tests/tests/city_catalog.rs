//! Integration tests for the city catalog cache.

use laar_relay::laar::{CityCatalog, LaarClient};
use laar_relay_integration_tests::FakeCourier;
use serde_json::json;

fn catalog(courier: &FakeCourier) -> CityCatalog {
    CityCatalog::new(LaarClient::with_http_client(
        reqwest::Client::new(),
        &courier.base_url,
    ))
}

#[tokio::test]
async fn test_refresh_loads_catalog() {
    let courier = FakeCourier::start().await;
    let cities = catalog(&courier);

    assert_eq!(cities.refresh().await.unwrap(), 3);
    assert_eq!(cities.len().await, 3);
    assert!(!cities.is_empty().await);
}

#[tokio::test]
async fn test_resolve_is_case_insensitive() {
    let courier = FakeCourier::start().await;
    let cities = catalog(&courier);

    let city = cities.resolve("GUAYAQUIL").await.unwrap();
    assert_eq!(city.codigo, "170");
    assert_eq!(city.numeric_code(), Some(170));
}

#[tokio::test]
async fn test_numeric_codes_are_accepted() {
    let courier = FakeCourier::start().await;
    let cities = catalog(&courier);

    let city = cities.resolve("cuenca").await.unwrap();
    assert_eq!(city.codigo, "301");
}

#[tokio::test]
async fn test_empty_catalog_loads_on_first_lookup_only() {
    let courier = FakeCourier::start().await;
    let cities = catalog(&courier);

    assert!(cities.resolve("Quito").await.is_some());
    assert!(cities.resolve("Atlantis").await.is_none());
    assert!(cities.resolve("Guayaquil").await.is_some());

    assert_eq!(courier.catalog_calls(), 1);
}

#[tokio::test]
async fn test_populated_catalog_is_not_refreshed() {
    let courier = FakeCourier::start().await;
    let cities = catalog(&courier);
    cities.refresh().await.unwrap();

    // New cities are not picked up until the next explicit refresh
    courier.set_catalog(vec![json!({"nombre": "Loja", "codigo": "1101"})]);
    assert!(cities.resolve("Loja").await.is_none());
    assert_eq!(courier.catalog_calls(), 1);

    cities.refresh().await.unwrap();
    assert!(cities.resolve("Loja").await.is_some());
    assert!(cities.resolve("Quito").await.is_none());
}

#[tokio::test]
async fn test_failed_refresh_keeps_previous_catalog() {
    let courier = FakeCourier::start().await;
    let cities = catalog(&courier);
    cities.refresh().await.unwrap();

    let broken = CityCatalog::with_entries(
        LaarClient::with_http_client(reqwest::Client::new(), "http://127.0.0.1:9"),
        cities.entries().await.to_vec(),
    );
    assert!(broken.refresh().await.is_err());
    assert_eq!(broken.len().await, 3);
    assert!(broken.resolve("Quito").await.is_some());
}
