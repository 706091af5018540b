//! Order to shipment translation.
//!
//! [`transform`] turns a Shopify order into a courier [`ShipmentRequest`],
//! failing on missing data. [`validate`] then applies the business rules a
//! request must satisfy before submission.
//!
//! [`ShipmentRequest`]: laar_relay_core::ShipmentRequest

mod transform;
mod validate;

pub use transform::{CitySide, TransformError, transform};
pub use validate::validate;
