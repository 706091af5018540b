//! Core types for Laar Relay.
//!
//! This module provides type-safe wrappers for the Shopify and Laarcourier
//! domain concepts.

pub mod city;
pub mod id;
pub mod order;
pub mod shipment;
pub mod status;
pub mod weight;

mod lenient;

pub use city::CityEntry;
pub use id::*;
pub use order::{
    Customer, LABEL_ATTRIBUTE, LineItem, NoteAttribute, OrderPayload, ShippingAddress,
    ShippingLine,
};
pub use shipment::{Destination, Origin, ShipmentRequest, ShipmentResult};
pub use status::*;
pub use weight::Grams;
