//! Laar Relay Core - Shared types library.
//!
//! This crate provides the types exchanged between the components of Laar Relay:
//! - `relay` - Webhook server that turns Shopify orders into Laarcourier labels
//! - `cli` - Operator tools for catalog lookups, previews and signing test payloads
//!
//! # Architecture
//!
//! The core crate contains only types and pure conversions - no I/O, no HTTP
//! clients. Both the Shopify webhook payload and the Laarcourier wire schema
//! live here so they can be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Order payloads, shipment requests, city entries, weights and IDs

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
