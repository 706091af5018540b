//! Shopify webhook signature verification.
//!
//! Shopify signs each delivery with base64(HMAC-SHA256(secret, body)) in the
//! `x-shopify-hmac-sha256` header. The signature covers the exact bytes on
//! the wire, so verification must run on the raw body before any parsing.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::digest::InvalidLength;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;

/// Header carrying the webhook signature.
pub const HMAC_HEADER: &str = "x-shopify-hmac-sha256";

type HmacSha256 = Hmac<Sha256>;

/// Compute the base64 signature Shopify would send for `raw_body`.
///
/// # Errors
///
/// Returns `InvalidLength` if the secret cannot key an HMAC.
pub fn sign(secret: &SecretString, raw_body: &[u8]) -> Result<String, InvalidLength> {
    let mac = mac_for(secret, raw_body)?;
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Verify a webhook signature against the raw request body.
///
/// A missing or undecodable signature is a failure. Never panics.
#[must_use]
pub fn verify(secret: &SecretString, raw_body: &[u8], provided_signature: Option<&str>) -> bool {
    let Some(provided) = provided_signature else {
        tracing::warn!("Webhook signature header missing");
        return false;
    };

    let Ok(provided) = STANDARD.decode(provided.trim()) else {
        tracing::warn!("Webhook signature is not valid base64");
        return false;
    };

    let Ok(mac) = mac_for(secret, raw_body) else {
        return false;
    };

    // verify_slice compares in constant time
    mac.verify_slice(&provided).is_ok()
}

fn mac_for(secret: &SecretString, raw_body: &[u8]) -> Result<HmacSha256, InvalidLength> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(secret.expose_secret().as_bytes())?;
    mac.update(raw_body);
    Ok(mac)
}
