//! Security utilities for WhatsApp webhook verification
//!
//! This module provides signature verification for incoming WhatsApp webhook requests
//! using the X-Hub-Signature-256 header. This ensures that requests actually originate
//! from Meta/Facebook and haven't been tampered with.
//!
//! # Security Background
//!
//! Meta signs all webhook payloads with HMAC-SHA256 using your app's secret key.
//! The signature is included in the `X-Hub-Signature-256` header with the format:
//! `sha256=<hex_signature>`
//!
//! # Important Notes
//!
//! - The signature MUST be computed on the raw request body bytes, not parsed JSON
//! - The comparison must be constant-time to prevent timing attacks
//! - Verification fails closed: any malformed header is a mismatch

use crate::consts;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

fn hmac_sha256(payload: &[u8], app_secret: &str) -> Option<Vec<u8>> {
    let mut mac = match HmacSha256::new_from_slice(app_secret.as_bytes()) {
        Ok(m) => m,
        Err(e) => {
            logfire::error!(
                "Failed to create HMAC instance: {error}",
                error = e.to_string()
            );
            return None;
        }
    };

    mac.update(payload);
    Some(mac.finalize().into_bytes().to_vec())
}

/// Verifies the X-Hub-Signature-256 header against the request payload
///
/// # Arguments
///
/// * `signature_header` - The value of the X-Hub-Signature-256 header (e.g., "sha256=abc123...").
///   A value without the `sha256=` prefix is taken as the hex digest itself.
/// * `payload` - The raw request body bytes
/// * `app_secret` - Your WhatsApp/Facebook app secret
///
/// # Returns
///
/// * `true` if the signature is valid
/// * `false` if the signature is invalid, empty or not valid hex
pub fn verify_signature(signature_header: &str, payload: &[u8], app_secret: &str) -> bool {
    let signature_hex = signature_header.trim();
    let signature_hex = signature_hex
        .strip_prefix(consts::SIGNATURE_PREFIX)
        .unwrap_or(signature_hex);

    if signature_hex.is_empty() {
        logfire::warn!("Missing webhook signature");
        return false;
    }

    let expected_signature = match hex::decode(signature_hex) {
        Ok(sig) => sig,
        Err(e) => {
            logfire::warn!(
                "Failed to decode signature hex: {error}",
                error = e.to_string()
            );
            return false;
        }
    };

    let Some(computed_signature) = hmac_sha256(payload, app_secret) else {
        return false;
    };

    // slices of different length compare as unequal
    let is_valid: bool = computed_signature[..].ct_eq(&expected_signature[..]).into();

    if !is_valid {
        logfire::warn!("Webhook signature verification failed: signatures do not match");
    }

    is_valid
}

/// Compares the `hub.verify_token` received during the subscription handshake
/// with the configured one, in constant time
pub fn verify_token_matches(received: &str, expected: &str) -> bool {
    received.as_bytes().ct_eq(expected.as_bytes()).into()
}

/// Computes the `sha256=<hex>` header value Meta would send for `payload`
pub fn compute_signature(payload: &[u8], app_secret: &str) -> String {
    let digest = hmac_sha256(payload, app_secret).unwrap_or_default();
    format!("{}{}", consts::SIGNATURE_PREFIX, hex::encode(digest))
}
