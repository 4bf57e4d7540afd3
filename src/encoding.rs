//! Dual-tolerance base64 decoding for subscription and VAPID key material.
//!
//! Browsers hand out `p256dh`/`auth` values in whichever base64 flavor the
//! Push API implementation felt like: standard or URL-safe alphabet, padded
//! or unpadded. A single decode function normalizes padding and tries both
//! canonical alphabets in a fixed order, so callers never branch on format.

// Rust guideline compliant 2026-02

use base64::{
    engine::general_purpose::{STANDARD, URL_SAFE, URL_SAFE_NO_PAD},
    Engine,
};

use crate::error::WebPushError;

/// Decode a base64 subscription key that may use either alphabet and may or
/// may not carry `=` padding.
///
/// The input is first padded to a multiple of 4 characters, then decoded with
/// the standard alphabet; on failure the URL-safe alphabet is tried. If both
/// fail, the URL-safe attempt's error is propagated.
pub fn decode_subscription_key(key: &str) -> Result<Vec<u8>, WebPushError> {
    let mut padded = key.to_owned();
    let rem = padded.len() % 4;
    if rem != 0 {
        padded.extend(std::iter::repeat('=').take(4 - rem));
    }

    match STANDARD.decode(&padded) {
        Ok(bytes) => Ok(bytes),
        Err(_) => URL_SAFE.decode(&padded).map_err(WebPushError::Decode),
    }
}

/// Encode bytes as unpadded base64url (the JWT / VAPID header alphabet).
pub(crate) fn b64url_nopad(data: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(data)
}
