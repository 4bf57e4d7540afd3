//! VAPID sender authentication for web push (RFC 8292).
//!
//! Builds the `Authorization: vapid t=<jwt>, k=<key>` header a push service
//! uses to verify the sender: the JWT claims `{aud, exp, sub}` are signed
//! with ES256 using a P-256 key pair the application server holds long-term.
//!
//! The signing key is reconstructed from the raw 32-byte scalar every call;
//! reconstruction is a pure conversion with explicit length/format checks so
//! it stays unit-testable apart from the JWT formatting.

// Rust guideline compliant 2026-02

use chrono::{DateTime, Utc};
use p256::ecdsa::signature::Signer;
use p256::ecdsa::{Signature, SigningKey};
use p256::elliptic_curve::rand_core::OsRng;
use p256::elliptic_curve::sec1::ToEncodedPoint;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::encoding::{b64url_nopad, decode_subscription_key};
use crate::error::WebPushError;

/// VAPID key pair for web push authentication.
///
/// The private key is the raw 32-byte P-256 scalar and the public key the
/// uncompressed SEC1 point (65 bytes), both base64url-unpadded. This is the
/// interchange format browsers (`applicationServerKey`) and push services
/// expect, so it is also the storage format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VapidKeys {
    /// Raw 32-byte P-256 private key scalar (base64url, 43 chars).
    private_key_b64: String,
    /// Uncompressed public key bytes (base64url, 87 chars, 65 bytes decoded).
    public_key_b64: String,
}

impl VapidKeys {
    /// Generate a fresh VAPID key pair.
    pub fn generate() -> Self {
        let signing_key = SigningKey::random(&mut OsRng);
        let public_point = signing_key.verifying_key().to_encoded_point(false);

        Self {
            private_key_b64: b64url_nopad(signing_key.to_bytes().as_slice()),
            public_key_b64: b64url_nopad(public_point.as_bytes()),
        }
    }

    /// Reconstruct a key pair from its base64url-encoded halves, validating
    /// both the public point format and the private scalar.
    pub fn from_base64url(
        public_key_b64: &str,
        private_key_b64: &str,
    ) -> Result<Self, WebPushError> {
        let pub_bytes = decode_subscription_key(public_key_b64)?;
        if pub_bytes.len() != 65 || pub_bytes[0] != 0x04 {
            return Err(WebPushError::InvalidKeyFormat);
        }

        let priv_bytes = decode_subscription_key(private_key_b64)?;
        signing_key_from_raw(&priv_bytes)?;

        Ok(Self {
            private_key_b64: private_key_b64.to_owned(),
            public_key_b64: public_key_b64.to_owned(),
        })
    }

    /// Base64url-encoded uncompressed public key (65 bytes decoded).
    ///
    /// This is what browsers receive as the `applicationServerKey`.
    pub fn public_key_base64url(&self) -> &str {
        &self.public_key_b64
    }

    /// Base64url-encoded raw 32-byte private key scalar.
    pub fn private_key_base64url(&self) -> &str {
        &self.private_key_b64
    }
}

/// Generate a VAPID key pair as `(private, public)` base64url strings.
pub fn generate_vapid_keys() -> (String, String) {
    let keys = VapidKeys::generate();
    (keys.private_key_b64, keys.public_key_b64)
}

/// JWT claims signed into the VAPID token.
#[derive(Debug, Serialize)]
struct Claims<'a> {
    aud: &'a str,
    exp: i64,
    sub: &'a str,
}

#[derive(Debug, Serialize)]
struct JwtHeader {
    typ: &'static str,
    alg: &'static str,
}

/// Build the `Authorization` header value for a push endpoint.
///
/// `subscriber` is normalized to a `mailto:` URI unless it is already an
/// `https:` URL. The audience is the endpoint's `scheme://host[:port]`.
pub fn vapid_authorization_header(
    endpoint: &str,
    subscriber: &str,
    vapid_public_key: &str,
    vapid_private_key: &str,
    expiration: DateTime<Utc>,
) -> Result<String, WebPushError> {
    let aud = push_service_audience(endpoint)?;

    let sub = if subscriber.starts_with("https:") {
        subscriber.to_owned()
    } else {
        format!("mailto:{subscriber}")
    };

    let claims = Claims {
        aud: &aud,
        exp: expiration.timestamp(),
        sub: &sub,
    };

    let private_bytes = decode_subscription_key(vapid_private_key)?;
    let signing_key = signing_key_from_raw(&private_bytes)?;
    let jwt = sign_jwt(&signing_key, &claims)?;

    let public_bytes = decode_subscription_key(vapid_public_key)?;
    Ok(format!("vapid t={jwt}, k={}", b64url_nopad(&public_bytes)))
}

/// Extract `scheme://host[:port]` from a push endpoint URL.
pub fn push_service_audience(endpoint: &str) -> Result<String, WebPushError> {
    let url = Url::parse(endpoint)?;
    let host = url
        .host_str()
        .ok_or(WebPushError::InvalidEndpoint(url::ParseError::EmptyHost))?;

    Ok(match url.port() {
        Some(port) => format!("{}://{}:{}", url.scheme(), host, port),
        None => format!("{}://{}", url.scheme(), host),
    })
}

/// Reconstruct an ECDSA signing key from a raw ECDH scalar.
///
/// Validates the scalar length, that it is a valid non-zero P-256 scalar,
/// and that the derived public key is a 65-byte uncompressed point.
fn signing_key_from_raw(private_key: &[u8]) -> Result<SigningKey, WebPushError> {
    if private_key.len() != 32 {
        return Err(WebPushError::InvalidKeyFormat);
    }

    let signing_key =
        SigningKey::from_bytes(private_key.into()).map_err(|_| WebPushError::InvalidKeyFormat)?;

    let public_point = signing_key.verifying_key().to_encoded_point(false);
    let public_bytes = public_point.as_bytes();
    if public_bytes.len() != 65 || public_bytes[0] != 0x04 {
        return Err(WebPushError::InvalidKeyFormat);
    }

    Ok(signing_key)
}

/// ES256-sign the claims into a compact JWT (`header.claims.signature`,
/// each segment base64url-unpadded).
fn sign_jwt(signing_key: &SigningKey, claims: &Claims<'_>) -> Result<String, WebPushError> {
    let header = JwtHeader {
        typ: "JWT",
        alg: "ES256",
    };

    let header_json = serde_json::to_string(&header).map_err(|_| WebPushError::Signing)?;
    let claims_json = serde_json::to_string(claims).map_err(|_| WebPushError::Signing)?;
    let signing_input = format!(
        "{}.{}",
        b64url_nopad(header_json.as_bytes()),
        b64url_nopad(claims_json.as_bytes())
    );

    let signature: Signature = signing_key
        .try_sign(signing_input.as_bytes())
        .map_err(|_| WebPushError::Signing)?;

    Ok(format!(
        "{signing_input}.{}",
        b64url_nopad(signature.to_bytes().as_slice())
    ))
}
