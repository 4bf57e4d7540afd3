//! Error taxonomy for the web push pipelines.
//!
//! Every failure is propagated synchronously to the caller of the send
//! operation; nothing is retried internally and no partial record is ever
//! returned. The only soft-validated input is the `Urgency` header value,
//! which is silently omitted when unrecognized (see [`crate::Urgency`]).

// Rust guideline compliant 2026-02

use thiserror::Error;

/// Errors produced by payload encryption, VAPID signing, or the transport.
#[derive(Debug, Error)]
pub enum WebPushError {
    /// A subscription or VAPID key field was not valid base64 in either the
    /// standard or the URL-safe alphabet.
    #[error("malformed base64 input: {0}")]
    Decode(#[from] base64::DecodeError),

    /// The subscriber's `p256dh` bytes do not decode to a point on P-256.
    #[error("invalid subscriber public key")]
    InvalidPublicKey,

    /// The VAPID private key is not a valid 32-byte P-256 scalar, or the
    /// public key derived from it is not a 65-byte uncompressed point.
    #[error("invalid VAPID key format")]
    InvalidKeyFormat,

    /// HKDF produced fewer bytes than requested. This indicates a corrupted
    /// secret or zero-length input and never occurs with valid inputs.
    #[error("key derivation produced fewer bytes than requested")]
    KeyDerivation,

    /// The plaintext plus the record delimiter does not fit the record-size
    /// budget. Checked before any sealing is attempted.
    #[error("payload has exceeded the maximum length ({size} > {max})")]
    PayloadTooLarge {
        /// Plaintext length including the one-byte delimiter.
        size: usize,
        /// Padded-plaintext budget for the configured record size.
        max: usize,
    },

    /// The subscription endpoint could not be parsed as a URL.
    #[error("invalid push endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    /// ECDSA signature generation for the VAPID JWT failed.
    #[error("VAPID token signing failed")]
    Signing,

    /// The HTTP transport failed before a status code was obtained.
    #[error("push transport failed: {0}")]
    Transport(#[from] reqwest::Error),
}
