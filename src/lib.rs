//! Web push message encryption and sender authentication.
//!
//! Implements the two cryptographic pipelines needed to deliver a push
//! notification end to end:
//!
//! - **Encryption** (RFC 8291, `aes128gcm`): ephemeral P-256 ECDH against the
//!   subscriber's `p256dh` key, an HKDF-SHA256 key schedule, AES-128-GCM, and
//!   the self-framed record the push service forwards verbatim.
//! - **VAPID** (RFC 8292): an ES256-signed JWT identifying the sender,
//!   formatted into the `Authorization: vapid t=..., k=...` header.
//!
//! Both pipelines are stateless pure functions of their inputs; every
//! ephemeral key, salt, and derived secret is scoped to a single call.
//! Delivery goes through the [`PushTransport`] seam (reqwest by default),
//! and the push service's status code is passed through uninterpreted.
//!
//! # Example
//!
//! ```no_run
//! use webpush::{Client, Keys, Options, Subscription};
//!
//! # async fn example() -> Result<(), webpush::WebPushError> {
//! let subscription = Subscription {
//!     endpoint: "https://updates.push.services.mozilla.com/wpush/v2/...".into(),
//!     keys: Keys {
//!         p256dh: "BNNL5ZaTfK81qhXOx23-wewh...".into(),
//!         auth: "zqbxT6JKstKSY9JKibZLSQ".into(),
//!     },
//! };
//!
//! let (private_key, public_key) = webpush::generate_vapid_keys();
//! let options = Options {
//!     subscriber: "admin@example.com".into(),
//!     vapid_public_key: public_key,
//!     vapid_private_key: private_key,
//!     ttl: 30,
//!     ..Options::default()
//! };
//!
//! let status = Client::new()
//!     .send_notification(b"{\"title\":\"hi\"}", &subscription, &options)
//!     .await?;
//! assert!(status < 400);
//! # Ok(())
//! # }
//! ```

// Rust guideline compliant 2026-02

pub mod client;
pub mod ece;
pub mod encoding;
pub mod error;
pub mod urgency;
pub mod vapid;

pub use client::{Client, Keys, Options, PushTransport, ReqwestTransport, Subscription};
pub use ece::{encrypt, MAX_RECORD_SIZE};
pub use encoding::decode_subscription_key;
pub use error::WebPushError;
pub use urgency::Urgency;
pub use vapid::{generate_vapid_keys, vapid_authorization_header, VapidKeys};
