//! Sending encrypted push messages to a subscription's endpoint.
//!
//! The [`Client`] wires the two pipelines together: encrypt the payload into
//! the request body ([`crate::ece`]), build the header set including the
//! VAPID `Authorization` header ([`crate::vapid`]), and hand both to the
//! transport. The transport is an injection seam so tests (and callers with
//! their own HTTP stack) never touch the network; status codes are passed
//! through uninterpreted.

// Rust guideline compliant 2026-02

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::ece;
use crate::error::WebPushError;
use crate::urgency::Urgency;
use crate::vapid;

/// Base64-encoded key material from `PushSubscription.getKey()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Keys {
    /// Shared auth secret (16 bytes decoded).
    pub auth: String,
    /// Subscriber's P-256 ECDH public key (65 bytes decoded).
    pub p256dh: String,
}

/// A `PushSubscription` object from the browser Push API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    /// Push service endpoint URL.
    pub endpoint: String,
    /// Subscriber key material.
    pub keys: Keys,
}

/// Configuration and per-message parameters for a send.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Record size limit; `None` or `Some(0)` uses the 4096-byte default.
    pub record_size: Option<u32>,
    /// `sub` claim identity for the VAPID JWT (e-mail or `https:` URL).
    pub subscriber: String,
    /// `Topic` header, collapsing pending messages (optional).
    pub topic: Option<String>,
    /// `TTL` header on the endpoint POST, in seconds.
    pub ttl: u32,
    /// `Urgency` header (optional; omitted when unset).
    pub urgency: Option<Urgency>,
    /// VAPID public key, passed in the `Authorization` header.
    pub vapid_public_key: String,
    /// VAPID private key, used to sign the VAPID JWT.
    pub vapid_private_key: String,
    /// VAPID JWT expiry (defaults to now + 12 hours).
    pub vapid_expiration: Option<DateTime<Utc>>,
}

/// HTTP seam for delivering the finished request.
///
/// Implementations POST raw bytes with the supplied headers and report the
/// response status; the core never interprets it.
#[async_trait]
pub trait PushTransport: Send + Sync {
    /// POST `body` to `endpoint` with `headers`, returning the HTTP status.
    async fn post(
        &self,
        endpoint: &str,
        body: Vec<u8>,
        headers: &[(String, String)],
    ) -> Result<u16, WebPushError>;
}

/// Default transport over a pooled [`reqwest::Client`].
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    /// Wrap an existing [`reqwest::Client`] so callers can share a pool.
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl PushTransport for ReqwestTransport {
    async fn post(
        &self,
        endpoint: &str,
        body: Vec<u8>,
        headers: &[(String, String)],
    ) -> Result<u16, WebPushError> {
        let mut request = self.http.post(endpoint).body(body);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request.send().await?;
        Ok(response.status().as_u16())
    }
}

/// Web push client: encrypts, signs, and delivers notifications.
#[derive(Debug, Default)]
pub struct Client<T = ReqwestTransport> {
    transport: T,
}

impl Client<ReqwestTransport> {
    /// Client with the default reqwest transport.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T: PushTransport> Client<T> {
    /// Client over a caller-supplied transport.
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    /// Encrypt `message` for the subscription, build the VAPID-signed header
    /// set, and POST the record to the subscription's endpoint.
    ///
    /// Returns the push service's HTTP status uninterpreted. Every
    /// intermediate secret (ephemeral key, salt, key schedule) is scoped to
    /// this call; nothing is cached and nothing is retried.
    pub async fn send_notification(
        &self,
        message: &[u8],
        subscription: &Subscription,
        options: &Options,
    ) -> Result<u16, WebPushError> {
        let body = ece::encrypt(
            message,
            &subscription.keys.p256dh,
            &subscription.keys.auth,
            options.record_size,
        )?;

        let headers = notification_headers(&subscription.endpoint, body.len(), options)?;

        log::debug!(
            "[WebPush] POST {} ({} byte record)",
            subscription.endpoint,
            body.len()
        );
        self.transport
            .post(&subscription.endpoint, body, &headers)
            .await
    }
}

/// The fixed header set plus the conditional `Topic`/`Urgency` headers.
fn notification_headers(
    endpoint: &str,
    content_length: usize,
    options: &Options,
) -> Result<Vec<(String, String)>, WebPushError> {
    let mut headers = vec![
        ("Content-Encoding".to_owned(), "aes128gcm".to_owned()),
        ("Content-Length".to_owned(), content_length.to_string()),
        (
            "Content-Type".to_owned(),
            "application/octet-stream".to_owned(),
        ),
        ("TTL".to_owned(), options.ttl.to_string()),
    ];

    let expiration = options
        .vapid_expiration
        .unwrap_or_else(|| Utc::now() + Duration::hours(12));
    let authorization = vapid::vapid_authorization_header(
        endpoint,
        &options.subscriber,
        &options.vapid_public_key,
        &options.vapid_private_key,
        expiration,
    )?;
    headers.push(("Authorization".to_owned(), authorization));

    if let Some(topic) = options.topic.as_deref() {
        if !topic.is_empty() {
            headers.push(("Topic".to_owned(), topic.to_owned()));
        }
    }

    if let Some(urgency) = options.urgency {
        headers.push(("Urgency".to_owned(), urgency.as_str().to_owned()));
    }

    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_options() -> Options {
        let (private_key, public_key) = vapid::generate_vapid_keys();
        Options {
            subscriber: "gopher@noreply.com".to_owned(),
            vapid_public_key: public_key,
            vapid_private_key: private_key,
            ..Options::default()
        }
    }

    fn header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
        headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_fixed_headers_always_present() {
        let headers =
            notification_headers("https://push.example.com/send/abc", 3070, &test_options())
                .expect("headers");

        assert_eq!(header(&headers, "Content-Encoding"), Some("aes128gcm"));
        assert_eq!(header(&headers, "Content-Length"), Some("3070"));
        assert_eq!(
            header(&headers, "Content-Type"),
            Some("application/octet-stream")
        );
        assert_eq!(header(&headers, "TTL"), Some("0"));
        assert!(header(&headers, "Authorization")
            .expect("authorization")
            .starts_with("vapid t="));
    }

    #[test]
    fn test_topic_and_urgency_are_conditional() {
        let mut options = test_options();
        let headers =
            notification_headers("https://push.example.com/s", 100, &options).expect("headers");
        assert_eq!(header(&headers, "Topic"), None);
        assert_eq!(header(&headers, "Urgency"), None);

        options.topic = Some("test_topic".to_owned());
        options.urgency = Urgency::parse("low");
        let headers =
            notification_headers("https://push.example.com/s", 100, &options).expect("headers");
        assert_eq!(header(&headers, "Topic"), Some("test_topic"));
        assert_eq!(header(&headers, "Urgency"), Some("low"));
    }

    #[test]
    fn test_empty_topic_omitted() {
        let mut options = test_options();
        options.topic = Some(String::new());
        let headers =
            notification_headers("https://push.example.com/s", 100, &options).expect("headers");
        assert_eq!(header(&headers, "Topic"), None);
    }

    #[test]
    fn test_unrecognized_urgency_string_never_reaches_headers() {
        // Soft validation: the parse step rejects it, so the Options value
        // stays unset and the header is omitted.
        let mut options = test_options();
        options.urgency = Urgency::parse("pamonha");
        assert_eq!(options.urgency, None);

        let headers =
            notification_headers("https://push.example.com/s", 100, &options).expect("headers");
        assert_eq!(header(&headers, "Urgency"), None);
    }

    #[test]
    fn test_subscription_parses_push_api_json() {
        let json = r#"{
            "endpoint": "https://updates.push.services.mozilla.com/wpush/v2/gAAAAA",
            "keys": {
                "p256dh": "BNNL5ZaTfK81qhXOx23-wewhigUeFb632jN6LvRWCFH1ubQr77FE_9qV1FuojuRmHP42zmf34rXgW80OvUVDgTk",
                "auth": "zqbxT6JKstKSY9JKibZLSQ"
            }
        }"#;

        let subscription: Subscription = serde_json::from_str(json).expect("deserialize");
        assert!(subscription.endpoint.starts_with("https://updates.push"));
        assert_eq!(subscription.keys.auth, "zqbxT6JKstKSY9JKibZLSQ");
    }
}
