//! Message encryption for web push (RFC 8291, `aes128gcm`).
//!
//! The whole pipeline is a pure function of its inputs: decode subscriber
//! keys, agree on a shared secret with a fresh ephemeral P-256 key, run the
//! three-step HKDF schedule, pad-and-seal with AES-128-GCM, and frame the
//! record. Nothing is cached or reused across calls; the ephemeral secret,
//! salt, and every derived key are dropped when the call returns, which is
//! what guarantees salt/key uniqueness per message.
//!
//! # Wire Format
//!
//! ```text
//! salt(16) | record-size(4, big-endian) | keylen(1) | ephemeral-pubkey(65) | ciphertext
//! ```
//!
//! The ciphertext is `plaintext | 0x02 | zero padding` sealed under the
//! content-encryption key, with the 16-byte GCM tag appended.

// Rust guideline compliant 2026-02

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes128Gcm, Nonce,
};
use hkdf::Hkdf;
use p256::ecdh::EphemeralSecret;
use p256::elliptic_curve::rand_core::{OsRng, RngCore};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use sha2::Sha256;

use crate::encoding::decode_subscription_key;
use crate::error::WebPushError;

/// Default (and maximum sensible) record size in bytes.
pub const MAX_RECORD_SIZE: u32 = 4096;

/// Salt length fixed by the `aes128gcm` content coding.
const SALT_LEN: usize = 16;

/// Uncompressed P-256 point: `0x04 || x || y`.
const PUBLIC_KEY_LEN: usize = 65;

/// Delimiter marking the last (here: only) record. The multi-record `0x01`
/// variant is an intentionally unimplemented extension; this module only
/// ever emits single-record bodies.
const LAST_RECORD_DELIMITER: u8 = 0x02;

const PRK_INFO_PREFIX: &[u8] = b"WebPush: info\0";
const CEK_INFO: &[u8] = b"Content-Encoding: aes128gcm\0";
const NONCE_INFO: &[u8] = b"Content-Encoding: nonce\0";

/// Encrypt `message` for a subscriber, producing the complete request body.
///
/// `p256dh` and `auth` are the base64 key fields from the push subscription
/// (either alphabet, padded or not). `record_size` of `None` (or `Some(0)`)
/// uses the 4096-byte default.
pub fn encrypt(
    message: &[u8],
    p256dh: &str,
    auth: &str,
    record_size: Option<u32>,
) -> Result<Vec<u8>, WebPushError> {
    let auth_secret = decode_subscription_key(auth)?;
    let subscriber_pub = decode_subscription_key(p256dh)?;

    let salt = generate_salt();
    let (shared_secret, local_pub) = derive_shared_secret(&subscriber_pub)?;
    let (cek, nonce) = derive_key_schedule(
        shared_secret.raw_secret_bytes().as_slice(),
        &auth_secret,
        &salt,
        &subscriber_pub,
        &local_pub,
    )?;

    let record_size = match record_size {
        Some(0) | None => MAX_RECORD_SIZE,
        Some(rs) => rs,
    };

    // Budget check comes before any sealing: the record must hold the header
    // plus at least the delimiter byte.
    let record_length =
        (record_size as usize)
            .checked_sub(SALT_LEN)
            .ok_or(WebPushError::PayloadTooLarge {
                size: message.len() + 1,
                max: 0,
            })?;
    let header_length = SALT_LEN + 4 + 1 + local_pub.len();
    let budget = record_length
        .checked_sub(header_length)
        .ok_or(WebPushError::PayloadTooLarge {
            size: message.len() + 1,
            max: 0,
        })?;

    let padded = pad(message, budget)?;

    let cipher = Aes128Gcm::new_from_slice(&cek).map_err(|_| WebPushError::KeyDerivation)?;
    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), padded.as_slice())
        .map_err(|_| WebPushError::KeyDerivation)?;

    let mut record = Vec::with_capacity(header_length + ciphertext.len());
    record.extend_from_slice(&salt);
    record.extend_from_slice(&record_size.to_be_bytes());
    record.push(local_pub.len() as u8);
    record.extend_from_slice(&local_pub);
    record.extend_from_slice(&ciphertext);

    Ok(record)
}

/// 16 random bytes from the OS RNG, fresh per call.
fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    OsRng.fill_bytes(&mut salt);
    salt
}

/// ECDH with a fresh ephemeral key pair.
///
/// Returns the shared secret and the local public key as an uncompressed
/// SEC1 point. The ephemeral private key never leaves this function.
fn derive_shared_secret(
    subscriber_pub: &[u8],
) -> Result<(p256::ecdh::SharedSecret, Vec<u8>), WebPushError> {
    let subscriber_key = p256::PublicKey::from_sec1_bytes(subscriber_pub)
        .map_err(|_| WebPushError::InvalidPublicKey)?;

    let local_secret = EphemeralSecret::random(&mut OsRng);
    let local_pub = p256::PublicKey::from(&local_secret)
        .to_encoded_point(false)
        .as_bytes()
        .to_vec();

    let shared_secret = local_secret.diffie_hellman(&subscriber_key);
    Ok((shared_secret, local_pub))
}

/// The three-step HKDF-SHA256 cascade: shared secret → PRK → (CEK, nonce).
fn derive_key_schedule(
    shared_secret: &[u8],
    auth_secret: &[u8],
    salt: &[u8; SALT_LEN],
    subscriber_pub: &[u8],
    local_pub: &[u8],
) -> Result<([u8; 16], [u8; 12]), WebPushError> {
    let mut prk_info = Vec::with_capacity(PRK_INFO_PREFIX.len() + PUBLIC_KEY_LEN * 2);
    prk_info.extend_from_slice(PRK_INFO_PREFIX);
    prk_info.extend_from_slice(subscriber_pub);
    prk_info.extend_from_slice(local_pub);

    let mut prk = [0u8; 32];
    hkdf_sha256(auth_secret, shared_secret, &prk_info, &mut prk)?;

    let mut cek = [0u8; 16];
    hkdf_sha256(salt, &prk, CEK_INFO, &mut cek)?;

    let mut nonce = [0u8; 12];
    hkdf_sha256(salt, &prk, NONCE_INFO, &mut nonce)?;

    Ok((cek, nonce))
}

fn hkdf_sha256(salt: &[u8], ikm: &[u8], info: &[u8], okm: &mut [u8]) -> Result<(), WebPushError> {
    Hkdf::<Sha256>::new(Some(salt), ikm)
        .expand(info, okm)
        .map_err(|_| WebPushError::KeyDerivation)
}

/// Append the last-record delimiter, then zero-pad to exactly `budget` bytes.
fn pad(message: &[u8], budget: usize) -> Result<Vec<u8>, WebPushError> {
    let size = message.len() + 1;
    if size > budget {
        return Err(WebPushError::PayloadTooLarge { size, max: budget });
    }

    let mut padded = vec![0u8; budget];
    padded[..message.len()].copy_from_slice(message);
    padded[message.len()] = LAST_RECORD_DELIMITER;
    Ok(padded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::b64url_nopad;

    /// A subscriber as the browser would create one: fresh P-256 key pair
    /// plus a 16-byte auth secret, with the base64url fields a subscription
    /// would carry.
    struct TestSubscriber {
        secret: p256::SecretKey,
        auth_secret: [u8; 16],
        p256dh: String,
        auth: String,
    }

    impl TestSubscriber {
        fn generate() -> Self {
            let secret = p256::SecretKey::random(&mut OsRng);
            let public = secret.public_key().to_encoded_point(false);
            let mut auth_secret = [0u8; 16];
            OsRng.fill_bytes(&mut auth_secret);
            Self {
                p256dh: b64url_nopad(public.as_bytes()),
                auth: b64url_nopad(&auth_secret),
                secret,
                auth_secret,
            }
        }

        /// Reverse the pipeline with the subscriber's private key: parse the
        /// record, rerun the key schedule from the other side, open the AEAD,
        /// and strip the padding.
        fn decrypt(&self, record: &[u8]) -> Vec<u8> {
            let salt: [u8; 16] = record[..16].try_into().expect("salt");
            let keylen = record[20] as usize;
            assert_eq!(keylen, PUBLIC_KEY_LEN);
            let local_pub = &record[21..21 + keylen];
            let ciphertext = &record[21 + keylen..];

            let sender_key =
                p256::PublicKey::from_sec1_bytes(local_pub).expect("sender public key");
            let shared = p256::ecdh::diffie_hellman(
                self.secret.to_nonzero_scalar(),
                sender_key.as_affine(),
            );

            let subscriber_pub = self.secret.public_key().to_encoded_point(false);
            let (cek, nonce) = derive_key_schedule(
                shared.raw_secret_bytes().as_slice(),
                &self.auth_secret,
                &salt,
                subscriber_pub.as_bytes(),
                local_pub,
            )
            .expect("key schedule");

            let cipher = Aes128Gcm::new_from_slice(&cek).expect("cek");
            let padded = cipher
                .decrypt(Nonce::from_slice(&nonce), ciphertext)
                .expect("AEAD open");

            // plaintext | 0x02 | zero padding
            let delim = padded
                .iter()
                .rposition(|&b| b != 0)
                .expect("delimiter present");
            assert_eq!(padded[delim], LAST_RECORD_DELIMITER);
            padded[..delim].to_vec()
        }
    }

    #[test]
    fn test_record_framing() {
        let sub = TestSubscriber::generate();
        let record = encrypt(b"Test", &sub.p256dh, &sub.auth, Some(3070)).expect("encrypt");

        assert_eq!(&record[16..20], &3070u32.to_be_bytes());
        assert_eq!(record[20], 65);
        // header (86) + padded plaintext (3070 - 16 - 86) + GCM tag (16)
        assert_eq!(record.len(), 3070);
    }

    #[test]
    fn test_roundtrip_at_default_record_size() {
        let sub = TestSubscriber::generate();
        let message = b"{\"title\":\"hello\",\"body\":\"world\"}";

        let record = encrypt(message, &sub.p256dh, &sub.auth, None).expect("encrypt");
        assert_eq!(&record[16..20], &MAX_RECORD_SIZE.to_be_bytes());
        assert_eq!(sub.decrypt(&record), message);
    }

    #[test]
    fn test_roundtrip_empty_payload() {
        let sub = TestSubscriber::generate();
        let record = encrypt(b"", &sub.p256dh, &sub.auth, None).expect("encrypt");
        assert!(sub.decrypt(&record).is_empty());
    }

    #[test]
    fn test_roundtrip_at_exact_budget() {
        let sub = TestSubscriber::generate();
        // record_length 184, header 86 → budget 98, so 97 plaintext bytes fit.
        let message = vec![0xAB; 97];
        let record = encrypt(&message, &sub.p256dh, &sub.auth, Some(200)).expect("encrypt");
        assert_eq!(sub.decrypt(&record), message);
    }

    #[test]
    fn test_payload_one_past_budget_fails() {
        let sub = TestSubscriber::generate();
        let message = vec![0xAB; 98];
        let err = encrypt(&message, &sub.p256dh, &sub.auth, Some(200)).expect_err("over budget");
        assert!(matches!(
            err,
            WebPushError::PayloadTooLarge { size: 99, max: 98 }
        ));
    }

    #[test]
    fn test_record_size_below_header_fails_before_sealing() {
        let sub = TestSubscriber::generate();
        let err = encrypt(b"x", &sub.p256dh, &sub.auth, Some(64)).expect_err("no room for header");
        assert!(matches!(err, WebPushError::PayloadTooLarge { .. }));
    }

    #[test]
    fn test_invalid_subscriber_point_rejected() {
        let sub = TestSubscriber::generate();
        // 65 bytes of the right shape but not a curve point.
        let bogus = b64url_nopad(&[0x04; 65]);
        let err = encrypt(b"Test", &bogus, &sub.auth, None).expect_err("not on curve");
        assert!(matches!(err, WebPushError::InvalidPublicKey));
    }

    #[test]
    fn test_salt_and_ephemeral_key_fresh_per_call() {
        let sub = TestSubscriber::generate();
        let a = encrypt(b"Test", &sub.p256dh, &sub.auth, None).expect("first");
        let b = encrypt(b"Test", &sub.p256dh, &sub.auth, None).expect("second");
        assert_ne!(&a[..16], &b[..16], "salt must never repeat");
        assert_ne!(&a[21..86], &b[21..86], "ephemeral key must never repeat");
    }
}
