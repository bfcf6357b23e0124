//! Mailgun webhook signature verification.
//!
//! Mailgun signs inbound route deliveries with HMAC-SHA256 over
//! `timestamp + token`, hex-encoded in the `signature` field.
//! Reference: https://documentation.mailgun.com/docs/mailgun/user-manual/events/webhooks/#securing-webhooks

use std::time::{SystemTime, UNIX_EPOCH};

use hmac::{Hmac, Mac};
use sha2::Sha256;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Reasons a signed delivery is refused.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SignatureError {
    #[error("missing signature fields")]
    MissingFields,

    #[error("timestamp is not a unix epoch: {0}")]
    InvalidTimestamp(String),

    #[error("timestamp is {age_seconds}s old, limit is {max_age_seconds}s")]
    Stale { age_seconds: u64, max_age_seconds: u64 },

    #[error("signature is not valid hex")]
    InvalidEncoding,

    #[error("signing key rejected by HMAC")]
    InvalidKey,

    #[error("signature mismatch")]
    Mismatch,
}

/// Verifies deliveries against the account's webhook signing key.
#[derive(Clone)]
pub struct SignatureVerifier {
    signing_key: String,
    max_age_seconds: u64,
}

impl SignatureVerifier {
    /// Build a verifier, or `None` when no usable key is configured.
    pub fn from_key(signing_key: Option<&str>, max_age_seconds: u64) -> Option<Self> {
        let key = signing_key?.trim();
        if key.is_empty() {
            return None;
        }
        Some(Self {
            signing_key: key.to_string(),
            max_age_seconds,
        })
    }

    /// Check a delivery's timestamp, token and signature against the current time.
    pub fn verify(&self, timestamp: &str, token: &str, signature: &str) -> Result<(), SignatureError> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        self.verify_at(timestamp, token, signature, now)
    }

    fn verify_at(
        &self,
        timestamp: &str,
        token: &str,
        signature: &str,
        now: u64,
    ) -> Result<(), SignatureError> {
        if timestamp.is_empty() || token.is_empty() || signature.is_empty() {
            return Err(SignatureError::MissingFields);
        }

        let sent_at: u64 = timestamp
            .parse()
            .map_err(|_| SignatureError::InvalidTimestamp(timestamp.to_string()))?;

        // Replay window, either direction
        let age_seconds = now.abs_diff(sent_at);
        if age_seconds > self.max_age_seconds {
            return Err(SignatureError::Stale {
                age_seconds,
                max_age_seconds: self.max_age_seconds,
            });
        }

        let provided = hex::decode(signature).map_err(|_| SignatureError::InvalidEncoding)?;

        let mut mac = HmacSha256::new_from_slice(self.signing_key.as_bytes())
            .map_err(|_| SignatureError::InvalidKey)?;
        mac.update(timestamp.as_bytes());
        mac.update(token.as_bytes());

        // verify_slice compares in constant time
        mac.verify_slice(&provided)
            .map_err(|_| SignatureError::Mismatch)
    }
}
