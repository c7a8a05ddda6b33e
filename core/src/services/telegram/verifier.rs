//! Verification of Telegram login widget assertions
//!
//! The check follows Telegram's published algorithm bit for bit:
//! HMAC-SHA256 over the sorted `key=value` lines of every field except
//! `hash`, keyed with SHA-256 of the bot token, compared as lowercase hex.

use std::collections::BTreeMap;

use chrono::Utc;
use constant_time_eq::constant_time_eq;
use eh_shared::TelegramConfig;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::domain::entities::telegram::TelegramAssertion;
use crate::errors::{AuthError, DomainError};

type HmacSha256 = Hmac<Sha256>;

/// Validates login assertions against the shared bot token
pub struct TelegramAssertionVerifier {
    secret_key: [u8; 32],
    max_auth_age_seconds: i64,
}

impl std::fmt::Debug for TelegramAssertionVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramAssertionVerifier")
            .field("max_auth_age_seconds", &self.max_auth_age_seconds)
            .finish_non_exhaustive()
    }
}

impl TelegramAssertionVerifier {
    /// Creates a verifier from the bot configuration
    ///
    /// Fails with `VerificationError` when the bot token is empty.
    pub fn new(config: &TelegramConfig) -> Result<Self, DomainError> {
        if config.bot_token.trim().is_empty() {
            return Err(AuthError::VerificationError {
                message: "Telegram bot token is not configured".to_string(),
            }
            .into());
        }

        Ok(Self {
            secret_key: Sha256::digest(config.bot_token.as_bytes()).into(),
            max_auth_age_seconds: config.max_auth_age,
        })
    }

    /// Verifies an assertion against the current time
    pub fn verify(&self, assertion: &TelegramAssertion) -> Result<bool, DomainError> {
        self.verify_at(assertion, Utc::now().timestamp())
    }

    /// Verifies an assertion against `now` (seconds since epoch)
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - Fresh and correctly signed
    /// * `Ok(false)` - Too old, or the signature does not match
    /// * `Err(AuthError::VerificationError)` - The HMAC could not be set up
    pub fn verify_at(&self, assertion: &TelegramAssertion, now: i64) -> Result<bool, DomainError> {
        // An age that does not fit in i64 is stale
        let stale = now
            .checked_sub(assertion.auth_date)
            .map_or(true, |age| age > self.max_auth_age_seconds);

        if stale {
            warn!(
                "Telegram assertion for {} is older than {} seconds",
                assertion.id, self.max_auth_age_seconds
            );
            return Ok(false);
        }

        let expected = self.sign(&data_check_string(assertion))?;
        let matches = constant_time_eq(expected.as_bytes(), assertion.hash.as_bytes());

        if !matches {
            warn!("Telegram assertion for {} has an invalid hash", assertion.id);
        }
        Ok(matches)
    }

    /// Lowercase hex HMAC-SHA256 of `payload`
    pub fn sign(&self, payload: &str) -> Result<String, DomainError> {
        let mut mac = HmacSha256::new_from_slice(&self.secret_key).map_err(|e| {
            AuthError::VerificationError {
                message: format!("Failed to initialise HMAC: {}", e),
            }
        })?;
        mac.update(payload.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

/// Canonical payload Telegram signs
///
/// `last_name` and `username` take part only when present and non-empty.
pub fn data_check_string(assertion: &TelegramAssertion) -> String {
    let mut fields = BTreeMap::new();
    fields.insert("auth_date", assertion.auth_date.to_string());
    fields.insert("first_name", assertion.first_name.clone());
    fields.insert("id", assertion.id.to_string());

    if let Some(last_name) = assertion.last_name.as_ref().filter(|v| !v.is_empty()) {
        fields.insert("last_name", last_name.clone());
    }
    if let Some(username) = assertion.username.as_ref().filter(|v| !v.is_empty()) {
        fields.insert("username", username.clone());
    }

    fields
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join("\n")
}
