//! Encoding and decoding of signed session tokens

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, Header, Validation};
use tracing::{debug, error};

use crate::domain::entities::principal::Principal;
use crate::domain::entities::token::Claims;
use crate::errors::{DomainError, TokenError};

use super::key_manager::SigningKeyProvider;

/// Mints and parses HS256 tokens
///
/// Decoding checks the signature, the structure and the expiry only. Whether
/// the token is still live is a store question answered by the session manager.
#[derive(Debug, Clone)]
pub struct TokenCodec {
    keys: SigningKeyProvider,
    validation: Validation,
}

impl TokenCodec {
    /// Creates a codec over the given signing keys
    pub fn new(keys: SigningKeyProvider) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is compared by hand: the boundary second counts as expired
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat", "sub"]);

        Self { keys, validation }
    }

    /// Encodes a token for a principal valid for `ttl_seconds` from now
    pub fn encode(&self, principal: &Principal, ttl_seconds: i64) -> Result<String, DomainError> {
        self.mint(principal, ttl_seconds, Utc::now())
            .map(|(token, _)| token)
    }

    /// Encodes a token issued at `now`, returning it with its claims
    pub fn mint(
        &self,
        principal: &Principal,
        ttl_seconds: i64,
        now: DateTime<Utc>,
    ) -> Result<(String, Claims), DomainError> {
        let subject = principal.subject().ok_or_else(|| DomainError::Validation {
            message: format!("Principal {} has neither email nor chat id", principal.id),
        })?;

        let claims = Claims::new(principal, subject, ttl_seconds, now);
        let token = self.encode_claims(&claims)?;
        Ok((token, claims))
    }

    /// Signs an arbitrary set of claims
    pub fn encode_claims(&self, claims: &Claims) -> Result<String, DomainError> {
        let header = Header::new(Algorithm::HS256);
        encode(&header, claims, self.keys.encoding_key()).map_err(|e| {
            error!("Failed to sign token: {}", e);
            DomainError::Token(TokenError::TokenGenerationFailed)
        })
    }

    /// Decodes and verifies a token against the current time
    ///
    /// # Returns
    ///
    /// * `Ok(Claims)` - Signature verified and not expired
    /// * `Err(TokenError::InvalidToken)` - Malformed, unsigned or signature mismatch
    /// * `Err(TokenError::Expired)` - Valid signature but `now >= exp`
    pub fn decode(&self, token: &str) -> Result<Claims, DomainError> {
        self.decode_at(token, Utc::now().timestamp())
    }

    /// Decodes and verifies a token against `now` (seconds since epoch)
    pub fn decode_at(&self, token: &str, now: i64) -> Result<Claims, DomainError> {
        if token.trim().is_empty() {
            return Err(TokenError::InvalidToken.into());
        }

        let token_data = decode::<Claims>(token, self.keys.decoding_key(), &self.validation)
            .map_err(|e| {
                debug!("Token rejected: {}", e);
                DomainError::Token(TokenError::InvalidToken)
            })?;

        if token_data.claims.is_expired_at(now) {
            return Err(TokenError::Expired.into());
        }

        Ok(token_data.claims)
    }
}
