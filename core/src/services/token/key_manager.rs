//! Symmetric signing key management for HS256 tokens

use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::{alphabet, Engine as _};
use jsonwebtoken::{DecodingKey, EncodingKey};

use crate::errors::{AuthError, DomainError};

/// Smallest key HS256 accepts, in bytes
pub const MIN_SECRET_BYTES: usize = 32;

const URL_SAFE_ANY_PADDING: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Holds the signing secret as ready-to-use keys
#[derive(Clone)]
pub struct SigningKeyProvider {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for SigningKeyProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKeyProvider").finish_non_exhaustive()
    }
}

impl SigningKeyProvider {
    /// Creates a key provider from a base64url-encoded secret
    ///
    /// Padding is optional. Fails with `VerificationError` when the secret
    /// does not decode or is shorter than [`MIN_SECRET_BYTES`]; this is meant
    /// to run once at startup.
    ///
    /// # Example
    ///
    /// ```
    /// use eh_core::services::token::SigningKeyProvider;
    ///
    /// let keys = SigningKeyProvider::from_base64url(
    ///     "ZGV2ZWxvcG1lbnQtc2VjcmV0LXBsZWFzZS1jaGFuZ2UtaW4tcHJvZHVjdGlvbg",
    /// );
    /// assert!(keys.is_ok());
    /// ```
    pub fn from_base64url(secret: &str) -> Result<Self, DomainError> {
        let bytes = URL_SAFE_ANY_PADDING
            .decode(secret.trim())
            .map_err(|e| AuthError::VerificationError {
                message: format!("Signing secret is not valid base64url: {}", e),
            })?;

        Self::from_bytes(&bytes)
    }

    /// Creates a key provider from raw key material
    pub fn from_bytes(secret: &[u8]) -> Result<Self, DomainError> {
        if secret.len() < MIN_SECRET_BYTES {
            return Err(AuthError::VerificationError {
                message: format!(
                    "Signing secret is {} bytes, at least {} required",
                    secret.len(),
                    MIN_SECRET_BYTES
                ),
            }
            .into());
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        })
    }

    /// Key used to sign tokens
    pub fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    /// Key used to verify token signatures
    pub fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_padded_and_unpadded_secret() {
        // 33 bytes of 'k'
        let unpadded = "a2tra2tra2tra2tra2tra2tra2tra2tra2tra2tra2tr";
        assert!(SigningKeyProvider::from_base64url(unpadded).is_ok());

        // 34 bytes of 'k'
        let padded = "a2tra2tra2tra2tra2tra2tra2tra2tra2tra2tra2traw==";
        assert!(SigningKeyProvider::from_base64url(padded).is_ok());
    }

    #[test]
    fn test_rejects_short_secret() {
        let result = SigningKeyProvider::from_base64url("c2hvcnQ");
        assert!(matches!(
            result,
            Err(DomainError::Auth(AuthError::VerificationError { .. }))
        ));
    }

    #[test]
    fn test_rejects_non_base64_secret() {
        let result = SigningKeyProvider::from_base64url("not base64 at all!");
        assert!(matches!(
            result,
            Err(DomainError::Auth(AuthError::VerificationError { .. }))
        ));
    }

    #[test]
    fn test_debug_does_not_leak_key() {
        let keys = SigningKeyProvider::from_bytes(&[7u8; 32]).unwrap();
        assert_eq!(format!("{:?}", keys), "SigningKeyProvider { .. }");
    }
}
