//! Configuration for the token codec and session lifetimes

use eh_shared::{JwtConfig, MAX_TOKEN_LIFETIME_SECONDS};

use crate::errors::DomainError;

/// Token lifetimes used when minting a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenServiceConfig {
    /// Access token lifetime in seconds
    pub access_token_expiry_seconds: i64,
    /// Refresh token lifetime in seconds, always longer than the access lifetime
    pub refresh_token_expiry_seconds: i64,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self {
            access_token_expiry_seconds: 15 * 60,
            refresh_token_expiry_seconds: 7 * 24 * 60 * 60,
        }
    }
}

impl TokenServiceConfig {
    /// Builds lifetimes from the shared JWT configuration
    pub fn from_jwt_config(config: &JwtConfig) -> Result<Self, DomainError> {
        let config = Self {
            access_token_expiry_seconds: config.access_token_expiry,
            refresh_token_expiry_seconds: config.refresh_token_expiry,
        };
        config.validate()?;
        Ok(config)
    }

    /// Rejects lifetimes that would break refresh rotation
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.access_token_expiry_seconds < 0 {
            return Err(DomainError::Validation {
                message: "Access token expiry must not be negative".to_string(),
            });
        }
        if self.refresh_token_expiry_seconds <= self.access_token_expiry_seconds {
            return Err(DomainError::Validation {
                message: "Refresh token expiry must exceed access token expiry".to_string(),
            });
        }
        if self.refresh_token_expiry_seconds > MAX_TOKEN_LIFETIME_SECONDS {
            return Err(DomainError::Validation {
                message: format!(
                    "Refresh token expiry must not exceed {} seconds",
                    MAX_TOKEN_LIFETIME_SECONDS
                ),
            });
        }
        Ok(())
    }
}
