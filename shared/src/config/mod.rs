//! Configuration module with business-specific sub-modules
//!
//! - `auth` - Token signing, Telegram login and sweep configuration
//! - `database` - Database connection and pool configuration
//! - `environment` - Environment detection and logging configuration

pub mod auth;
pub mod database;
pub mod environment;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use auth::{AuthConfig, JwtConfig, SweeperConfig, TelegramConfig, MAX_TOKEN_LIFETIME_SECONDS};
pub use database::DatabaseConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};

/// Configuration that cannot be used to start the service
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid configuration value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("Missing required configuration: {field}")]
    Missing { field: &'static str },
}

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Authentication configuration
    pub auth: AuthConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment
    ///
    /// The environment-specific dotenv file is read first, then `.env`;
    /// variables already present in the process environment win.
    pub fn from_env() -> Self {
        let env = Environment::from_env();
        dotenvy::from_filename(env.env_file()).ok();
        dotenvy::dotenv().ok();

        Self {
            environment: env,
            database: DatabaseConfig::from_env(),
            auth: AuthConfig::from_env(),
            logging: LoggingConfig::from_env(env),
        }
    }

    /// Check settings that would otherwise fail on the first request
    pub fn validate(&self) -> Result<(), ConfigError> {
        let jwt = &self.auth.jwt;

        if jwt.secret.trim().is_empty() {
            return Err(ConfigError::Missing { field: "JWT_SECRET" });
        }
        if self.environment.is_production() && jwt.is_using_default_secret() {
            return Err(ConfigError::Invalid {
                field: "JWT_SECRET",
                reason: "the development default cannot be used in production".to_string(),
            });
        }
        if jwt.access_token_expiry < 0 {
            return Err(ConfigError::Invalid {
                field: "JWT_ACCESS_TOKEN_EXPIRY",
                reason: "must not be negative".to_string(),
            });
        }
        if jwt.refresh_token_expiry <= jwt.access_token_expiry {
            return Err(ConfigError::Invalid {
                field: "JWT_REFRESH_TOKEN_EXPIRY",
                reason: format!(
                    "must exceed the access token expiry ({}s)",
                    jwt.access_token_expiry
                ),
            });
        }
        if jwt.refresh_token_expiry > MAX_TOKEN_LIFETIME_SECONDS {
            return Err(ConfigError::Invalid {
                field: "JWT_REFRESH_TOKEN_EXPIRY",
                reason: format!("must not exceed {}s", MAX_TOKEN_LIFETIME_SECONDS),
            });
        }
        if self.auth.telegram.bot_token.trim().is_empty() {
            return Err(ConfigError::Missing { field: "TELEGRAM_BOT_TOKEN" });
        }
        if self.auth.telegram.max_auth_age <= 0 {
            return Err(ConfigError::Invalid {
                field: "TELEGRAM_MAX_AUTH_AGE",
                reason: "must be positive".to_string(),
            });
        }
        if self.auth.sweeper.interval_seconds == 0 {
            return Err(ConfigError::Invalid {
                field: "TOKEN_SWEEP_INTERVAL",
                reason: "must be at least one second".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> AppConfig {
        let mut config = AppConfig::default();
        config.auth.telegram.bot_token = "123456:ABC".to_string();
        config
    }

    #[test]
    fn test_valid_config_passes() {
        assert_eq!(valid_config().validate(), Ok(()));
    }

    #[test]
    fn test_default_secret_rejected_in_production() {
        let mut config = valid_config();
        config.environment = Environment::Production;

        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "JWT_SECRET", .. })
        ));
    }

    #[test]
    fn test_refresh_must_outlive_access() {
        let mut config = valid_config();
        config.auth.jwt.refresh_token_expiry = config.auth.jwt.access_token_expiry;

        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "JWT_REFRESH_TOKEN_EXPIRY", .. })
        ));
    }

    #[test]
    fn test_unbounded_refresh_expiry_rejected() {
        let mut config = valid_config();
        config.auth.jwt.refresh_token_expiry = i64::MAX;

        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "JWT_REFRESH_TOKEN_EXPIRY", .. })
        ));

        config.auth.jwt.refresh_token_expiry = MAX_TOKEN_LIFETIME_SECONDS;
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_missing_bot_token_rejected() {
        let mut config = valid_config();
        config.auth.telegram.bot_token = "  ".to_string();

        assert_eq!(
            config.validate(),
            Err(ConfigError::Missing { field: "TELEGRAM_BOT_TOKEN" })
        );
    }

    #[test]
    fn test_zero_sweep_interval_rejected() {
        let mut config = valid_config();
        config.auth.sweeper.interval_seconds = 0;

        assert!(config.validate().is_err());
    }
}
