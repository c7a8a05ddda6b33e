//! Authentication and session configuration

use serde::{Deserialize, Serialize};

/// Base64url form of `development-secret-please-change-in-production`
pub const DEFAULT_JWT_SECRET: &str =
    "ZGV2ZWxvcG1lbnQtc2VjcmV0LXBsZWFzZS1jaGFuZ2UtaW4tcHJvZHVjdGlvbg";

/// Longest accepted token lifetime (ten years)
pub const MAX_TOKEN_LIFETIME_SECONDS: i64 = 10 * 365 * 24 * 60 * 60;

/// JWT signing configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// Base64url-encoded signing secret
    pub secret: String,

    /// Access token expiry time in seconds
    pub access_token_expiry: i64,

    /// Refresh token expiry time in seconds
    pub refresh_token_expiry: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::from(DEFAULT_JWT_SECRET),
            access_token_expiry: 900,     // 15 minutes
            refresh_token_expiry: 604800, // 7 days
        }
    }
}

impl JwtConfig {
    /// Create a new JWT configuration with secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Set access token expiry in minutes
    pub fn with_access_expiry_minutes(mut self, minutes: i64) -> Self {
        self.access_token_expiry = minutes * 60;
        self
    }

    /// Set refresh token expiry in days
    pub fn with_refresh_expiry_days(mut self, days: i64) -> Self {
        self.refresh_token_expiry = days * 86400;
        self
    }

    /// Check if using default secret (security warning)
    pub fn is_using_default_secret(&self) -> bool {
        self.secret == DEFAULT_JWT_SECRET
    }
}

/// Telegram login widget configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelegramConfig {
    /// Bot token shared with the login widget
    pub bot_token: String,

    /// Maximum age of a login assertion in seconds
    #[serde(default = "default_max_auth_age")]
    pub max_auth_age: i64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            max_auth_age: default_max_auth_age(),
        }
    }
}

/// Expired token sweep configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SweeperConfig {
    /// How often to run the sweep (in seconds)
    pub interval_seconds: u64,

    /// Whether the background sweep runs at all
    #[serde(default = "default_sweeper_enabled")]
    pub enabled: bool,
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 3600,
            enabled: default_sweeper_enabled(),
        }
    }
}

/// Complete authentication configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    /// JWT configuration
    pub jwt: JwtConfig,

    /// Telegram login configuration
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Expired token sweep configuration
    #[serde(default)]
    pub sweeper: SweeperConfig,
}

impl AuthConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            jwt: JwtConfig {
                secret: std::env::var("JWT_SECRET").unwrap_or(defaults.jwt.secret),
                access_token_expiry: env_or("JWT_ACCESS_TOKEN_EXPIRY", defaults.jwt.access_token_expiry),
                refresh_token_expiry: env_or("JWT_REFRESH_TOKEN_EXPIRY", defaults.jwt.refresh_token_expiry),
            },
            telegram: TelegramConfig {
                bot_token: std::env::var("TELEGRAM_BOT_TOKEN").unwrap_or_default(),
                max_auth_age: env_or("TELEGRAM_MAX_AUTH_AGE", defaults.telegram.max_auth_age),
            },
            sweeper: SweeperConfig {
                interval_seconds: env_or("TOKEN_SWEEP_INTERVAL", defaults.sweeper.interval_seconds),
                enabled: env_or("TOKEN_SWEEP_ENABLED", defaults.sweeper.enabled),
            },
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

fn default_max_auth_age() -> i64 {
    86400 // 24 hours
}

fn default_sweeper_enabled() -> bool {
    true
}
