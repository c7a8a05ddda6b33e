//! Shared configuration types for the EventHub server
//!
//! Every setting the session core needs (signing secret, token lifetimes,
//! Telegram bot token, sweep interval) is loaded here and passed into
//! constructors explicitly.

pub mod config;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, AuthConfig, ConfigError, DatabaseConfig, Environment, JwtConfig, LogFormat,
    LoggingConfig, SweeperConfig, TelegramConfig, MAX_TOKEN_LIFETIME_SECONDS,
};
