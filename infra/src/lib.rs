//! # Infrastructure Layer
//!
//! This crate implements the infrastructure layer for the EventHub session
//! core. It provides the concrete storage behind the core's repository traits
//! and the process-level wiring around them.
//!
//! ## Architecture
//!
//! The infrastructure layer contains:
//! - **Database**: MySQL token store and principal directory using SQLx
//! - **Telemetry**: `tracing` subscriber set up from the logging configuration
//! - **Bootstrap**: configuration validation and session manager assembly
//!
//! ## Features
//!
//! - `mysql`: Enable MySQL database support (default)

// Re-export core types for convenience
pub use eh_core::errors::*;

/// Database module - MySQL implementations using SQLx
#[cfg(feature = "mysql")]
pub mod database;

/// Telemetry module - tracing subscriber initialisation
pub mod telemetry;

/// Bootstrap module - assembles the session services from configuration
#[cfg(feature = "mysql")]
pub mod bootstrap;

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error raised by the session core while wiring services
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// General infrastructure error
    #[error("Infrastructure error: {0}")]
    General(String),
}

impl From<eh_shared::ConfigError> for InfrastructureError {
    fn from(err: eh_shared::ConfigError) -> Self {
        InfrastructureError::Config(err.to_string())
    }
}
