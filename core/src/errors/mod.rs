//! Domain-specific error types and error handling.

mod types;

pub use types::{AuthError, TokenError};

use thiserror::Error;

/// Core domain errors (general purpose)
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Unauthorized access")]
    Unauthorized,

    #[error("Internal error: {message}")]
    Internal { message: String },

    // Bridge to specific error types
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Token(#[from] TokenError),
}

impl DomainError {
    /// Whether the boundary layer should answer with a 401-class response
    pub fn is_unauthorized(&self) -> bool {
        match self {
            DomainError::Unauthorized | DomainError::NotFound { .. } => true,
            DomainError::Token(TokenError::InvalidToken | TokenError::Expired) => true,
            DomainError::Auth(AuthError::VerificationError { .. }) => false,
            DomainError::Auth(_) => true,
            _ => false,
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
