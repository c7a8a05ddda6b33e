//! Error types for token handling and authentication.
//!
//! Messages are plain English; the boundary layer decides what reaches the client.

use thiserror::Error;

/// Authentication-related errors
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Account not approved by an administrator yet")]
    AccountNotApproved,

    #[error("Invalid Telegram authentication data")]
    InvalidTelegramAssertion,

    #[error("Verification error: {message}")]
    VerificationError { message: String },
}

/// Token-related errors
#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    Expired,

    #[error("Token generation failed")]
    TokenGenerationFailed,
}
