//! Token module for signed session tokens
//!
//! This module handles:
//! - Symmetric signing keys derived from the configured secret
//! - Token encoding and verification (signature, structure, expiry)
//! - Token lifetimes
//! - Background sweeping of expired session rows

mod cleanup;
mod codec;
mod config;
mod key_manager;

#[cfg(test)]
mod tests;

pub use cleanup::{ExpiredTokenSweeper, SweepReport};
pub use codec::TokenCodec;
pub use config::TokenServiceConfig;
pub use key_manager::{SigningKeyProvider, MIN_SECRET_BYTES};
