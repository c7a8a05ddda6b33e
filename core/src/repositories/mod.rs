//! Repository interfaces for the session store and the principal directory.

pub mod principal;
pub mod token;

pub use principal::PrincipalDirectory;
pub use token::{InMemoryTokenRepository, TokenRepository};
