//! # EventHub Core
//!
//! Session and token core for the EventHub backend.
//! This crate contains the principal and session entities, the token codec,
//! the session manager, repository interfaces and error types. Storage
//! back-ends live in `eh_infra`.

pub mod domain;
pub mod services;
pub mod repositories;
pub mod errors;

// Re-export commonly used types for convenience
pub use domain::*;
pub use services::*;
pub use repositories::*;
pub use errors::*;
