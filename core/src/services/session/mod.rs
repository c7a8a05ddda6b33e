//! Session module
//!
//! Issues, rotates and revokes access/refresh pairs over the token store, and
//! answers whether an access token may still authorize a request.

mod service;

#[cfg(test)]
mod tests;

pub use service::{bearer_token, SessionManager};
