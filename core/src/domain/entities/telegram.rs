//! Telegram login widget assertion.

use serde::{Deserialize, Serialize};

/// Login payload posted by the Telegram login widget
///
/// Ephemeral: verified once and discarded, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelegramAssertion {
    /// Telegram chat id
    pub id: i64,

    pub first_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Seconds since epoch at which Telegram authenticated the user
    pub auth_date: i64,

    /// Lowercase hex HMAC-SHA256 over the other fields
    pub hash: String,
}
