//! Principal entity: the authenticated subject a session is issued to.
//!
//! Principals are owned by the user directory; the session core receives
//! them by value and never mutates them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Primary role of a principal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Manager,
    Student,
}

impl Role {
    /// Wire form used in token claims and the database
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Manager => "MANAGER",
            Role::Student => "STUDENT",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Role::Admin),
            "MANAGER" => Ok(Role::Manager),
            "STUDENT" => Ok(Role::Student),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// Authenticated subject of a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Stable identifier assigned by the user directory
    pub id: String,

    /// Primary role
    pub role: Role,

    /// Email address, for credential-login accounts
    pub email: Option<String>,

    /// Telegram chat id, for accounts registered through the bot
    pub telegram_chat_id: Option<i64>,

    /// Whether an administrator approved the account
    pub is_approved: bool,
}

impl Principal {
    /// Creates an approved principal identified by email
    pub fn with_email(id: impl Into<String>, role: Role, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role,
            email: Some(email.into()),
            telegram_chat_id: None,
            is_approved: true,
        }
    }

    /// Creates an approved principal identified by Telegram chat id
    pub fn with_telegram(id: impl Into<String>, role: Role, chat_id: i64) -> Self {
        Self {
            id: id.into(),
            role,
            email: None,
            telegram_chat_id: Some(chat_id),
            is_approved: true,
        }
    }

    /// Subject string carried in tokens: the email if present, else the chat id
    pub fn subject(&self) -> Option<String> {
        self.email
            .clone()
            .or_else(|| self.telegram_chat_id.map(|id| id.to_string()))
    }
}
