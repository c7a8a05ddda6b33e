//! Token entities for JWT-based sessions.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::principal::{Principal, Role};

/// Claims structure for JWT payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (email, or Telegram chat id as a string)
    pub sub: String,

    /// Primary role of the principal
    pub role: Role,

    /// Principal identifier
    #[serde(rename = "principalId")]
    pub principal_id: String,

    /// Telegram chat id rendered as a string, if the principal has one
    #[serde(rename = "externalChatId")]
    pub external_chat_id: Option<String>,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// JWT ID (unique identifier for the token)
    pub jti: String,
}

impl Claims {
    /// Creates claims for a principal
    ///
    /// # Arguments
    ///
    /// * `principal` - The principal the token is issued to
    /// * `subject` - The principal's subject string
    /// * `ttl_seconds` - Lifetime of the token
    /// * `now` - Issuance instant
    pub fn new(principal: &Principal, subject: String, ttl_seconds: i64, now: DateTime<Utc>) -> Self {
        let issued_at = now.timestamp();

        Self {
            sub: subject,
            role: principal.role,
            principal_id: principal.id.clone(),
            external_chat_id: principal.telegram_chat_id.map(|id| id.to_string()),
            iat: issued_at,
            exp: issued_at.saturating_add(ttl_seconds),
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// Checks if the claims have expired at `now`
    ///
    /// The expiry instant itself counts as expired.
    pub fn is_expired_at(&self, now: i64) -> bool {
        now >= self.exp
    }

    /// Checks if the claims have expired
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now().timestamp())
    }
}

/// One issued access/refresh pair as persisted in the token store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionToken {
    /// Unique identifier for the row
    pub id: Uuid,

    /// Access token value, unique across the store
    pub access_token: String,

    /// Refresh token value, unique across the store
    pub refresh_token: String,

    /// Principal this session belongs to
    pub principal_id: String,

    /// Whether the session has been revoked
    pub is_revoked: bool,

    /// Expiry of the access token
    pub expires_at: DateTime<Utc>,
}

impl SessionToken {
    /// Creates a new, unrevoked session row
    pub fn new(
        principal_id: impl Into<String>,
        access_token: String,
        refresh_token: String,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            access_token,
            refresh_token,
            principal_id: principal_id.into(),
            is_revoked: false,
            expires_at,
        }
    }

    /// Checks if the session has expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// A session is live while it is neither revoked nor expired
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_revoked && !self.is_expired_at(now)
    }

    /// Checks liveness against the current time
    pub fn is_live(&self) -> bool {
        self.is_live_at(Utc::now())
    }

    /// Revokes the session
    pub fn revoke(&mut self) {
        self.is_revoked = true;
    }

    /// Gets the time remaining until expiration, or zero if expired
    pub fn time_until_expiration(&self) -> Duration {
        let now = Utc::now();
        if self.expires_at > now {
            self.expires_at - now
        } else {
            Duration::zero()
        }
    }
}

/// Token pair returned to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// JWT access token
    pub access_token: String,

    /// JWT refresh token
    pub refresh_token: String,

    /// Access token lifetime in seconds
    pub access_expires_in: i64,

    /// Refresh token lifetime in seconds
    pub refresh_expires_in: i64,
}

impl TokenPair {
    /// Creates a new token pair
    pub fn new(
        access_token: String,
        refresh_token: String,
        access_expires_in: i64,
        refresh_expires_in: i64,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            access_expires_in,
            refresh_expires_in,
        }
    }
}
