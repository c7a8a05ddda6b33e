//! In-memory implementation of TokenRepository
//!
//! Backs tests and single-process deployments. Every operation takes the lock
//! for its whole duration, so each write is atomic per row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::token::SessionToken;
use crate::errors::DomainError;

use super::r#trait::TokenRepository;

/// Token store held in process memory
#[derive(Clone, Default)]
pub struct InMemoryTokenRepository {
    tokens: Arc<RwLock<HashMap<Uuid, SessionToken>>>,
}

impl InMemoryTokenRepository {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows currently stored, revoked or not
    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }

    /// Whether the store holds no rows
    pub async fn is_empty(&self) -> bool {
        self.tokens.read().await.is_empty()
    }
}

#[async_trait]
impl TokenRepository for InMemoryTokenRepository {
    async fn save(&self, token: SessionToken) -> Result<SessionToken, DomainError> {
        let mut tokens = self.tokens.write().await;

        let duplicate = tokens.values().any(|t| {
            t.id == token.id
                || t.access_token == token.access_token
                || t.refresh_token == token.refresh_token
        });
        if duplicate {
            return Err(DomainError::Validation {
                message: "Token already exists".to_string(),
            });
        }

        tokens.insert(token.id, token.clone());
        Ok(token)
    }

    async fn find_by_access_token(&self, access_token: &str) -> Result<Option<SessionToken>, DomainError> {
        let tokens = self.tokens.read().await;
        Ok(tokens.values().find(|t| t.access_token == access_token).cloned())
    }

    async fn find_by_refresh_token(&self, refresh_token: &str) -> Result<Option<SessionToken>, DomainError> {
        let tokens = self.tokens.read().await;
        Ok(tokens.values().find(|t| t.refresh_token == refresh_token).cloned())
    }

    async fn find_unrevoked_by_principal(&self, principal_id: &str) -> Result<Vec<SessionToken>, DomainError> {
        let tokens = self.tokens.read().await;
        Ok(tokens
            .values()
            .filter(|t| t.principal_id == principal_id && !t.is_revoked)
            .cloned()
            .collect())
    }

    async fn revoke_by_access_token(&self, access_token: &str) -> Result<bool, DomainError> {
        let mut tokens = self.tokens.write().await;

        match tokens
            .values_mut()
            .find(|t| t.access_token == access_token && !t.is_revoked)
        {
            Some(token) => {
                token.revoke();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn revoke_all_for_principal(&self, principal_id: &str) -> Result<usize, DomainError> {
        let mut tokens = self.tokens.write().await;
        let mut count = 0;

        for token in tokens.values_mut() {
            if token.principal_id == principal_id && !token.is_revoked {
                token.revoke();
                count += 1;
            }
        }

        Ok(count)
    }

    async fn delete_expired_before(&self, cutoff: DateTime<Utc>) -> Result<usize, DomainError> {
        let mut tokens = self.tokens.write().await;
        let initial_count = tokens.len();

        tokens.retain(|_, token| token.expires_at >= cutoff);

        Ok(initial_count - tokens.len())
    }
}
