//! Token store trait defining the interface for session token persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::token::SessionToken;
use crate::errors::DomainError;

/// Repository trait for persisted access/refresh token pairs
///
/// The store is the single mutable source of truth for session liveness:
/// every write must be atomic at the row level, and implementations must not
/// cache rows, so a revocation is visible to the next reader.
///
/// # Invariants
/// - `access_token` and `refresh_token` are each unique store-wide
/// - Rows are only ever mutated by setting `is_revoked`, or deleted by the sweep
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Save a new session row
    ///
    /// # Returns
    /// * `Ok(SessionToken)` - The saved row
    /// * `Err(DomainError)` - Save failed (e.g., duplicate token value)
    ///
    /// # Example
    /// ```no_run
    /// # use chrono::{Duration, Utc};
    /// # use eh_core::repositories::TokenRepository;
    /// # use eh_core::domain::entities::token::SessionToken;
    /// # async fn example(repo: &impl TokenRepository) -> Result<(), Box<dyn std::error::Error>> {
    /// let row = SessionToken::new(
    ///     "principal-id",
    ///     "access.jwt.value".to_string(),
    ///     "refresh.jwt.value".to_string(),
    ///     Utc::now() + Duration::minutes(15),
    /// );
    ///
    /// let saved = repo.save(row).await?;
    /// println!("Session saved with ID: {}", saved.id);
    /// # Ok(())
    /// # }
    /// ```
    async fn save(&self, token: SessionToken) -> Result<SessionToken, DomainError>;

    /// Find a session row by its access token value
    async fn find_by_access_token(&self, access_token: &str) -> Result<Option<SessionToken>, DomainError>;

    /// Find a session row by its refresh token value
    async fn find_by_refresh_token(&self, refresh_token: &str) -> Result<Option<SessionToken>, DomainError>;

    /// Find every non-revoked row owned by a principal, expired or not
    async fn find_unrevoked_by_principal(&self, principal_id: &str) -> Result<Vec<SessionToken>, DomainError>;

    /// Revoke the row matching an access token value
    ///
    /// # Returns
    /// * `Ok(true)` - A live row was revoked
    /// * `Ok(false)` - No row found, or it was already revoked
    /// * `Err(DomainError)` - Revocation failed
    async fn revoke_by_access_token(&self, access_token: &str) -> Result<bool, DomainError>;

    /// Revoke every non-revoked row owned by a principal
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of rows revoked
    /// * `Err(DomainError)` - Revocation failed
    async fn revoke_all_for_principal(&self, principal_id: &str) -> Result<usize, DomainError>;

    /// Delete every row whose `expires_at` is strictly before `cutoff`
    ///
    /// Revocation state is irrelevant: revoked rows survive until they expire.
    ///
    /// # Example
    /// ```no_run
    /// # use chrono::Utc;
    /// # use eh_core::repositories::TokenRepository;
    /// # async fn example(repo: &impl TokenRepository) -> Result<(), Box<dyn std::error::Error>> {
    /// let deleted = repo.delete_expired_before(Utc::now()).await?;
    /// println!("Purged {} expired sessions", deleted);
    /// # Ok(())
    /// # }
    /// ```
    async fn delete_expired_before(&self, cutoff: DateTime<Utc>) -> Result<usize, DomainError>;

    /// Check whether an access token has a live row at `now`
    async fn is_access_token_live(&self, access_token: &str, now: DateTime<Utc>) -> Result<bool, DomainError> {
        match self.find_by_access_token(access_token).await? {
            Some(token) => Ok(token.is_live_at(now)),
            None => Ok(false),
        }
    }

    /// Count non-revoked rows for a principal
    async fn count_unrevoked(&self, principal_id: &str) -> Result<usize, DomainError> {
        let tokens = self.find_unrevoked_by_principal(principal_id).await?;
        Ok(tokens.len())
    }
}

#[async_trait]
impl<R: TokenRepository + ?Sized> TokenRepository for std::sync::Arc<R> {
    async fn save(&self, token: SessionToken) -> Result<SessionToken, DomainError> {
        (**self).save(token).await
    }

    async fn find_by_access_token(&self, access_token: &str) -> Result<Option<SessionToken>, DomainError> {
        (**self).find_by_access_token(access_token).await
    }

    async fn find_by_refresh_token(&self, refresh_token: &str) -> Result<Option<SessionToken>, DomainError> {
        (**self).find_by_refresh_token(refresh_token).await
    }

    async fn find_unrevoked_by_principal(&self, principal_id: &str) -> Result<Vec<SessionToken>, DomainError> {
        (**self).find_unrevoked_by_principal(principal_id).await
    }

    async fn revoke_by_access_token(&self, access_token: &str) -> Result<bool, DomainError> {
        (**self).revoke_by_access_token(access_token).await
    }

    async fn revoke_all_for_principal(&self, principal_id: &str) -> Result<usize, DomainError> {
        (**self).revoke_all_for_principal(principal_id).await
    }

    async fn delete_expired_before(&self, cutoff: DateTime<Utc>) -> Result<usize, DomainError> {
        (**self).delete_expired_before(cutoff).await
    }
}
