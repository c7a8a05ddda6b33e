//! Session manager: issuance, refresh, revocation and liveness of token pairs

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{TimeZone, Utc};
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info, warn};

use crate::domain::entities::principal::Principal;
use crate::domain::entities::telegram::TelegramAssertion;
use crate::domain::entities::token::{Claims, SessionToken, TokenPair};
use crate::errors::{AuthError, DomainError, DomainResult, TokenError};
use crate::repositories::{PrincipalDirectory, TokenRepository};
use crate::services::telegram::TelegramAssertionVerifier;
use crate::services::token::{TokenCodec, TokenServiceConfig};

/// Orchestrates the session lifecycle over the token store
///
/// At most one session per principal is live once an `issue` settles:
/// issuing revokes every earlier row of the principal before inserting the
/// new one. Revoke-then-insert runs under a per-principal lock, so concurrent
/// logins or refreshes of one principal inside this process are serialized.
pub struct SessionManager<R: TokenRepository, D: PrincipalDirectory> {
    repository: R,
    directory: D,
    codec: TokenCodec,
    telegram: TelegramAssertionVerifier,
    config: TokenServiceConfig,
    principal_locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl<R: TokenRepository, D: PrincipalDirectory> SessionManager<R, D> {
    /// Creates a new session manager
    ///
    /// # Arguments
    ///
    /// * `repository` - Token store
    /// * `directory` - Principal lookup
    /// * `codec` - Token codec holding the signing keys
    /// * `telegram` - Verifier for Telegram login assertions
    /// * `config` - Access and refresh lifetimes
    pub fn new(
        repository: R,
        directory: D,
        codec: TokenCodec,
        telegram: TelegramAssertionVerifier,
        config: TokenServiceConfig,
    ) -> Result<Self, DomainError> {
        config.validate()?;

        Ok(Self {
            repository,
            directory,
            codec,
            telegram,
            config,
            principal_locks: Mutex::new(HashMap::new()),
        })
    }

    /// The token codec used by this manager
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Issues a fresh access/refresh pair, revoking every earlier session
    ///
    /// This is the only path that both revokes and re-issues; login and
    /// refresh both end here.
    pub async fn issue(&self, principal: &Principal) -> DomainResult<TokenPair> {
        let lock = self.principal_lock(&principal.id);
        let result = {
            let _guard = lock.lock().await;
            self.rotate(principal).await
        };
        drop(lock);
        self.release_principal_lock(&principal.id);

        result
    }

    /// Exchanges a refresh token for a new pair
    ///
    /// # Returns
    ///
    /// * `Ok(TokenPair)` - The rotated pair; the presented refresh token is now revoked
    /// * `Err(TokenError::InvalidToken)` - Bad signature, or no live row holds this token
    /// * `Err(TokenError::Expired)` - The refresh token is past its expiry
    /// * `Err(DomainError::NotFound)` - The subject no longer resolves to a principal
    pub async fn refresh(&self, refresh_token: &str) -> DomainResult<TokenPair> {
        let claims = self.codec.decode(refresh_token)?;

        let principal = self
            .directory
            .find_by_subject(&claims.sub)
            .await?
            .ok_or_else(|| DomainError::NotFound {
                resource: format!("principal {}", claims.sub),
            })?;

        let lock = self.principal_lock(&principal.id);
        let result = {
            let _guard = lock.lock().await;
            self.refresh_locked(&principal, refresh_token).await
        };
        drop(lock);
        self.release_principal_lock(&principal.id);

        result
    }

    /// Revokes the session holding `access_token`; unknown tokens are a no-op
    pub async fn revoke_one(&self, access_token: &str) -> DomainResult<()> {
        if self.repository.revoke_by_access_token(access_token).await? {
            info!("Revoked session for token {}...", token_prefix(access_token));
        } else {
            debug!(
                "No live session to revoke for token {}...",
                token_prefix(access_token)
            );
        }
        Ok(())
    }

    /// Revokes every live session of a principal, returning how many were revoked
    pub async fn revoke_all(&self, principal_id: &str) -> DomainResult<usize> {
        let revoked = self.repository.revoke_all_for_principal(principal_id).await?;
        info!("Revoked {} sessions for principal {}", revoked, principal_id);
        Ok(revoked)
    }

    /// Revokes the session named by an `Authorization` header
    ///
    /// Missing or non-bearer headers are ignored.
    pub async fn logout(&self, authorization: Option<&str>) -> DomainResult<()> {
        match authorization.and_then(bearer_token) {
            Some(token) => self.revoke_one(token).await,
            None => Ok(()),
        }
    }

    /// Checks whether an access token may authorize a request for `expected_subject`
    ///
    /// True only when the signature verifies, the token is unexpired, its
    /// subject matches, and the store holds an unrevoked, unexpired row for it.
    /// The store is read on every call.
    pub async fn is_live(&self, access_token: &str, expected_subject: &str) -> DomainResult<bool> {
        let claims = match self.codec.decode(access_token) {
            Ok(claims) => claims,
            Err(DomainError::Token(e)) => {
                debug!("Access token failed verification: {}", e);
                return Ok(false);
            }
            Err(e) => return Err(e),
        };

        if claims.sub != expected_subject {
            warn!(
                "Access token subject does not match the expected principal {}",
                expected_subject
            );
            return Ok(false);
        }

        self.repository
            .is_access_token_live(access_token, Utc::now())
            .await
    }

    /// Decodes an access token and confirms it is live
    ///
    /// # Returns
    ///
    /// * `Ok(Claims)` - The token authorizes its own subject
    /// * `Err(TokenError)` - Invalid or expired token
    /// * `Err(DomainError::Unauthorized)` - Revoked, superseded or purged session
    pub async fn authenticate(&self, access_token: &str) -> DomainResult<Claims> {
        let claims = self.codec.decode(access_token)?;

        if self.is_live(access_token, &claims.sub).await? {
            Ok(claims)
        } else {
            Err(DomainError::Unauthorized)
        }
    }

    /// Verifies a Telegram login assertion
    pub fn verify_telegram_assertion(&self, assertion: &TelegramAssertion) -> DomainResult<bool> {
        self.telegram.verify(assertion)
    }

    /// Logs a principal in with a Telegram login assertion
    ///
    /// # Returns
    ///
    /// * `Ok(TokenPair)` - Verified, known and approved principal
    /// * `Err(AuthError::InvalidTelegramAssertion)` - Stale or forged assertion
    /// * `Err(DomainError::NotFound)` - No principal registered for the chat id
    /// * `Err(AuthError::AccountNotApproved)` - Principal awaiting approval
    pub async fn login_with_telegram(&self, assertion: &TelegramAssertion) -> DomainResult<TokenPair> {
        if !self.verify_telegram_assertion(assertion)? {
            return Err(AuthError::InvalidTelegramAssertion.into());
        }

        let principal = self
            .directory
            .find_by_telegram_id(assertion.id)
            .await?
            .ok_or_else(|| DomainError::NotFound {
                resource: format!("principal with chat id {}", assertion.id),
            })?;

        if !principal.is_approved {
            warn!("Telegram login refused for unapproved principal {}", principal.id);
            return Err(AuthError::AccountNotApproved.into());
        }

        self.issue(&principal).await
    }

    async fn refresh_locked(&self, principal: &Principal, refresh_token: &str) -> DomainResult<TokenPair> {
        let row = self.repository.find_by_refresh_token(refresh_token).await?;

        match row {
            Some(row) if !row.is_revoked && row.principal_id == principal.id => {
                self.rotate(principal).await
            }
            Some(_) => {
                warn!(
                    "Refresh token {}... is revoked or belongs to another principal",
                    token_prefix(refresh_token)
                );
                Err(TokenError::InvalidToken.into())
            }
            None => {
                warn!("Refresh token {}... is not in the store", token_prefix(refresh_token));
                Err(TokenError::InvalidToken.into())
            }
        }
    }

    /// Revoke-then-insert; callers hold the principal's lock
    async fn rotate(&self, principal: &Principal) -> DomainResult<TokenPair> {
        let revoked = self.repository.revoke_all_for_principal(&principal.id).await?;

        let now = Utc::now();
        let (access_token, access_claims) =
            self.codec
                .mint(principal, self.config.access_token_expiry_seconds, now)?;
        let (refresh_token, _) =
            self.codec
                .mint(principal, self.config.refresh_token_expiry_seconds, now)?;

        let expires_at = Utc
            .timestamp_opt(access_claims.exp, 0)
            .single()
            .ok_or_else(|| DomainError::Internal {
                message: "Invalid expiry timestamp".to_string(),
            })?;

        let row = SessionToken::new(
            principal.id.clone(),
            access_token.clone(),
            refresh_token.clone(),
            expires_at,
        );
        self.repository.save(row).await?;

        info!(
            "Issued session for principal {} ({} earlier sessions revoked)",
            principal.id, revoked
        );

        Ok(TokenPair::new(
            access_token,
            refresh_token,
            self.config.access_token_expiry_seconds,
            self.config.refresh_token_expiry_seconds,
        ))
    }

    fn principal_lock(&self, principal_id: &str) -> Arc<AsyncMutex<()>> {
        let mut locks = self
            .principal_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        locks.entry(principal_id.to_string()).or_default().clone()
    }

    fn release_principal_lock(&self, principal_id: &str) {
        let mut locks = self
            .principal_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if locks
            .get(principal_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(principal_id);
        }
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header value
pub fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

fn token_prefix(token: &str) -> &str {
    token.get(..12).unwrap_or(token)
}
