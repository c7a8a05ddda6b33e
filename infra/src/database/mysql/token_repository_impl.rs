//! MySQL implementation of the TokenRepository trait.
//!
//! Session rows live in the `tokens` table, one row per issued access/refresh
//! pair. Revocation flips `is_logged_out`; the sweep deletes by
//! `expiration_date`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use eh_core::domain::entities::token::SessionToken;
use eh_core::errors::DomainError;
use eh_core::repositories::TokenRepository;

const SELECT_COLUMNS: &str =
    "SELECT id, access_token, refresh_token, user_id, is_logged_out, expiration_date FROM tokens";

/// MySQL implementation of TokenRepository
pub struct MySqlTokenRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlTokenRepository {
    /// Create a new MySQL token repository
    ///
    /// # Arguments
    /// * `pool` - MySQL connection pool from SQLx
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to SessionToken entity
    fn row_to_token(row: &sqlx::mysql::MySqlRow) -> Result<SessionToken, DomainError> {
        let id: String = row
            .try_get("id")
            .map_err(|e| DomainError::Internal { message: format!("Failed to get id: {}", e) })?;

        Ok(SessionToken {
            id: Uuid::parse_str(&id)
                .map_err(|e| DomainError::Internal { message: format!("Invalid token UUID: {}", e) })?,
            access_token: row
                .try_get("access_token")
                .map_err(|e| DomainError::Internal { message: format!("Failed to get access_token: {}", e) })?,
            refresh_token: row
                .try_get("refresh_token")
                .map_err(|e| DomainError::Internal { message: format!("Failed to get refresh_token: {}", e) })?,
            principal_id: row
                .try_get("user_id")
                .map_err(|e| DomainError::Internal { message: format!("Failed to get user_id: {}", e) })?,
            is_revoked: row
                .try_get("is_logged_out")
                .map_err(|e| DomainError::Internal { message: format!("Failed to get is_logged_out: {}", e) })?,
            expires_at: row
                .try_get::<DateTime<Utc>, _>("expiration_date")
                .map_err(|e| DomainError::Internal { message: format!("Failed to get expiration_date: {}", e) })?,
        })
    }

    async fn find_one_by(&self, column: &str, value: &str) -> Result<Option<SessionToken>, DomainError> {
        let query = format!("{} WHERE {} = ? LIMIT 1", SELECT_COLUMNS, column);

        let result = sqlx::query(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::Internal { message: format!("Failed to find token by {}: {}", column, e) })?;

        match result {
            Some(row) => Ok(Some(Self::row_to_token(&row)?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl TokenRepository for MySqlTokenRepository {
    async fn save(&self, token: SessionToken) -> Result<SessionToken, DomainError> {
        let query = r#"
            INSERT INTO tokens (
                id, access_token, refresh_token, user_id, is_logged_out, expiration_date
            ) VALUES (?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(token.id.simple().to_string())
            .bind(&token.access_token)
            .bind(&token.refresh_token)
            .bind(&token.principal_id)
            .bind(token.is_revoked)
            .bind(token.expires_at)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_unique_violation() => DomainError::Validation {
                    message: "Token already exists".to_string(),
                },
                e => DomainError::Internal { message: format!("Failed to save token: {}", e) },
            })?;

        Ok(token)
    }

    async fn find_by_access_token(&self, access_token: &str) -> Result<Option<SessionToken>, DomainError> {
        self.find_one_by("access_token", access_token).await
    }

    async fn find_by_refresh_token(&self, refresh_token: &str) -> Result<Option<SessionToken>, DomainError> {
        self.find_one_by("refresh_token", refresh_token).await
    }

    async fn find_unrevoked_by_principal(&self, principal_id: &str) -> Result<Vec<SessionToken>, DomainError> {
        let query = format!(
            "{} WHERE user_id = ? AND is_logged_out = FALSE ORDER BY expiration_date DESC",
            SELECT_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(principal_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::Internal { message: format!("Failed to find principal tokens: {}", e) })?;

        rows.iter().map(Self::row_to_token).collect()
    }

    async fn revoke_by_access_token(&self, access_token: &str) -> Result<bool, DomainError> {
        let query = r#"
            UPDATE tokens
            SET is_logged_out = TRUE
            WHERE access_token = ? AND is_logged_out = FALSE
        "#;

        let result = sqlx::query(query)
            .bind(access_token)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Internal { message: format!("Failed to revoke token: {}", e) })?;

        Ok(result.rows_affected() > 0)
    }

    async fn revoke_all_for_principal(&self, principal_id: &str) -> Result<usize, DomainError> {
        let query = r#"
            UPDATE tokens
            SET is_logged_out = TRUE
            WHERE user_id = ? AND is_logged_out = FALSE
        "#;

        let result = sqlx::query(query)
            .bind(principal_id)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Internal { message: format!("Failed to revoke principal tokens: {}", e) })?;

        Ok(result.rows_affected() as usize)
    }

    async fn delete_expired_before(&self, cutoff: DateTime<Utc>) -> Result<usize, DomainError> {
        let result = sqlx::query("DELETE FROM tokens WHERE expiration_date < ?")
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Internal { message: format!("Failed to delete expired tokens: {}", e) })?;

        Ok(result.rows_affected() as usize)
    }

    async fn is_access_token_live(&self, access_token: &str, now: DateTime<Utc>) -> Result<bool, DomainError> {
        let query = r#"
            SELECT EXISTS(
                SELECT 1 FROM tokens
                WHERE access_token = ? AND is_logged_out = FALSE AND expiration_date > ?
            ) AS live
        "#;

        let row = sqlx::query(query)
            .bind(access_token)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::Internal { message: format!("Failed to check token liveness: {}", e) })?;

        let live: i64 = row
            .try_get("live")
            .map_err(|e| DomainError::Internal { message: format!("Failed to get liveness result: {}", e) })?;

        Ok(live == 1)
    }
}
