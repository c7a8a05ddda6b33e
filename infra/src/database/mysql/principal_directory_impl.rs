//! MySQL implementation of the PrincipalDirectory trait.
//!
//! Reads the `users` table and resolves the primary role through
//! `users_roles`/`roles`. A user holding several roles is issued the most
//! privileged one.

use async_trait::async_trait;
use sqlx::{MySqlPool, Row};
use tracing::warn;

use eh_core::domain::entities::principal::{Principal, Role};
use eh_core::errors::DomainError;
use eh_core::repositories::PrincipalDirectory;

const SELECT_PRINCIPAL: &str = r#"
    SELECT u.id, u.email, u.telegram_chat_id, u.is_approved, r.role
    FROM users u
    LEFT JOIN users_roles ur ON ur.user_id = u.id
    LEFT JOIN roles r ON r.id = ur.role_id
"#;

const ORDER_BY_PRIVILEGE: &str =
    "ORDER BY r.role IS NULL, FIELD(r.role, 'ADMIN', 'MANAGER', 'STUDENT') LIMIT 1";

/// MySQL implementation of PrincipalDirectory
pub struct MySqlPrincipalDirectory {
    pool: MySqlPool,
}

impl MySqlPrincipalDirectory {
    /// Create a new MySQL principal directory
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_principal(row: &sqlx::mysql::MySqlRow) -> Result<Principal, DomainError> {
        let id: String = row
            .try_get("id")
            .map_err(|e| DomainError::Internal { message: format!("Failed to get id: {}", e) })?;

        let role: Option<String> = row
            .try_get("role")
            .map_err(|e| DomainError::Internal { message: format!("Failed to get role: {}", e) })?;

        let role = match role {
            Some(role) => role
                .parse::<Role>()
                .map_err(|message| DomainError::Internal { message })?,
            None => {
                warn!("User {} has no role assigned, defaulting to STUDENT", id);
                Role::Student
            }
        };

        Ok(Principal {
            role,
            email: row
                .try_get("email")
                .map_err(|e| DomainError::Internal { message: format!("Failed to get email: {}", e) })?,
            telegram_chat_id: row
                .try_get("telegram_chat_id")
                .map_err(|e| DomainError::Internal { message: format!("Failed to get telegram_chat_id: {}", e) })?,
            is_approved: row
                .try_get("is_approved")
                .map_err(|e| DomainError::Internal { message: format!("Failed to get is_approved: {}", e) })?,
            id,
        })
    }
}

#[async_trait]
impl PrincipalDirectory for MySqlPrincipalDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<Principal>, DomainError> {
        let query = format!("{} WHERE u.email = ? {}", SELECT_PRINCIPAL, ORDER_BY_PRIVILEGE);

        let result = sqlx::query(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::Internal { message: format!("Failed to find user by email: {}", e) })?;

        match result {
            Some(row) => Ok(Some(Self::row_to_principal(&row)?)),
            None => Ok(None),
        }
    }

    async fn find_by_telegram_id(&self, chat_id: i64) -> Result<Option<Principal>, DomainError> {
        let query = format!(
            "{} WHERE u.telegram_chat_id = ? {}",
            SELECT_PRINCIPAL, ORDER_BY_PRIVILEGE
        );

        let result = sqlx::query(&query)
            .bind(chat_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::Internal { message: format!("Failed to find user by chat id: {}", e) })?;

        match result {
            Some(row) => Ok(Some(Self::row_to_principal(&row)?)),
            None => Ok(None),
        }
    }
}
