//! Principal directory trait: the user-directory lookups the session core relies on.
//!
//! The directory itself (accounts, roles, approval) belongs to the surrounding
//! application; the core only reads principals through this interface.

use async_trait::async_trait;

use crate::domain::entities::principal::Principal;
use crate::errors::DomainError;

/// Read-only lookup of principals
///
/// # Example Implementation
/// ```no_run
/// use async_trait::async_trait;
/// use eh_core::repositories::PrincipalDirectory;
/// use eh_core::domain::entities::principal::Principal;
/// use eh_core::errors::DomainError;
///
/// struct StaticDirectory {
///     principals: Vec<Principal>,
/// }
///
/// #[async_trait]
/// impl PrincipalDirectory for StaticDirectory {
///     async fn find_by_email(&self, email: &str) -> Result<Option<Principal>, DomainError> {
///         Ok(self.principals.iter().find(|p| p.email.as_deref() == Some(email)).cloned())
///     }
///
///     async fn find_by_telegram_id(&self, chat_id: i64) -> Result<Option<Principal>, DomainError> {
///         Ok(self.principals.iter().find(|p| p.telegram_chat_id == Some(chat_id)).cloned())
///     }
/// }
/// ```
#[async_trait]
pub trait PrincipalDirectory: Send + Sync {
    /// Find a principal by email address
    async fn find_by_email(&self, email: &str) -> Result<Option<Principal>, DomainError>;

    /// Find a principal by Telegram chat id
    async fn find_by_telegram_id(&self, chat_id: i64) -> Result<Option<Principal>, DomainError>;

    /// Resolve a token subject back to its principal
    ///
    /// A subject is the email when the principal has one, otherwise the chat
    /// id rendered in decimal. Email lookup is tried first so an address that
    /// happens to be numeric still resolves.
    async fn find_by_subject(&self, subject: &str) -> Result<Option<Principal>, DomainError> {
        if let Some(principal) = self.find_by_email(subject).await? {
            return Ok(Some(principal));
        }

        match subject.parse::<i64>() {
            Ok(chat_id) => self.find_by_telegram_id(chat_id).await,
            Err(_) => Ok(None),
        }
    }
}
