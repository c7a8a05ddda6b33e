//! Assembly of the session services from configuration
//!
//! Configuration is validated before anything connects, so a bad secret or
//! lifetime fails at startup rather than on the first login.

use std::sync::Arc;

use eh_core::repositories::{PrincipalDirectory, TokenRepository};
use eh_core::services::{
    ExpiredTokenSweeper, SessionManager, SigningKeyProvider, TelegramAssertionVerifier, TokenCodec,
    TokenServiceConfig,
};
use eh_shared::{AppConfig, AuthConfig};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::database::{DatabasePool, MySqlPrincipalDirectory, MySqlTokenRepository};
use crate::InfrastructureError;

/// Session manager over the MySQL store
pub type MySqlSessionManager = SessionManager<Arc<MySqlTokenRepository>, MySqlPrincipalDirectory>;

/// Builds a session manager over any store and directory
///
/// Fails when the signing secret is not base64url, decodes to fewer than
/// 32 bytes, when the lifetimes are inconsistent, or when no bot token is set.
pub fn build_session_manager<R, D>(
    config: &AuthConfig,
    repository: R,
    directory: D,
) -> Result<SessionManager<R, D>, InfrastructureError>
where
    R: TokenRepository,
    D: PrincipalDirectory,
{
    let keys = SigningKeyProvider::from_base64url(&config.jwt.secret)?;
    let lifetimes = TokenServiceConfig::from_jwt_config(&config.jwt)?;
    let telegram = TelegramAssertionVerifier::new(&config.telegram)?;

    Ok(SessionManager::new(
        repository,
        directory,
        TokenCodec::new(keys),
        telegram,
        lifetimes,
    )?)
}

/// Running session services backed by MySQL
pub struct SessionServices {
    pub pool: DatabasePool,
    pub sessions: Arc<MySqlSessionManager>,
    pub sweeper: Arc<ExpiredTokenSweeper<MySqlTokenRepository>>,
}

impl SessionServices {
    /// Validates configuration, connects to the database and wires the services
    pub async fn connect(config: &AppConfig) -> Result<Self, InfrastructureError> {
        config.validate()?;

        if config.auth.jwt.is_using_default_secret() {
            tracing::warn!("Using the development JWT secret; set JWT_SECRET outside development");
        }

        let pool = DatabasePool::new(config.database.clone()).await?;
        let tokens = Arc::new(MySqlTokenRepository::new(pool.get_pool().clone()));
        let directory = MySqlPrincipalDirectory::new(pool.get_pool().clone());

        let sessions = build_session_manager(&config.auth, tokens.clone(), directory)?;
        let sweeper = ExpiredTokenSweeper::new(tokens, config.auth.sweeper.clone());

        tracing::info!(
            environment = %config.environment,
            "Session services initialized"
        );

        Ok(Self {
            pool,
            sessions: Arc::new(sessions),
            sweeper: Arc::new(sweeper),
        })
    }

    /// Starts the expired token sweeper; `None` when it is disabled
    pub fn start_sweeper(&self, shutdown: watch::Receiver<bool>) -> Option<JoinHandle<()>> {
        self.sweeper.clone().start(shutdown)
    }

    /// Closes the database pool
    pub async fn shutdown(&self) {
        self.pool.close().await;
    }
}
