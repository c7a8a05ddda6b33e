//! End-to-end session flow over the in-memory store
//!
//! Exercises the public wiring: configuration, manager assembly, login,
//! refresh, logout and the background sweep.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::watch;

use eh_core::domain::entities::principal::{Principal, Role};
use eh_core::domain::entities::telegram::TelegramAssertion;
use eh_core::domain::entities::token::SessionToken;
use eh_core::errors::{DomainError, TokenError};
use eh_core::repositories::{InMemoryTokenRepository, PrincipalDirectory, TokenRepository};
use eh_core::services::{data_check_string, ExpiredTokenSweeper, TelegramAssertionVerifier};
use eh_infra::bootstrap::build_session_manager;
use eh_shared::{AuthConfig, SweeperConfig};

const BOT_TOKEN: &str = "987654:XYZ";

struct Directory(Vec<Principal>);

#[async_trait]
impl PrincipalDirectory for Directory {
    async fn find_by_email(&self, email: &str) -> Result<Option<Principal>, DomainError> {
        Ok(self.0.iter().find(|p| p.email.as_deref() == Some(email)).cloned())
    }

    async fn find_by_telegram_id(&self, chat_id: i64) -> Result<Option<Principal>, DomainError> {
        Ok(self.0.iter().find(|p| p.telegram_chat_id == Some(chat_id)).cloned())
    }
}

fn auth_config() -> AuthConfig {
    let mut config = AuthConfig::default();
    config.telegram.bot_token = BOT_TOKEN.to_string();
    config
}

fn signed_assertion(config: &AuthConfig, chat_id: i64) -> TelegramAssertion {
    let mut assertion = TelegramAssertion {
        id: chat_id,
        first_name: "Ivan".to_string(),
        last_name: Some("Petrov".to_string()),
        username: None,
        auth_date: Utc::now().timestamp() - 60,
        hash: String::new(),
    };
    let verifier = TelegramAssertionVerifier::new(&config.telegram).unwrap();
    assertion.hash = verifier.sign(&data_check_string(&assertion)).unwrap();
    assertion
}

#[tokio::test]
async fn test_telegram_login_refresh_logout() {
    let config = auth_config();
    let repo = Arc::new(InMemoryTokenRepository::new());
    let directory = Directory(vec![Principal::with_telegram("u-77", Role::Student, 77)]);
    let sessions = build_session_manager(&config, repo.clone(), directory).unwrap();

    let login = sessions
        .login_with_telegram(&signed_assertion(&config, 77))
        .await
        .unwrap();
    let claims = sessions.authenticate(&login.access_token).await.unwrap();
    assert_eq!(claims.sub, "77");

    let refreshed = sessions.refresh(&login.refresh_token).await.unwrap();
    assert!(matches!(
        sessions.authenticate(&login.access_token).await,
        Err(DomainError::Unauthorized)
    ));
    assert!(matches!(
        sessions.refresh(&login.refresh_token).await,
        Err(DomainError::Token(TokenError::InvalidToken))
    ));

    let header = format!("Bearer {}", refreshed.access_token);
    sessions.logout(Some(&header)).await.unwrap();
    assert!(!sessions.is_live(&refreshed.access_token, "77").await.unwrap());
    assert_eq!(repo.count_unrevoked("u-77").await.unwrap(), 0);
}

#[tokio::test]
async fn test_rejections_are_unauthorized_class() {
    let config = auth_config();
    let directory = Directory(vec![]);
    let sessions =
        build_session_manager(&config, InMemoryTokenRepository::new(), directory).unwrap();

    let err = sessions.authenticate("garbage").await.unwrap_err();
    assert!(err.is_unauthorized());

    let err = sessions
        .login_with_telegram(&signed_assertion(&config, 5))
        .await
        .unwrap_err();
    assert!(err.is_unauthorized());
}

#[tokio::test(start_paused = true)]
async fn test_background_sweep_until_shutdown() {
    let repo = Arc::new(InMemoryTokenRepository::new());
    repo.save(SessionToken::new(
        "u-1",
        "access-old".to_string(),
        "refresh-old".to_string(),
        Utc::now() - Duration::hours(1),
    ))
    .await
    .unwrap();

    let sweeper = Arc::new(ExpiredTokenSweeper::new(
        repo.clone(),
        SweeperConfig {
            interval_seconds: 60,
            enabled: true,
        },
    ));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = sweeper.start(shutdown_rx).unwrap();

    // The first tick fires immediately
    tokio::time::sleep(std::time::Duration::from_secs(1)).await;
    assert!(repo.is_empty().await);

    shutdown_tx.send(true).unwrap();
    handle.await.unwrap();
}
