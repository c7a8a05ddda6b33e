//! Session lifecycle tests

use std::sync::Arc;

use chrono::Utc;

use crate::errors::{AuthError, DomainError, TokenError};
use crate::repositories::{InMemoryTokenRepository, TokenRepository};
use crate::services::session::bearer_token;

use super::mocks::*;

fn setup() -> (Arc<InMemoryTokenRepository>, StaticDirectory, TestManager) {
    let repo = Arc::new(InMemoryTokenRepository::new());
    let directory = StaticDirectory::with(vec![alice(), telegram_student(4242)]);
    let manager = manager(repo.clone(), directory.clone());
    (repo, directory, manager)
}

#[tokio::test]
async fn test_issue_creates_live_session() {
    let (repo, _, manager) = setup();

    let pair = manager.issue(&alice()).await.unwrap();

    assert_ne!(pair.access_token, pair.refresh_token);
    assert_eq!(pair.access_expires_in, 900);
    assert_eq!(pair.refresh_expires_in, 604_800);

    let row = repo
        .find_by_access_token(&pair.access_token)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(row.principal_id, "p-alice");
    assert_eq!(row.refresh_token, pair.refresh_token);
    assert!(!row.is_revoked);

    let claims = manager.codec().decode(&pair.access_token).unwrap();
    assert_eq!(row.expires_at.timestamp(), claims.exp);
    assert_eq!(claims.sub, "alice@example.com");

    assert!(manager
        .is_live(&pair.access_token, "alice@example.com")
        .await
        .unwrap());
}

#[tokio::test]
async fn test_issue_supersedes_previous_session() {
    let (repo, _, manager) = setup();

    let first = manager.issue(&alice()).await.unwrap();
    let second = manager.issue(&alice()).await.unwrap();

    assert!(!manager
        .is_live(&first.access_token, "alice@example.com")
        .await
        .unwrap());
    assert!(manager
        .is_live(&second.access_token, "alice@example.com")
        .await
        .unwrap());

    let live = repo.find_unrevoked_by_principal("p-alice").await.unwrap();
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].access_token, second.access_token);
}

#[tokio::test]
async fn test_concurrent_issue_leaves_one_live_session() {
    let (repo, _, manager) = setup();
    let manager = Arc::new(manager);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let manager = manager.clone();
            tokio::spawn(async move { manager.issue(&alice()).await })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(repo.count_unrevoked("p-alice").await.unwrap(), 1);
    assert_eq!(repo.len().await, 8);
}

#[tokio::test]
async fn test_refresh_rotates_pair() {
    let (repo, _, manager) = setup();

    let first = manager.issue(&alice()).await.unwrap();
    let second = manager.refresh(&first.refresh_token).await.unwrap();

    assert_ne!(first.access_token, second.access_token);
    assert_ne!(first.refresh_token, second.refresh_token);

    let old = repo
        .find_by_refresh_token(&first.refresh_token)
        .await
        .unwrap()
        .unwrap();
    assert!(old.is_revoked);
    assert!(manager
        .is_live(&second.access_token, "alice@example.com")
        .await
        .unwrap());
}

#[tokio::test]
async fn test_refresh_twice_is_rejected() {
    let (_, _, manager) = setup();

    let pair = manager.issue(&alice()).await.unwrap();
    manager.refresh(&pair.refresh_token).await.unwrap();

    let result = manager.refresh(&pair.refresh_token).await;
    assert!(matches!(
        result,
        Err(DomainError::Token(TokenError::InvalidToken))
    ));
}

#[tokio::test]
async fn test_refresh_with_superseded_token_is_rejected() {
    let (_, _, manager) = setup();

    let first = manager.issue(&alice()).await.unwrap();
    manager.issue(&alice()).await.unwrap();

    let result = manager.refresh(&first.refresh_token).await;
    assert!(matches!(
        result,
        Err(DomainError::Token(TokenError::InvalidToken))
    ));
}

#[tokio::test]
async fn test_refresh_with_unknown_token_is_rejected() {
    let (_, _, manager) = setup();

    // Correctly signed but never stored
    let stray = manager.codec().encode(&alice(), 3600).unwrap();

    let result = manager.refresh(&stray).await;
    assert!(matches!(
        result,
        Err(DomainError::Token(TokenError::InvalidToken))
    ));
}

#[tokio::test]
async fn test_refresh_with_garbage_is_rejected() {
    let (_, _, manager) = setup();

    let result = manager.refresh("not-a-token").await;
    assert!(matches!(
        result,
        Err(DomainError::Token(TokenError::InvalidToken))
    ));
}

#[tokio::test]
async fn test_refresh_with_expired_token() {
    let (_, _, manager) = setup();

    let (expired, _) = manager.codec().mint(&alice(), 0, Utc::now()).unwrap();

    let result = manager.refresh(&expired).await;
    assert!(matches!(result, Err(DomainError::Token(TokenError::Expired))));
}

#[tokio::test]
async fn test_refresh_for_removed_principal() {
    let (_, directory, manager) = setup();

    let pair = manager.issue(&alice()).await.unwrap();
    directory.remove("p-alice").await;

    let result = manager.refresh(&pair.refresh_token).await;
    assert!(matches!(result, Err(DomainError::NotFound { .. })));
}

#[tokio::test]
async fn test_refresh_resolves_telegram_subject() {
    let (_, _, manager) = setup();

    let pair = manager.issue(&telegram_student(4242)).await.unwrap();
    let claims = manager.codec().decode(&pair.refresh_token).unwrap();
    assert_eq!(claims.sub, "4242");

    let rotated = manager.refresh(&pair.refresh_token).await.unwrap();
    assert!(manager.is_live(&rotated.access_token, "4242").await.unwrap());
}

#[tokio::test]
async fn test_revoke_one() {
    let (_, _, manager) = setup();

    let pair = manager.issue(&alice()).await.unwrap();
    manager.revoke_one(&pair.access_token).await.unwrap();

    assert!(!manager
        .is_live(&pair.access_token, "alice@example.com")
        .await
        .unwrap());
}

#[tokio::test]
async fn test_revoke_one_unknown_token_is_noop() {
    let (_, _, manager) = setup();

    assert!(manager.revoke_one("never-issued").await.is_ok());
}

#[tokio::test]
async fn test_revoke_all() {
    let (repo, _, manager) = setup();

    manager.issue(&alice()).await.unwrap();
    let revoked = manager.revoke_all("p-alice").await.unwrap();

    assert_eq!(revoked, 1);
    assert_eq!(repo.count_unrevoked("p-alice").await.unwrap(), 0);
    assert_eq!(manager.revoke_all("p-alice").await.unwrap(), 0);
}

#[tokio::test]
async fn test_is_live_rejects_other_subject() {
    let (_, _, manager) = setup();

    let pair = manager.issue(&alice()).await.unwrap();

    assert!(!manager
        .is_live(&pair.access_token, "mallory@example.com")
        .await
        .unwrap());
}

#[tokio::test]
async fn test_is_live_rejects_unstored_token() {
    let (_, _, manager) = setup();

    let stray = manager.codec().encode(&alice(), 3600).unwrap();

    assert!(!manager.is_live(&stray, "alice@example.com").await.unwrap());
    assert!(!manager.is_live("garbage", "alice@example.com").await.unwrap());
}

#[tokio::test]
async fn test_is_live_rejects_purged_row() {
    let (repo, _, manager) = setup();

    let pair = manager.issue(&alice()).await.unwrap();
    repo.delete_expired_before(Utc::now() + chrono::Duration::days(1))
        .await
        .unwrap();

    assert!(!manager
        .is_live(&pair.access_token, "alice@example.com")
        .await
        .unwrap());
}

#[tokio::test]
async fn test_authenticate() {
    let (_, _, manager) = setup();

    let pair = manager.issue(&alice()).await.unwrap();
    let claims = manager.authenticate(&pair.access_token).await.unwrap();
    assert_eq!(claims.principal_id, "p-alice");

    manager.revoke_one(&pair.access_token).await.unwrap();
    let result = manager.authenticate(&pair.access_token).await;
    assert!(matches!(result, Err(DomainError::Unauthorized)));
}

#[tokio::test]
async fn test_logout_with_bearer_header() {
    let (_, _, manager) = setup();

    let pair = manager.issue(&alice()).await.unwrap();
    let header = format!("Bearer {}", pair.access_token);
    manager.logout(Some(&header)).await.unwrap();

    assert!(!manager
        .is_live(&pair.access_token, "alice@example.com")
        .await
        .unwrap());
}

#[tokio::test]
async fn test_logout_without_bearer_is_noop() {
    let (repo, _, manager) = setup();

    manager.issue(&alice()).await.unwrap();
    manager.logout(None).await.unwrap();
    manager.logout(Some("Basic dXNlcjpwYXNz")).await.unwrap();

    assert_eq!(repo.count_unrevoked("p-alice").await.unwrap(), 1);
}

#[test]
fn test_bearer_token() {
    assert_eq!(bearer_token("Bearer abc.def"), Some("abc.def"));
    assert_eq!(bearer_token("Bearer "), None);
    assert_eq!(bearer_token("bearer abc"), None);
    assert_eq!(bearer_token("abc"), None);
}

#[tokio::test]
async fn test_login_with_telegram() {
    let (_, _, manager) = setup();

    let pair = manager
        .login_with_telegram(&signed_assertion(4242))
        .await
        .unwrap();

    let claims = manager.authenticate(&pair.access_token).await.unwrap();
    assert_eq!(claims.sub, "4242");
    assert_eq!(claims.principal_id, "p-tg");
    assert_eq!(claims.external_chat_id.as_deref(), Some("4242"));
}

#[tokio::test]
async fn test_login_with_forged_assertion() {
    let (_, _, manager) = setup();

    let mut assertion = signed_assertion(4242);
    assertion.first_name = "Eve".to_string();

    let result = manager.login_with_telegram(&assertion).await;
    assert!(matches!(
        result,
        Err(DomainError::Auth(AuthError::InvalidTelegramAssertion))
    ));
}

#[tokio::test]
async fn test_login_with_stale_assertion() {
    let (_, _, manager) = setup();

    let mut assertion = signed_assertion(4242);
    assertion.auth_date -= 86_401;
    assertion.hash = verifier()
        .sign(&crate::services::telegram::data_check_string(&assertion))
        .unwrap();

    let result = manager.login_with_telegram(&assertion).await;
    assert!(matches!(
        result,
        Err(DomainError::Auth(AuthError::InvalidTelegramAssertion))
    ));
}

#[tokio::test]
async fn test_login_with_unknown_chat_id() {
    let (_, _, manager) = setup();

    let result = manager.login_with_telegram(&signed_assertion(9999)).await;
    assert!(matches!(result, Err(DomainError::NotFound { .. })));
}

#[tokio::test]
async fn test_login_with_unapproved_principal() {
    let repo = Arc::new(InMemoryTokenRepository::new());
    let mut pending = telegram_student(5151);
    pending.is_approved = false;
    let manager = manager(repo.clone(), StaticDirectory::with(vec![pending]));

    let result = manager.login_with_telegram(&signed_assertion(5151)).await;
    assert!(matches!(
        result,
        Err(DomainError::Auth(AuthError::AccountNotApproved))
    ));
    assert!(repo.is_empty().await);
}
