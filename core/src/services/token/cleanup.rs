//! Background sweep of expired session rows
//!
//! Each run issues one bulk delete of rows that expired strictly before the
//! run started. Revocation state is ignored: a revoked row is kept until its
//! expiry passes, and an unrevoked row is purged once it has.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use eh_shared::SweeperConfig;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::errors::DomainError;
use crate::repositories::TokenRepository;

/// Periodically purges expired rows from the token store
pub struct ExpiredTokenSweeper<R: TokenRepository + 'static> {
    repository: Arc<R>,
    config: SweeperConfig,
}

impl<R: TokenRepository> ExpiredTokenSweeper<R> {
    /// Create a new sweeper
    pub fn new(repository: Arc<R>, config: SweeperConfig) -> Self {
        Self { repository, config }
    }

    /// Run a single sweep with the current time as cutoff
    pub async fn run_once(&self) -> Result<SweepReport, DomainError> {
        self.run_at(Utc::now()).await
    }

    /// Run a single sweep deleting rows that expired strictly before `cutoff`
    pub async fn run_at(&self, cutoff: DateTime<Utc>) -> Result<SweepReport, DomainError> {
        let deleted = self.repository.delete_expired_before(cutoff).await?;

        if deleted > 0 {
            info!("Purged {} expired session tokens (cutoff {})", deleted, cutoff);
        } else {
            debug!("No expired session tokens before {}", cutoff);
        }

        Ok(SweepReport { deleted, cutoff })
    }

    /// Start the sweeper as a background task
    ///
    /// Failed runs are logged and skipped; the next tick retries. The loop
    /// ends when `shutdown` flips to `true` or its sender is dropped.
    /// Returns `None` when the sweeper is disabled by configuration.
    pub fn start(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) -> Option<JoinHandle<()>> {
        if !self.config.enabled {
            warn!("Expired token sweeper is disabled");
            return None;
        }

        let period = std::time::Duration::from_secs(self.config.interval_seconds.max(1));

        Some(tokio::spawn(async move {
            info!(
                "Expired token sweeper started - will run every {} seconds",
                period.as_secs()
            );

            let mut interval_timer = tokio::time::interval(period);
            interval_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = interval_timer.tick() => {
                        if let Err(e) = self.run_once().await {
                            error!("Expired token sweep failed, retrying next period: {}", e);
                        }
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            info!("Expired token sweeper stopped");
                            break;
                        }
                    }
                }
            }
        }))
    }
}

/// Result of one sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    /// Number of rows deleted
    pub deleted: usize,
    /// Instant rows had to expire before to be deleted
    pub cutoff: DateTime<Utc>,
}
