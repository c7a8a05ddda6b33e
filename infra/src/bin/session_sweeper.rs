//! Standalone expired-session sweeper
//!
//! Runs the periodic purge of expired session rows until interrupted.
//! With `--once` it performs a single sweep and exits.

use anyhow::Context;
use eh_infra::bootstrap::SessionServices;
use eh_infra::telemetry::init_tracing;
use eh_shared::AppConfig;
use tokio::sync::watch;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env();
    init_tracing(&config.logging)?;

    let services = SessionServices::connect(&config)
        .await
        .context("failed to start session services")?;

    if std::env::args().any(|arg| arg == "--once") {
        let report = services.sweeper.run_once().await?;
        tracing::info!(deleted = report.deleted, cutoff = %report.cutoff, "Sweep finished");
        services.shutdown().await;
        return Ok(());
    }

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let Some(handle) = services.start_sweeper(shutdown_rx) else {
        tracing::warn!("TOKEN_SWEEP_ENABLED is false, nothing to do");
        services.shutdown().await;
        return Ok(());
    };

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    tracing::info!("Shutdown signal received");

    shutdown_tx.send(true).ok();
    handle.await.context("sweeper task panicked")?;
    services.shutdown().await;

    Ok(())
}
