//! Periodic pruning of rate-limit log rows and dead sessions.
//!
//! Rate-limit rows older than the widest rule window can no longer affect a
//! decision. Sessions are removed once expired or revoked.

use std::time::Duration;

use chrono::Utc;
use rankforge_core::rate_limit::MAX_WINDOW_SECS;
use rankforge_db::repositories::{RateLimitRepo, SessionRepo};
use rankforge_db::DbPool;
use tokio_util::sync::CancellationToken;

/// How often the cleanup runs.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(600);

/// Run the retention loop until `cancel` is triggered.
pub async fn run(pool: DbPool, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = CLEANUP_INTERVAL.as_secs(),
        max_window_secs = MAX_WINDOW_SECS,
        "Retention job started"
    );

    let mut interval = tokio::time::interval(CLEANUP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Retention job stopping");
                break;
            }
            _ = interval.tick() => run_once(&pool).await,
        }
    }
}

/// One cleanup pass. Failures are logged and retried on the next tick.
pub async fn run_once(pool: &DbPool) {
    let cutoff = Utc::now() - chrono::Duration::seconds(MAX_WINDOW_SECS);
    match RateLimitRepo::prune_older_than(pool, cutoff).await {
        Ok(0) => tracing::debug!("Retention: no rate-limit rows to prune"),
        Ok(deleted) => tracing::info!(deleted, "Retention: pruned rate-limit rows"),
        Err(e) => tracing::error!(error = %e, "Retention: rate-limit prune failed"),
    }

    match SessionRepo::cleanup_expired(pool).await {
        Ok(0) => {}
        Ok(deleted) => tracing::info!(deleted, "Retention: removed dead sessions"),
        Err(e) => tracing::error!(error = %e, "Retention: session cleanup failed"),
    }
}
