//! Periodic deletion of expired session rows.
//!
//! Validation never depends on this job: an expired row that has not been
//! reaped yet is still rejected by the expiry check in the store.

use std::sync::Arc;
use std::time::Duration;

use gatehouse_db::CredentialStore;
use tokio_util::sync::CancellationToken;

/// Run one reap pass, logging the outcome. Returns the number of rows removed.
pub async fn reap_once(store: &dyn CredentialStore) -> u64 {
    match store.delete_expired_sessions().await {
        Ok(deleted) => {
            if deleted > 0 {
                tracing::info!(deleted, "Session reaper: purged expired sessions");
            } else {
                tracing::debug!("Session reaper: nothing to purge");
            }
            deleted
        }
        Err(e) => {
            tracing::error!(error = %e, "Session reaper: cleanup failed");
            0
        }
    }
}

/// Run the reaper loop every `interval` until `cancel` is triggered.
///
/// The first pass runs immediately.
pub async fn run(store: Arc<dyn CredentialStore>, interval: Duration, cancel: CancellationToken) {
    tracing::info!(interval_secs = interval.as_secs(), "Session reaper started");

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Session reaper stopping");
                break;
            }
            _ = ticker.tick() => {
                reap_once(store.as_ref()).await;
            }
        }
    }
}
