//! Scheduled cleanup of expired authentication state.
//!
//! Expiry is otherwise lazy: an expired session or reset token is only
//! observed as dead when next looked up. The sweep reclaims the rows on
//! its own schedule so request latency stays independent of table size.

use crate::clock::unix_now;
use crate::db::Database;
use std::time::Duration;
use tracing::{error, info};

/// Interval between cleanup runs.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60); // 1 hour

/// Run all cleanup tasks once.
pub async fn run_cleanup(db: &Database) {
    let now = unix_now();

    match db.sessions().delete_expired(now).await {
        Ok(count) if count > 0 => info!("Removed {} expired sessions", count),
        Ok(_) => {}
        Err(e) => error!("Failed to remove expired sessions: {}", e),
    }

    match db.accounts().clear_expired_reset_tokens(now).await {
        Ok(count) if count > 0 => info!("Cleared {} expired password reset tokens", count),
        Ok(_) => {}
        Err(e) => error!("Failed to clear expired reset tokens: {}", e),
    }
}

/// Spawn a background task that runs cleanup periodically.
/// Returns a handle that can be used to abort the task.
pub fn spawn_cleanup_scheduler(db: Database) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CLEANUP_INTERVAL);

        loop {
            interval.tick().await;
            run_cleanup(&db).await;
        }
    })
}
