//! Periodic pruning of old terminal sync jobs.
//!
//! Jobs are kept after completion as an audit trail, but the trail does
//! not need to be unbounded. This task deletes completed/failed jobs
//! older than the configured retention period; running jobs are never
//! touched. Runs on a fixed interval using `tokio::time::interval`.

use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use relist_db::repositories::SyncJobRepo;
use relist_db::DbPool;

/// Default retention period: 30 days.
const DEFAULT_RETENTION_DAYS: i64 = 30;

/// How often the cleanup job runs.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(3600); // 1 hour

/// Run the sync job retention cleanup loop.
///
/// Deletes terminal job rows older than `SYNC_JOB_RETENTION_DAYS`
/// (defaults to 30). Runs until `cancel` is triggered.
pub async fn run(pool: DbPool, cancel: CancellationToken) {
    let retention_days: i64 = std::env::var("SYNC_JOB_RETENTION_DAYS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_RETENTION_DAYS);

    tracing::info!(
        retention_days,
        interval_secs = CLEANUP_INTERVAL.as_secs(),
        "Sync job retention task started"
    );

    let mut interval = tokio::time::interval(CLEANUP_INTERVAL);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("Sync job retention task stopping");
                break;
            }
            _ = interval.tick() => {
                let cutoff = Utc::now() - chrono::Duration::days(retention_days);
                match SyncJobRepo::delete_terminal_older_than(&pool, cutoff).await {
                    Ok(pruned) => {
                        if pruned > 0 {
                            tracing::info!(pruned, "Sync job retention: purged old jobs");
                        } else {
                            tracing::debug!("Sync job retention: nothing to purge");
                        }
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Sync job retention: cleanup failed");
                    }
                }
            }
        }
    }
}
