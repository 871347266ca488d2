//! The repair job runner.
//!
//! Drives one sync job over its fixed snapshot of listing ids, strictly
//! sequentially: the enrichment API is rate-limited upstream, and one
//! in-flight request per job respects that without a separate limiter.
//!
//! Per-record failures (enrichment errors, vanished listings) are
//! counted and skipped; the job continues. Store errors are fatal: the
//! job transitions to `failed` with the partial counters preserved, and
//! already-repaired listings are not rolled back.

use std::sync::Arc;

use relist_core::jobs::phase_for_progress;
use relist_core::repair::plan_repair;
use relist_db::repositories::{ListingRepo, SyncJobRepo};
use relist_db::DbPool;
use relist_enrich::EnrichmentSource;

/// Drive one repair job to a terminal state.
///
/// Intended to be spawned via `tokio::spawn`; all outcomes are handled
/// internally and reported through the job row and logs.
pub async fn run_repair_job(
    pool: DbPool,
    enricher: Arc<dyn EnrichmentSource>,
    job_id: String,
    item_ids: Vec<String>,
) {
    tracing::info!(job_id = %job_id, total = item_ids.len(), "Repair job running");

    match process_snapshot(&pool, enricher.as_ref(), &job_id, &item_ids).await {
        Ok((processed, failed)) => match SyncJobRepo::complete(&pool, &job_id).await {
            Ok(true) => {
                tracing::info!(job_id = %job_id, processed, failed, "Repair job completed");
            }
            Ok(false) => {
                tracing::warn!(job_id = %job_id, "Repair job was no longer running at completion");
            }
            Err(e) => {
                tracing::error!(job_id = %job_id, error = %e, "Failed to persist job completion");
            }
        },
        Err(e) => {
            tracing::error!(job_id = %job_id, error = %e, "Repair job failed");
            if let Err(persist_err) =
                SyncJobRepo::fail(&pool, &job_id, &format!("Database error: {e}")).await
            {
                tracing::error!(
                    job_id = %job_id,
                    error = %persist_err,
                    "Failed to persist job failure",
                );
            }
        }
    }
}

/// Iterate the snapshot in order, persisting counters and the derived
/// phase after every record. Returns the final `(processed, failed)`
/// counters; any store error aborts the iteration.
async fn process_snapshot(
    pool: &DbPool,
    enricher: &dyn EnrichmentSource,
    job_id: &str,
    item_ids: &[String],
) -> Result<(i32, i32), sqlx::Error> {
    let total = item_ids.len() as i32;
    let mut processed = 0;
    let mut failed = 0;

    for item_id in item_ids {
        if repair_one(pool, enricher, item_id).await? {
            processed += 1;
        } else {
            failed += 1;
        }

        let phase = phase_for_progress(processed, total);
        SyncJobRepo::update_progress(pool, job_id, processed, failed, phase).await?;
    }

    Ok((processed, failed))
}

/// Repair a single listing.
///
/// `Ok(true)` counts as processed, `Ok(false)` as failed; only store
/// errors propagate. A listing with nothing to fill still counts as
/// processed -- the enrichment succeeded, there was just no gap left.
async fn repair_one(
    pool: &DbPool,
    enricher: &dyn EnrichmentSource,
    item_id: &str,
) -> Result<bool, sqlx::Error> {
    let Some(listing) = ListingRepo::find_by_item_id(pool, item_id).await? else {
        tracing::warn!(item_id, "Snapshot listing no longer in store; counted as failed");
        return Ok(false);
    };

    let candidate = match enricher.fetch_missing_fields(item_id).await {
        Ok(candidate) => candidate,
        Err(e) => {
            tracing::warn!(item_id, error = %e, "Enrichment fetch failed; record skipped");
            return Ok(false);
        }
    };

    let plan = plan_repair(&listing.completeness_fields(), &candidate);
    if plan.is_empty() {
        tracing::debug!(item_id, "No empty fields to fill");
    } else {
        ListingRepo::apply_repair(pool, item_id, &plan).await?;
        tracing::debug!(item_id, "Listing repaired");
    }

    Ok(true)
}
