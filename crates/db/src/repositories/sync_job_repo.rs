//! Repository for the `sync_jobs` table.
//!
//! All status transitions go through [`SyncJobStatus`]; progress writes
//! carry `GREATEST` guards so counters are monotonically non-decreasing,
//! and every mutation is fenced on `status_id = running` so a terminal
//! job can never change again.

use sqlx::PgPool;

use relist_core::jobs::SyncPhase;
use relist_core::types::Timestamp;

use crate::models::status::SyncJobStatus;
use crate::models::sync_job::{CreateSyncJob, SyncJob, SyncJobListQuery};

/// Column list for `sync_jobs` queries.
const COLUMNS: &str = "id, job_id, status_id, total_items, processed_items, \
    failed_items, current_phase, item_ids, error_message, \
    started_at, completed_at, created_at, updated_at";

/// Maximum page size for job listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for job listing.
const DEFAULT_LIMIT: i64 = 50;

/// Provides CRUD operations for sync jobs.
pub struct SyncJobRepo;

impl SyncJobRepo {
    /// Create a new sync job from a snapshot of target item ids.
    ///
    /// Jobs are inserted directly in `running` status: creation and
    /// dispatch are a single step, so `pending` never materializes as a
    /// stored state. `total_items` is fixed to the snapshot size and
    /// never changes afterwards.
    pub async fn create(pool: &PgPool, body: &CreateSyncJob) -> Result<SyncJob, sqlx::Error> {
        let query = format!(
            "INSERT INTO sync_jobs (job_id, status_id, total_items, current_phase, item_ids, started_at)
             VALUES ($1, $2, $3, $4, $5, NOW())
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SyncJob>(&query)
            .bind(&body.job_id)
            .bind(SyncJobStatus::Running.id())
            .bind(body.item_ids.len() as i32)
            .bind(SyncPhase::Initializing.as_str())
            .bind(serde_json::json!(body.item_ids))
            .fetch_one(pool)
            .await
    }

    /// Find a job by its public identifier.
    pub async fn find_by_job_id(
        pool: &PgPool,
        job_id: &str,
    ) -> Result<Option<SyncJob>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sync_jobs WHERE job_id = $1");
        sqlx::query_as::<_, SyncJob>(&query)
            .bind(job_id)
            .fetch_optional(pool)
            .await
    }

    /// Persist progress counters and the derived phase for a running job.
    ///
    /// `GREATEST` keeps the counters monotonic even if writes arrive out
    /// of order; the status fence makes the call a no-op once the job is
    /// terminal.
    pub async fn update_progress(
        pool: &PgPool,
        job_id: &str,
        processed_items: i32,
        failed_items: i32,
        phase: SyncPhase,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE sync_jobs
             SET processed_items = GREATEST(processed_items, $2),
                 failed_items = GREATEST(failed_items, $3),
                 current_phase = $4
             WHERE job_id = $1 AND status_id = $5",
        )
        .bind(job_id)
        .bind(processed_items)
        .bind(failed_items)
        .bind(phase.as_str())
        .bind(SyncJobStatus::Running.id())
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Transition a running job to `completed`.
    ///
    /// Counters must already be persisted (the runner writes them after
    /// every record). Returns `false` if the job was not running.
    pub async fn complete(pool: &PgPool, job_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE sync_jobs
             SET status_id = $2, current_phase = $3, completed_at = NOW()
             WHERE job_id = $1 AND status_id = $4",
        )
        .bind(job_id)
        .bind(SyncJobStatus::Completed.id())
        .bind(SyncPhase::Completed.as_str())
        .bind(SyncJobStatus::Running.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Transition a running job to `failed`, recording the trigger.
    ///
    /// Partial progress counters are preserved; already-repaired
    /// listings are not rolled back. Returns `false` if the job was not
    /// running.
    pub async fn fail(
        pool: &PgPool,
        job_id: &str,
        error_message: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE sync_jobs
             SET status_id = $2, error_message = $3, completed_at = NOW()
             WHERE job_id = $1 AND status_id = $4",
        )
        .bind(job_id)
        .bind(SyncJobStatus::Failed.id())
        .bind(error_message)
        .bind(SyncJobStatus::Running.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List sync jobs, newest first, with clamped pagination.
    pub async fn list_recent(
        pool: &PgPool,
        params: &SyncJobListQuery,
    ) -> Result<Vec<SyncJob>, sqlx::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let offset = params.offset.unwrap_or(0).max(0);

        let query = format!(
            "SELECT {COLUMNS} FROM sync_jobs
             ORDER BY created_at DESC
             LIMIT $1 OFFSET $2"
        );
        sqlx::query_as::<_, SyncJob>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Delete terminal jobs that completed before `cutoff`.
    ///
    /// Running jobs are never touched. Returns the number of pruned rows.
    pub async fn delete_terminal_older_than(
        pool: &PgPool,
        cutoff: Timestamp,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM sync_jobs
             WHERE status_id IN ($1, $2)
               AND completed_at IS NOT NULL
               AND completed_at < $3",
        )
        .bind(SyncJobStatus::Completed.id())
        .bind(SyncJobStatus::Failed.id())
        .bind(cutoff)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
