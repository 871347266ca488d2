//! Sync job entity model and DTOs.
//!
//! One row per repair job, retained after completion as an audit trail.
//! The snapshot of target item ids is stored with the row (JSONB), so a
//! job is a self-contained unit of work: the target set is never
//! re-queried mid-job.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use relist_core::types::{DbId, Timestamp};

use super::status::StatusId;

/// A row from the `sync_jobs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SyncJob {
    pub id: DbId,
    /// Public job identifier (`sync_<timestamp>_<hex>`).
    pub job_id: String,
    pub status_id: StatusId,
    pub total_items: i32,
    pub processed_items: i32,
    pub failed_items: i32,
    pub current_phase: String,
    /// Fixed snapshot of target listing item ids, in processing order.
    pub item_ids: serde_json::Value,
    pub error_message: Option<String>,
    pub started_at: Timestamp,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl SyncJob {
    /// Decode the persisted snapshot back into item ids, preserving
    /// order. Non-string entries (which the repository never writes)
    /// are skipped.
    pub fn snapshot_item_ids(&self) -> Vec<String> {
        self.item_ids
            .as_array()
            .map(|entries| {
                entries
                    .iter()
                    .filter_map(|e| e.as_str())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// DTO for inserting a new sync job.
#[derive(Debug, Clone)]
pub struct CreateSyncJob {
    pub job_id: String,
    /// Snapshot of target item ids; `total_items` is its length.
    pub item_ids: Vec<String>,
}

/// Query parameters for listing sync jobs.
#[derive(Debug, Deserialize)]
pub struct SyncJobListQuery {
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}
