//! Handlers for the `/sync` resource: starting repair jobs and polling
//! their progress.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use relist_core::error::CoreError;
use relist_core::jobs::{estimated_completion, generate_job_id, MAX_REPAIR_BATCH};
use relist_core::types::Timestamp;
use relist_db::models::status::SyncJobStatus;
use relist_db::models::sync_job::{CreateSyncJob, SyncJob, SyncJobListQuery};
use relist_db::repositories::SyncJobRepo;

use crate::background;
use crate::error::{AppError, AppResult};
use crate::handlers::completeness;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Outcome of a repair start request.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum StartRepairOutcome {
    /// A job was created and is running in the background.
    Started { job_id: String, items_to_sync: i32 },
    /// Nothing is incomplete; no job was created.
    NoRepairNeeded { message: &'static str },
}

/// Progress view of one sync job.
#[derive(Debug, Serialize)]
pub struct SyncProgress {
    pub job_id: String,
    pub status: &'static str,
    pub total_items: i32,
    pub processed_items: i32,
    pub failed_items: i32,
    /// Percentage of the snapshot successfully processed (0-100).
    /// Failed items do not advance it.
    pub completion_rate: f64,
    pub current_phase: String,
    pub started_at: Timestamp,
    pub completed_at: Option<Timestamp>,
    pub error_message: Option<String>,
    /// Projected completion instant; only present for a running job
    /// with an observable throughput.
    pub estimated_completion: Option<Timestamp>,
}

impl SyncProgress {
    /// Build the progress view from a stored job row.
    fn from_job(job: SyncJob, now: Timestamp) -> Result<Self, AppError> {
        let status = SyncJobStatus::from_id(job.status_id).ok_or_else(|| {
            AppError::InternalError(format!("Unknown sync job status id {}", job.status_id))
        })?;

        let completion_rate = if job.total_items > 0 {
            f64::from(job.processed_items) / f64::from(job.total_items) * 100.0
        } else {
            0.0
        };

        let estimated = if status == SyncJobStatus::Running {
            estimated_completion(job.processed_items, job.total_items, job.started_at, now)
        } else {
            None
        };

        Ok(Self {
            job_id: job.job_id,
            status: status.as_str(),
            total_items: job.total_items,
            processed_items: job.processed_items,
            failed_items: job.failed_items,
            completion_rate,
            current_phase: job.current_phase,
            started_at: job.started_at,
            completed_at: job.completed_at,
            error_message: job.error_message,
            estimated_completion: estimated,
        })
    }
}

// ---------------------------------------------------------------------------
// Start repair
// ---------------------------------------------------------------------------

/// POST /api/v1/sync/repair
///
/// Re-run the completeness scan, snapshot the incomplete listings (up
/// to [`MAX_REPAIR_BATCH`], newest first) and start a background repair
/// job over that fixed set. Returns 201 with the job handle, or 200
/// with "no repair needed" when nothing is incomplete.
pub async fn start_repair(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let report = completeness::run_scan(&state.pool, None).await?;

    let item_ids: Vec<String> = report
        .incomplete_items
        .iter()
        .take(MAX_REPAIR_BATCH)
        .map(|item| item.item_id.clone())
        .collect();

    if item_ids.is_empty() {
        return Ok((
            StatusCode::OK,
            Json(DataResponse {
                data: StartRepairOutcome::NoRepairNeeded {
                    message: "no repair needed",
                },
            }),
        ));
    }

    let create = CreateSyncJob {
        job_id: generate_job_id(Utc::now()),
        item_ids,
    };
    let job = SyncJobRepo::create(&state.pool, &create).await?;

    tracing::info!(
        job_id = %job.job_id,
        items_to_sync = job.total_items,
        "Repair job created",
    );

    tokio::spawn(background::repair::run_repair_job(
        state.pool.clone(),
        Arc::clone(&state.enricher),
        job.job_id.clone(),
        job.snapshot_item_ids(),
    ));

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: StartRepairOutcome::Started {
                job_id: job.job_id,
                items_to_sync: job.total_items,
            },
        }),
    ))
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// GET /api/v1/sync/jobs/{job_id}
///
/// Poll the progress of one repair job.
pub async fn get_progress(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let job = SyncJobRepo::find_by_job_id(&state.pool, &job_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "SyncJob",
            id: job_id,
        }))?;

    let progress = SyncProgress::from_job(job, Utc::now())?;
    Ok(Json(DataResponse { data: progress }))
}

/// GET /api/v1/sync/jobs
///
/// List recent repair jobs, newest first. Jobs are retained after
/// completion as an audit trail.
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(params): Query<SyncJobListQuery>,
) -> AppResult<impl IntoResponse> {
    let now = Utc::now();
    let jobs = SyncJobRepo::list_recent(&state.pool, &params).await?;

    let progress: Vec<SyncProgress> = jobs
        .into_iter()
        .map(|job| SyncProgress::from_job(job, now))
        .collect::<Result<_, _>>()?;

    Ok(Json(DataResponse { data: progress }))
}
