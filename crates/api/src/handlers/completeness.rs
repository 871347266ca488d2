//! Handlers for completeness scanning.
//!
//! The scan is read-only: it loads the most recently updated listings,
//! scores each one, and returns the aggregate gap report. An empty or
//! unreachable store aborts the scan with `DATA_UNAVAILABLE` -- callers
//! use that signal to decide whether to offer a repair action at all,
//! so it must not be swallowed into an empty report.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use relist_core::completeness::score_listing;
use relist_core::error::CoreError;
use relist_core::gap::{clamp_scan_limit, GapAccumulator, GapReport};
use relist_db::repositories::ListingRepo;
use relist_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for the scan endpoint.
#[derive(Debug, Deserialize)]
pub struct ScanParams {
    /// Maximum number of listings to examine. Defaults to 500, capped
    /// at 2000.
    pub limit: Option<i64>,
}

/// GET /api/v1/completeness/scan
///
/// Run a completeness scan and return the gap report.
pub async fn scan_gaps(
    State(state): State<AppState>,
    Query(params): Query<ScanParams>,
) -> AppResult<impl IntoResponse> {
    let report = run_scan(&state.pool, params.limit).await?;

    tracing::info!(
        total_checked = report.total_checked,
        incomplete = report.incomplete_items.len(),
        average = report.average_completeness,
        "Completeness scan finished",
    );

    Ok(Json(DataResponse { data: report }))
}

/// Run one scan: load, score, accumulate.
///
/// Shared by the scan endpoint and repair-job creation so both see the
/// same incompleteness picture. Store failures and an empty store both
/// surface as [`CoreError::DataUnavailable`].
pub(crate) async fn run_scan(pool: &DbPool, limit: Option<i64>) -> Result<GapReport, AppError> {
    let limit = clamp_scan_limit(limit);

    let listings = ListingRepo::list_recent(pool, limit).await.map_err(|e| {
        tracing::error!(error = %e, "Listing store unreachable during scan");
        CoreError::DataUnavailable(format!("listing store unreachable: {e}"))
    })?;

    if listings.is_empty() {
        return Err(CoreError::DataUnavailable("listing store is empty".to_string()).into());
    }

    let mut accumulator = GapAccumulator::new();
    for listing in &listings {
        let report = score_listing(&listing.completeness_fields());
        accumulator.add(listing.item_id.clone(), &report);
    }

    Ok(accumulator.finish())
}
