pub mod completeness;
pub mod health;
pub mod sync;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /completeness/scan           GET   completeness gap report
/// /sync/repair                 POST  start a repair job
/// /sync/jobs                   GET   recent jobs (audit trail)
/// /sync/jobs/{job_id}          GET   job progress
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/completeness", completeness::router())
        .nest("/sync", sync::router())
}
