//! Route definitions for the `/sync` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::sync;
use crate::state::AppState;

/// Routes mounted at `/sync`.
///
/// ```text
/// POST   /repair           -> start_repair
/// GET    /jobs             -> list_jobs
/// GET    /jobs/{job_id}    -> get_progress
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/repair", post(sync::start_repair))
        .route("/jobs", get(sync::list_jobs))
        .route("/jobs/{job_id}", get(sync::get_progress))
}
