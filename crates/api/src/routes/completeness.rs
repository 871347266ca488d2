//! Route definitions for the `/completeness` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::completeness;
use crate::state::AppState;

/// Routes mounted at `/completeness`.
///
/// ```text
/// GET    /scan            -> scan_gaps
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/scan", get(completeness::scan_gaps))
}
