use std::sync::Arc;

use relist_enrich::EnrichmentSource;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: relist_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Enrichment source used by repair jobs. A trait object so tests
    /// can substitute a stub.
    pub enricher: Arc<dyn EnrichmentSource>,
}
