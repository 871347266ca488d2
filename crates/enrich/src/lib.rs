//! Client for the external marketplace enrichment service.
//!
//! The repair runner depends on the [`EnrichmentSource`] trait rather
//! than the concrete HTTP client, so tests can substitute a stub and
//! the upstream wire protocol stays an implementation detail of this
//! crate. Rate limiting is the caller's concern: the runner processes
//! records strictly sequentially, which keeps one in-flight request per
//! job.

use async_trait::async_trait;

use relist_core::repair::RepairCandidate;

pub mod client;

pub use client::{EnrichmentConfig, HttpEnrichmentClient};

/// Errors from a single enrichment fetch.
///
/// All variants are per-record failures: the runner counts them and
/// moves on, they never fail a job.
#[derive(Debug, thiserror::Error)]
pub enum EnrichmentError {
    /// The request could not be sent or the connection dropped.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The upstream service does not know the item.
    #[error("Item {item_id} not found upstream")]
    ItemNotFound { item_id: String },

    /// The upstream service answered with a non-success status.
    #[error("Upstream returned status {status}")]
    RemoteStatus { status: u16 },

    /// The response body did not parse as an enrichment payload.
    #[error("Malformed enrichment payload: {0}")]
    Decode(String),
}

/// Source of candidate field values for incomplete listings.
#[async_trait]
pub trait EnrichmentSource: Send + Sync {
    /// Fetch candidate values for the given marketplace item.
    async fn fetch_missing_fields(
        &self,
        item_id: &str,
    ) -> Result<RepairCandidate, EnrichmentError>;
}
