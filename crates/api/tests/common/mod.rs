//! Shared helpers for API integration tests: test config, router
//! construction with a scripted enrichment stub, request helpers and
//! listing seeds.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use relist_api::config::ServerConfig;
use relist_api::router::build_app_router;
use relist_api::state::AppState;
use relist_core::repair::RepairCandidate;
use relist_db::models::listing::CreateListing;
use relist_db::repositories::ListingRepo;
use relist_enrich::{EnrichmentConfig, EnrichmentError, EnrichmentSource};

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        enrichment: EnrichmentConfig {
            base_url: "http://enrich.test:9050".to_string(),
            api_key: None,
            request_timeout_secs: 5,
        },
    }
}

// ---------------------------------------------------------------------------
// Enrichment stub
// ---------------------------------------------------------------------------

/// Scripted in-memory enrichment source.
///
/// Items listed via [`with_failure`](Self::with_failure) return a
/// remote-status error; everything else returns the scripted candidate
/// (or an empty one).
#[derive(Debug, Default)]
pub struct StubEnricher {
    candidates: HashMap<String, RepairCandidate>,
    failing: HashSet<String>,
}

impl StubEnricher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_candidate(mut self, item_id: &str, candidate: RepairCandidate) -> Self {
        self.candidates.insert(item_id.to_string(), candidate);
        self
    }

    pub fn with_failure(mut self, item_id: &str) -> Self {
        self.failing.insert(item_id.to_string());
        self
    }
}

#[async_trait]
impl EnrichmentSource for StubEnricher {
    async fn fetch_missing_fields(
        &self,
        item_id: &str,
    ) -> Result<RepairCandidate, EnrichmentError> {
        if self.failing.contains(item_id) {
            return Err(EnrichmentError::RemoteStatus { status: 500 });
        }
        Ok(self.candidates.get(item_id).cloned().unwrap_or_default())
    }
}

/// A candidate payload that can fill every repairable field.
pub fn full_candidate() -> RepairCandidate {
    RepairCandidate {
        description: Some(
            "Replacement description pulled from the marketplace item feed.".to_string(),
        ),
        sku: Some("FEED-SKU-1".to_string()),
        images: vec!["https://img.test/a.jpg".to_string()],
        attributes: Some(serde_json::json!({"brand": "Acme"})),
    }
}

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Build the full application router with all middleware layers, a stub
/// enrichment source and the given database pool.
///
/// This mirrors the router construction in `main.rs` so integration
/// tests exercise the same middleware stack that production uses.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, Arc::new(StubEnricher::new()))
}

/// Same as [`build_test_app`], with a caller-provided enrichment source.
pub fn build_test_app_with(pool: PgPool, enricher: Arc<dyn EnrichmentSource>) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        enricher,
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Issue a GET request against the app.
pub async fn get(app: Router, path: &str) -> Response {
    app.oneshot(
        Request::builder()
            .uri(path)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Issue a bodyless POST request against the app.
pub async fn post(app: Router, path: &str) -> Response {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(path)
            .body(Body::empty())
            .unwrap(),
    )
    .await
    .unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Listing seeds
// ---------------------------------------------------------------------------

/// Insert a listing that passes all five completeness checks.
pub async fn seed_complete_listing(pool: &PgPool, item_id: &str) {
    ListingRepo::create(
        pool,
        &CreateListing {
            item_id: item_id.to_string(),
            title: "Stainless Travel Mug".to_string(),
            sku: format!("SKU-{item_id}"),
            description: "A vacuum-insulated travel mug that keeps drinks hot for six hours."
                .to_string(),
            image_urls: Some(r#"["https://img.test/mug.jpg"]"#.to_string()),
            attributes: Some(r#"{"color":"silver","capacity":"500ml"}"#.to_string()),
            price: Some(19.99),
        },
    )
    .await
    .unwrap();
}

/// Insert a listing missing description, images and attributes
/// (sku and price present: scores 40).
pub async fn seed_incomplete_listing(pool: &PgPool, item_id: &str) {
    ListingRepo::create(
        pool,
        &CreateListing {
            item_id: item_id.to_string(),
            title: "Untitled import".to_string(),
            sku: format!("SKU-{item_id}"),
            price: Some(5.0),
            ..CreateListing::default()
        },
    )
    .await
    .unwrap();
}

/// Insert a listing missing only a long-enough description (scores 80).
pub async fn seed_nearly_complete_listing(pool: &PgPool, item_id: &str) {
    ListingRepo::create(
        pool,
        &CreateListing {
            item_id: item_id.to_string(),
            title: "Ceramic Pour-Over Set".to_string(),
            sku: format!("SKU-{item_id}"),
            description: "Too short.".to_string(),
            image_urls: Some(r#"["https://img.test/set.jpg"]"#.to_string()),
            attributes: Some(r#"{"material":"ceramic"}"#.to_string()),
            price: Some(42.0),
        },
    )
    .await
    .unwrap();
}
