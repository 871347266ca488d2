//! Integration tests for the repair start and progress endpoints.

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use common::{body_json, get, post, StubEnricher};
use sqlx::PgPool;

use relist_db::repositories::ListingRepo;
use relist_enrich::EnrichmentSource;

/// Poll a job's progress endpoint until it leaves `running`.
///
/// Panics if the job has not reached a terminal state within the
/// allotted time; spawned repair jobs over a handful of stubbed items
/// finish in milliseconds.
async fn await_terminal(
    pool: &PgPool,
    enricher: &Arc<dyn EnrichmentSource>,
    job_id: &str,
) -> serde_json::Value {
    let path = format!("/api/v1/sync/jobs/{job_id}");
    for _ in 0..250 {
        let app = common::build_test_app_with(pool.clone(), Arc::clone(enricher));
        let json = body_json(get(app, &path).await).await;
        if json["data"]["status"] != "running" {
            return json;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("Job {job_id} did not reach a terminal state in time");
}

// ---------------------------------------------------------------------------
// Test: nothing incomplete -> no job is created
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn start_repair_with_nothing_incomplete(pool: PgPool) {
    common::seed_complete_listing(&pool, "complete-1").await;

    let app = common::build_test_app(pool);
    let response = post(app, "/api/v1/sync/repair").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["message"], "no repair needed");
}

// ---------------------------------------------------------------------------
// Test: empty store -> scan failure propagates
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn start_repair_over_empty_store_returns_503(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post(app, "/api/v1/sync/repair").await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_json(response).await;
    assert_eq!(json["code"], "DATA_UNAVAILABLE");
}

// ---------------------------------------------------------------------------
// Test: full repair round trip through the HTTP surface
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn start_repair_runs_job_to_completion(pool: PgPool) {
    common::seed_complete_listing(&pool, "complete-1").await;
    common::seed_incomplete_listing(&pool, "sparse-1").await;
    common::seed_nearly_complete_listing(&pool, "short-desc-1").await;

    let enricher: Arc<dyn EnrichmentSource> = Arc::new(
        StubEnricher::new()
            .with_candidate("sparse-1", common::full_candidate())
            .with_candidate("short-desc-1", common::full_candidate()),
    );

    let app = common::build_test_app_with(pool.clone(), Arc::clone(&enricher));
    let response = post(app, "/api/v1/sync/repair").await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["items_to_sync"], 2);
    let job_id = json["data"]["job_id"].as_str().unwrap().to_string();
    assert!(job_id.starts_with("sync_"));

    let progress = await_terminal(&pool, &enricher, &job_id).await;
    let data = &progress["data"];

    assert_eq!(data["status"], "completed");
    assert_eq!(data["total_items"], 2);
    assert_eq!(data["processed_items"], 2);
    assert_eq!(data["failed_items"], 0);
    assert_eq!(data["completion_rate"], 100.0);
    assert_eq!(data["current_phase"], "completed");
    assert!(data["completed_at"].is_string());
    assert!(data["error_message"].is_null());

    // The empty fields were filled from the candidate...
    let repaired = ListingRepo::find_by_item_id(&pool, "sparse-1")
        .await
        .unwrap()
        .unwrap();
    assert!(!repaired.description.is_empty());
    assert_eq!(
        repaired.image_urls.as_deref(),
        Some(r#"["https://img.test/a.jpg"]"#)
    );

    // ...but the populated sku was not clobbered by the feed value.
    assert_eq!(repaired.sku, "SKU-sparse-1");
}

// ---------------------------------------------------------------------------
// Test: unknown job id -> 404
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn progress_for_unknown_job_returns_404(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/sync/jobs/sync_00000000000000_deadbeef").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
}

// ---------------------------------------------------------------------------
// Test: audit listing of recent jobs
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn jobs_listing_returns_recent_jobs(pool: PgPool) {
    common::seed_incomplete_listing(&pool, "sparse-1").await;

    let enricher: Arc<dyn EnrichmentSource> =
        Arc::new(StubEnricher::new().with_candidate("sparse-1", common::full_candidate()));

    let app = common::build_test_app_with(pool.clone(), Arc::clone(&enricher));
    let started = body_json(post(app, "/api/v1/sync/repair").await).await;
    let job_id = started["data"]["job_id"].as_str().unwrap().to_string();
    await_terminal(&pool, &enricher, &job_id).await;

    let app = common::build_test_app_with(pool.clone(), Arc::clone(&enricher));
    let json = body_json(get(app, "/api/v1/sync/jobs").await).await;

    let jobs = json["data"].as_array().unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0]["job_id"], job_id.as_str());
    assert_eq!(jobs[0]["status"], "completed");
}
