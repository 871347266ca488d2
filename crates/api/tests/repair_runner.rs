//! Integration tests driving the repair runner directly, without the
//! HTTP layer, to pin down its bookkeeping contract.

mod common;

use std::sync::Arc;

use common::StubEnricher;
use sqlx::PgPool;

use relist_api::background::repair::run_repair_job;
use relist_db::models::listing::CreateListing;
use relist_db::models::status::SyncJobStatus;
use relist_db::models::sync_job::CreateSyncJob;
use relist_db::repositories::{ListingRepo, SyncJobRepo};
use relist_enrich::EnrichmentSource;

/// Create a running job over the given item ids and drive it with the
/// given enricher until it returns.
async fn run_job(
    pool: &PgPool,
    enricher: Arc<dyn EnrichmentSource>,
    item_ids: Vec<String>,
) -> String {
    let job = SyncJobRepo::create(
        pool,
        &CreateSyncJob {
            job_id: format!("sync_test_{}", item_ids.len()),
            item_ids,
        },
    )
    .await
    .unwrap();

    run_repair_job(
        pool.clone(),
        enricher,
        job.job_id.clone(),
        job.snapshot_item_ids(),
    )
    .await;

    job.job_id
}

// ---------------------------------------------------------------------------
// Test: a single record failure does not fail the job
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn one_failed_record_out_of_ten(pool: PgPool) {
    let mut enricher = StubEnricher::new();
    let mut item_ids = Vec::new();
    for i in 0..10 {
        let item_id = format!("item-{i}");
        common::seed_incomplete_listing(&pool, &item_id).await;
        enricher = enricher.with_candidate(&item_id, common::full_candidate());
        item_ids.push(item_id);
    }
    // The 4th record's enrichment call fails.
    let enricher = enricher.with_failure("item-3");

    let job_id = run_job(&pool, Arc::new(enricher), item_ids).await;

    let job = SyncJobRepo::find_by_job_id(&pool, &job_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(job.status_id, SyncJobStatus::Completed.id());
    assert_eq!(job.total_items, 10);
    assert_eq!(job.processed_items, 9);
    assert_eq!(job.failed_items, 1);
    assert_eq!(job.current_phase, "completed");
    assert!(job.completed_at.is_some());
    assert!(job.error_message.is_none());

    // The failed record was left untouched.
    let untouched = ListingRepo::find_by_item_id(&pool, "item-3")
        .await
        .unwrap()
        .unwrap();
    assert!(untouched.description.is_empty());
}

// ---------------------------------------------------------------------------
// Test: the runner merges non-destructively
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn runner_fills_gaps_without_clobbering(pool: PgPool) {
    // Populated sku, empty description/images/attributes.
    ListingRepo::create(
        &pool,
        &CreateListing {
            item_id: "keep-sku".to_string(),
            title: "Hand-thrown vase".to_string(),
            sku: "ORIGINAL-SKU".to_string(),
            price: Some(30.0),
            ..CreateListing::default()
        },
    )
    .await
    .unwrap();

    let enricher = StubEnricher::new().with_candidate("keep-sku", common::full_candidate());
    let job_id = run_job(&pool, Arc::new(enricher), vec!["keep-sku".to_string()]).await;

    let job = SyncJobRepo::find_by_job_id(&pool, &job_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(job.processed_items, 1);
    assert_eq!(job.failed_items, 0);

    let listing = ListingRepo::find_by_item_id(&pool, "keep-sku")
        .await
        .unwrap()
        .unwrap();
    // Gaps filled, populated field kept.
    assert!(!listing.description.is_empty());
    assert!(listing.attributes.is_some());
    assert_eq!(listing.sku, "ORIGINAL-SKU");
}

// ---------------------------------------------------------------------------
// Test: a snapshot id missing from the store counts as failed
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn vanished_listing_counts_as_failed(pool: PgPool) {
    common::seed_incomplete_listing(&pool, "present").await;

    let enricher = StubEnricher::new().with_candidate("present", common::full_candidate());
    let job_id = run_job(
        &pool,
        Arc::new(enricher),
        vec!["vanished".to_string(), "present".to_string()],
    )
    .await;

    let job = SyncJobRepo::find_by_job_id(&pool, &job_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(job.status_id, SyncJobStatus::Completed.id());
    assert_eq!(job.processed_items, 1);
    assert_eq!(job.failed_items, 1);
}

// ---------------------------------------------------------------------------
// Test: an enrichment with nothing new still counts as processed
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn empty_candidate_still_counts_as_processed(pool: PgPool) {
    common::seed_incomplete_listing(&pool, "no-data").await;

    // Stub returns an empty candidate for unscripted items.
    let enricher = StubEnricher::new();
    let job_id = run_job(&pool, Arc::new(enricher), vec!["no-data".to_string()]).await;

    let job = SyncJobRepo::find_by_job_id(&pool, &job_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(job.processed_items, 1);
    assert_eq!(job.failed_items, 0);
    assert_eq!(job.status_id, SyncJobStatus::Completed.id());
}
