//! Sync job identifiers, phase derivation and completion estimation.
//!
//! A repair job's lifecycle status lives in the database; the helpers
//! here are the pure parts of the state machine: deriving the display
//! phase from progress counters and estimating time to completion.

use rand::Rng;

use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Snapshot bounds
// ---------------------------------------------------------------------------

/// Maximum number of incomplete listings captured in one job snapshot.
pub const MAX_REPAIR_BATCH: usize = 100;

// ---------------------------------------------------------------------------
// Phases
// ---------------------------------------------------------------------------

/// Progress ratio below which a job is still initializing.
pub const INITIALIZING_BELOW: f64 = 0.10;
/// Progress ratio below which a job reports the description pass.
pub const DESCRIPTIONS_BELOW: f64 = 0.50;
/// Progress ratio below which a job reports the image pass.
pub const IMAGES_BELOW: f64 = 0.80;

/// Display phase of a running sync job.
///
/// Phases are derived from the `processed / total` ratio and exist for
/// progress display only; they carry no control-flow meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Initializing,
    ProcessingDescriptions,
    ProcessingImages,
    Finalizing,
    /// Reported once the job reaches `completed` status, regardless of
    /// the counter ratio.
    Completed,
}

impl SyncPhase {
    /// The persisted/serialized phase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Initializing => "initializing",
            Self::ProcessingDescriptions => "processing_descriptions",
            Self::ProcessingImages => "processing_images",
            Self::Finalizing => "finalizing",
            Self::Completed => "completed",
        }
    }
}

/// Derive the display phase from progress counters.
pub fn phase_for_progress(processed: i32, total: i32) -> SyncPhase {
    if total <= 0 {
        return SyncPhase::Initializing;
    }
    let ratio = f64::from(processed) / f64::from(total);
    if ratio < INITIALIZING_BELOW {
        SyncPhase::Initializing
    } else if ratio < DESCRIPTIONS_BELOW {
        SyncPhase::ProcessingDescriptions
    } else if ratio < IMAGES_BELOW {
        SyncPhase::ProcessingImages
    } else {
        SyncPhase::Finalizing
    }
}

// ---------------------------------------------------------------------------
// Job identifiers
// ---------------------------------------------------------------------------

/// Generate a new public job identifier.
///
/// Format: `sync_<UTC timestamp>_<random hex suffix>`, e.g.
/// `sync_20260806143012_9f3ab1c0`. The timestamp prefix keeps ids
/// sortable in logs; the random suffix makes collisions within one
/// second a non-issue.
pub fn generate_job_id(now: Timestamp) -> String {
    let suffix: u32 = rand::rng().random();
    format!("sync_{}_{suffix:08x}", now.format("%Y%m%d%H%M%S"))
}

// ---------------------------------------------------------------------------
// Completion estimation
// ---------------------------------------------------------------------------

/// Estimate minutes until a running job finishes.
///
/// Uses the observed throughput (`processed / elapsed minutes`). Returns
/// `None` when no items have been processed yet or no time has elapsed,
/// since no meaningful rate exists in either case.
pub fn estimate_minutes_remaining(
    processed: i32,
    total: i32,
    elapsed: chrono::Duration,
) -> Option<f64> {
    if processed <= 0 {
        return None;
    }
    let elapsed_minutes = elapsed.num_milliseconds() as f64 / 60_000.0;
    if elapsed_minutes <= 0.0 {
        return None;
    }

    let items_per_minute = f64::from(processed) / elapsed_minutes;
    let remaining = f64::from((total - processed).max(0));
    Some(remaining / items_per_minute)
}

/// Project the estimated completion instant for a running job.
pub fn estimated_completion(
    processed: i32,
    total: i32,
    started_at: Timestamp,
    now: Timestamp,
) -> Option<Timestamp> {
    estimate_minutes_remaining(processed, total, now - started_at).map(|minutes| {
        now + chrono::Duration::milliseconds((minutes * 60_000.0).round() as i64)
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    // -- phase derivation -----------------------------------------------------

    #[test]
    fn phase_starts_initializing() {
        assert_eq!(phase_for_progress(0, 100), SyncPhase::Initializing);
        assert_eq!(phase_for_progress(9, 100), SyncPhase::Initializing);
    }

    #[test]
    fn phase_boundaries_at_10_50_80_percent() {
        assert_eq!(
            phase_for_progress(10, 100),
            SyncPhase::ProcessingDescriptions
        );
        assert_eq!(
            phase_for_progress(49, 100),
            SyncPhase::ProcessingDescriptions
        );
        assert_eq!(phase_for_progress(50, 100), SyncPhase::ProcessingImages);
        assert_eq!(phase_for_progress(79, 100), SyncPhase::ProcessingImages);
        assert_eq!(phase_for_progress(80, 100), SyncPhase::Finalizing);
        assert_eq!(phase_for_progress(100, 100), SyncPhase::Finalizing);
    }

    #[test]
    fn phase_with_zero_total_stays_initializing() {
        assert_eq!(phase_for_progress(0, 0), SyncPhase::Initializing);
    }

    #[test]
    fn phase_names_are_stable() {
        assert_eq!(SyncPhase::Initializing.as_str(), "initializing");
        assert_eq!(
            SyncPhase::ProcessingDescriptions.as_str(),
            "processing_descriptions"
        );
        assert_eq!(SyncPhase::ProcessingImages.as_str(), "processing_images");
        assert_eq!(SyncPhase::Finalizing.as_str(), "finalizing");
        assert_eq!(SyncPhase::Completed.as_str(), "completed");
    }

    // -- job id generation ----------------------------------------------------

    #[test]
    fn job_id_has_timestamp_prefix_and_hex_suffix() {
        let now = Utc.with_ymd_and_hms(2026, 8, 6, 14, 30, 12).unwrap();
        let id = generate_job_id(now);

        assert!(id.starts_with("sync_20260806143012_"));
        let suffix = id.rsplit('_').next().unwrap();
        assert_eq!(suffix.len(), 8);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn job_ids_are_unique_within_one_second() {
        let now = Utc.with_ymd_and_hms(2026, 8, 6, 14, 30, 12).unwrap();
        assert_ne!(generate_job_id(now), generate_job_id(now));
    }

    // -- completion estimation ------------------------------------------------

    #[test]
    fn no_estimate_before_first_processed_item() {
        assert_eq!(
            estimate_minutes_remaining(0, 10, Duration::minutes(5)),
            None
        );
    }

    #[test]
    fn no_estimate_with_zero_elapsed_time() {
        assert_eq!(estimate_minutes_remaining(5, 10, Duration::zero()), None);
    }

    #[test]
    fn estimate_from_observed_throughput() {
        // 5 items in 5 minutes -> 1 item/minute -> 5 minutes remaining.
        let estimate = estimate_minutes_remaining(5, 10, Duration::minutes(5)).unwrap();
        assert!((estimate - 5.0).abs() < 1e-9);
    }

    #[test]
    fn estimate_is_zero_when_all_items_processed() {
        let estimate = estimate_minutes_remaining(10, 10, Duration::minutes(2)).unwrap();
        assert_eq!(estimate, 0.0);
    }

    #[test]
    fn estimated_completion_projects_from_now() {
        let started = Utc.with_ymd_and_hms(2026, 8, 6, 12, 0, 0).unwrap();
        let now = started + Duration::minutes(5);

        let eta = estimated_completion(5, 10, started, now).unwrap();
        assert_eq!(eta, now + Duration::minutes(5));
    }

    #[test]
    fn estimated_completion_none_at_start() {
        let started = Utc.with_ymd_and_hms(2026, 8, 6, 12, 0, 0).unwrap();
        assert_eq!(estimated_completion(0, 10, started, started), None);
    }
}
