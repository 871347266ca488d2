//! Gap detection: aggregate completeness analysis over a set of listings.
//!
//! The scan itself is read-only; the caller loads listings from the
//! store, scores each with [`crate::completeness::score_listing`] and
//! feeds the results into a [`GapAccumulator`]. Keeping the accumulation
//! here (zero store deps) lets the aggregate rules be unit tested
//! without a database.

use serde::Serialize;

use crate::completeness::{
    CompletenessReport, Priority, FIELD_DESCRIPTION, FIELD_IMAGES, FIELD_PRICE, FIELD_SKU,
    FIELD_STRUCTURED_ATTRIBUTES,
};

// ---------------------------------------------------------------------------
// Scan limits
// ---------------------------------------------------------------------------

/// Default number of listings examined per scan.
pub const DEFAULT_SCAN_LIMIT: i64 = 500;

/// Maximum number of listings examined per scan. Unbounded scans are
/// deliberately not supported.
pub const MAX_SCAN_LIMIT: i64 = 2000;

/// Clamp a requested scan limit into the supported range.
pub fn clamp_scan_limit(requested: Option<i64>) -> i64 {
    requested.unwrap_or(DEFAULT_SCAN_LIMIT).clamp(1, MAX_SCAN_LIMIT)
}

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

/// How many scanned listings failed each of the five checks.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct FieldMissCounts {
    pub description: i64,
    pub sku: i64,
    pub images: i64,
    pub structured_attributes: i64,
    pub price: i64,
}

impl FieldMissCounts {
    fn increment(&mut self, field: &str) {
        match field {
            FIELD_DESCRIPTION => self.description += 1,
            FIELD_SKU => self.sku += 1,
            FIELD_IMAGES => self.images += 1,
            FIELD_STRUCTURED_ATTRIBUTES => self.structured_attributes += 1,
            FIELD_PRICE => self.price += 1,
            other => tracing::debug!(field = other, "Unknown missing field name"),
        }
    }
}

/// One incomplete listing in the scan output.
#[derive(Debug, Clone, Serialize)]
pub struct IncompleteListing {
    pub item_id: String,
    pub score: i32,
    pub missing_fields: Vec<&'static str>,
    pub priority: Priority,
}

/// Aggregate output of one scan run. Ephemeral analysis output; never
/// persisted.
#[derive(Debug, Clone, Serialize)]
pub struct GapReport {
    pub total_checked: i64,
    pub average_completeness: f64,
    pub missing_by_field: FieldMissCounts,
    pub incomplete_items: Vec<IncompleteListing>,
}

// ---------------------------------------------------------------------------
// Accumulator
// ---------------------------------------------------------------------------

/// Streaming accumulator for a scan run.
#[derive(Debug, Default)]
pub struct GapAccumulator {
    total_checked: i64,
    score_sum: i64,
    missing_by_field: FieldMissCounts,
    incomplete_items: Vec<IncompleteListing>,
}

impl GapAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one scored listing.
    pub fn add(&mut self, item_id: String, report: &CompletenessReport) {
        self.total_checked += 1;
        self.score_sum += i64::from(report.score);

        for field in &report.missing_fields {
            self.missing_by_field.increment(field);
        }

        if let Some(priority) = report.priority() {
            self.incomplete_items.push(IncompleteListing {
                item_id,
                score: report.score,
                missing_fields: report.missing_fields.clone(),
                priority,
            });
        }
    }

    /// Number of listings recorded so far.
    pub fn total_checked(&self) -> i64 {
        self.total_checked
    }

    /// Finish the run and produce the report.
    pub fn finish(self) -> GapReport {
        let average_completeness = if self.total_checked > 0 {
            self.score_sum as f64 / self.total_checked as f64
        } else {
            0.0
        };

        GapReport {
            total_checked: self.total_checked,
            average_completeness,
            missing_by_field: self.missing_by_field,
            incomplete_items: self.incomplete_items,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
