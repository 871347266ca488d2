//! Listing completeness scoring.
//!
//! Five weighted field checks, each worth 20 points, summed to a 0-100
//! score. Scoring is pure: it is evaluated against a [`ListingFields`]
//! view passed in by the caller, with no store access, so it can be unit
//! tested standalone and applied uniformly by the scan and repair paths.

use serde::Serialize;

use crate::images::normalize_image_field;

// ---------------------------------------------------------------------------
// Field name constants
// ---------------------------------------------------------------------------

pub const FIELD_DESCRIPTION: &str = "description";
pub const FIELD_SKU: &str = "sku";
pub const FIELD_IMAGES: &str = "images";
pub const FIELD_STRUCTURED_ATTRIBUTES: &str = "structured_attributes";
pub const FIELD_PRICE: &str = "price";

/// The five checked fields, in the fixed reporting order.
pub const CHECKED_FIELDS: &[&str] = &[
    FIELD_DESCRIPTION,
    FIELD_SKU,
    FIELD_IMAGES,
    FIELD_STRUCTURED_ATTRIBUTES,
    FIELD_PRICE,
];

// ---------------------------------------------------------------------------
// Scoring constants
// ---------------------------------------------------------------------------

/// Points awarded per passed check.
pub const POINTS_PER_CHECK: i32 = 20;

/// Minimum description length (characters) to count as present.
pub const MIN_DESCRIPTION_LENGTH: usize = 50;

/// Listings scoring at or above this are considered complete.
pub const COMPLETE_THRESHOLD: i32 = 90;

/// Scores below this are high priority.
pub const HIGH_PRIORITY_BELOW: i32 = 50;

/// Scores below this (and at or above the high bound) are medium priority.
pub const MEDIUM_PRIORITY_BELOW: i32 = 70;

// ---------------------------------------------------------------------------
// Input view
// ---------------------------------------------------------------------------

/// The scored subset of a listing's fields, borrowed from the stored row.
///
/// `image_field` and `attributes` are the raw stored values; both are
/// parsed during scoring (the image field through the normalizer, the
/// attributes as JSON).
#[derive(Debug, Clone, Copy)]
pub struct ListingFields<'a> {
    pub description: &'a str,
    pub sku: &'a str,
    pub image_field: Option<&'a str>,
    pub attributes: Option<&'a str>,
    pub price: Option<f64>,
}

// ---------------------------------------------------------------------------
// Priority
// ---------------------------------------------------------------------------

/// Repair priority tier for an incomplete listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    /// Derive the priority tier for an incomplete score.
    ///
    /// Only meaningful below [`COMPLETE_THRESHOLD`]; complete listings
    /// have no priority (see [`CompletenessReport::priority`]).
    fn for_score(score: i32) -> Self {
        if score < HIGH_PRIORITY_BELOW {
            Self::High
        } else if score < MEDIUM_PRIORITY_BELOW {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// The outcome of scoring one listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletenessReport {
    /// 0-100, always a multiple of 20.
    pub score: i32,
    /// Names of failed checks, in [`CHECKED_FIELDS`] order.
    pub missing_fields: Vec<&'static str>,
}

impl CompletenessReport {
    /// Whether the listing meets the completeness threshold.
    pub fn is_complete(&self) -> bool {
        self.score >= COMPLETE_THRESHOLD
    }

    /// Priority tier; `None` for complete listings.
    pub fn priority(&self) -> Option<Priority> {
        if self.is_complete() {
            None
        } else {
            Some(Priority::for_score(self.score))
        }
    }
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Score a listing's five checked fields.
///
/// Each check contributes [`POINTS_PER_CHECK`] points; failed checks are
/// reported by name in a stable order.
pub fn score_listing(fields: &ListingFields<'_>) -> CompletenessReport {
    let checks: [(&'static str, bool); 5] = [
        (FIELD_DESCRIPTION, has_description(fields.description)),
        (FIELD_SKU, has_sku(fields.sku)),
        (FIELD_IMAGES, has_images(fields.image_field)),
        (
            FIELD_STRUCTURED_ATTRIBUTES,
            has_structured_attributes(fields.attributes),
        ),
        (FIELD_PRICE, has_price(fields.price)),
    ];

    let mut score = 0;
    let mut missing_fields = Vec::new();
    for (name, passed) in checks {
        if passed {
            score += POINTS_PER_CHECK;
        } else {
            missing_fields.push(name);
        }
    }

    CompletenessReport {
        score,
        missing_fields,
    }
}

// ---------------------------------------------------------------------------
// Individual checks
// ---------------------------------------------------------------------------

/// Description present with a minimum useful length.
fn has_description(description: &str) -> bool {
    description.trim().chars().count() >= MIN_DESCRIPTION_LENGTH
}

/// SKU non-empty after trimming.
fn has_sku(sku: &str) -> bool {
    !sku.trim().is_empty()
}

/// At least one valid image URL after normalization.
fn has_images(image_field: Option<&str>) -> bool {
    !normalize_image_field(image_field).is_empty()
}

/// Attributes parse as JSON and form a non-empty object or array.
///
/// The check is binary by observed behaviour; the contents are not
/// inspected further.
fn has_structured_attributes(attributes: Option<&str>) -> bool {
    let Some(raw) = attributes else {
        return false;
    };
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Object(map)) => !map.is_empty(),
        Ok(serde_json::Value::Array(entries)) => !entries.is_empty(),
        _ => false,
    }
}

/// Price present and strictly positive.
fn has_price(price: Option<f64>) -> bool {
    price.is_some_and(|p| p > 0.0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
