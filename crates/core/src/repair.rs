//! Non-destructive repair planning.
//!
//! Given the current stored values of a listing and the candidate values
//! returned by the enrichment source, [`plan_repair`] computes the
//! partial update to apply: only fields whose stored value is currently
//! empty or missing are filled. Populated fields are never clobbered by
//! repair data, even when the candidate disagrees with them.

use serde::Deserialize;

use crate::completeness::ListingFields;
use crate::images::{dedup_preserving_order, is_valid_url, to_canonical_encoding};

// ---------------------------------------------------------------------------
// Enrichment payload
// ---------------------------------------------------------------------------

/// Candidate field values fetched from the external enrichment source.
///
/// All fields are optional; the source returns whatever it knows about
/// the item. Candidate values are sanitized during planning, never
/// trusted verbatim.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RepairCandidate {
    pub description: Option<String>,
    pub sku: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    pub attributes: Option<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Planned update
// ---------------------------------------------------------------------------

/// The partial update produced for one listing. `None` fields are left
/// untouched in the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepairFields {
    pub description: Option<String>,
    pub sku: Option<String>,
    /// Canonical JSON-array encoding, ready for write-back.
    pub image_urls: Option<String>,
    /// Serialized JSON object.
    pub attributes: Option<String>,
}

impl RepairFields {
    /// Whether the plan contains nothing to write.
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.sku.is_none()
            && self.image_urls.is_none()
            && self.attributes.is_none()
    }
}

// ---------------------------------------------------------------------------
// Planning
// ---------------------------------------------------------------------------

/// Compute the non-destructive merge of `candidate` into `current`.
///
/// A field is planned for write only when the stored value is blank
/// (`NULL` or whitespace) and the candidate supplies a usable value.
/// Candidate image URLs are validated and deduplicated; the surviving
/// list is serialized in the canonical write-back encoding. Candidate
/// attributes must be a non-empty JSON object.
pub fn plan_repair(current: &ListingFields<'_>, candidate: &RepairCandidate) -> RepairFields {
    let mut plan = RepairFields::default();

    if current.description.trim().is_empty() {
        plan.description = candidate
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);
    }

    if current.sku.trim().is_empty() {
        plan.sku = candidate
            .sku
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);
    }

    if is_blank(current.image_field) {
        let valid: Vec<String> = candidate
            .images
            .iter()
            .map(|u| u.trim())
            .filter(|u| is_valid_url(u))
            .map(str::to_string)
            .collect();
        let valid = dedup_preserving_order(valid);
        if !valid.is_empty() {
            plan.image_urls = Some(to_canonical_encoding(&valid));
        }
    }

    if is_blank(current.attributes) {
        if let Some(serde_json::Value::Object(map)) = &candidate.attributes {
            if !map.is_empty() {
                plan.attributes =
                    serde_json::to_string(&serde_json::Value::Object(map.clone())).ok();
            }
        }
    }

    plan
}

/// A stored raw value counts as missing only when `NULL` or whitespace.
/// Populated-but-malformed values are still populated and stay untouched.
fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
