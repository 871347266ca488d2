//! Listing entity model and DTOs.
//!
//! Maps to the `listings` table. The `image_urls` and `attributes`
//! columns hold raw legacy values exactly as ingested (the image field
//! may use any of the supported encodings); normalization is applied on
//! read, and the raw value is only rewritten when a repair fills an
//! empty field with the canonical encoding.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use relist_core::completeness::ListingFields;
use relist_core::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A row from the `listings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Listing {
    pub id: DbId,
    /// Stable, unique marketplace identifier. Immutable once assigned.
    pub item_id: String,
    pub title: String,
    pub sku: String,
    pub description: String,
    /// Raw stored image field, in whichever legacy encoding it arrived.
    pub image_urls: Option<String>,
    /// Raw stored structured attributes (JSON-shaped text, or not).
    pub attributes: Option<String>,
    pub price: Option<f64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Listing {
    /// Borrow the scored subset of this listing's fields.
    pub fn completeness_fields(&self) -> ListingFields<'_> {
        ListingFields {
            description: &self.description,
            sku: &self.sku,
            image_field: self.image_urls.as_deref(),
            attributes: self.attributes.as_deref(),
            price: self.price,
        }
    }
}

// ---------------------------------------------------------------------------
// Create DTO
// ---------------------------------------------------------------------------

/// DTO for inserting a listing (upstream ingestion and test seeding).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateListing {
    pub item_id: String,
    pub title: String,
    pub sku: String,
    pub description: String,
    pub image_urls: Option<String>,
    pub attributes: Option<String>,
    pub price: Option<f64>,
}
