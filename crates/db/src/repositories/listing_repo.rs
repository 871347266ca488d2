//! Repository for the `listings` table.

use sqlx::PgPool;

use relist_core::repair::RepairFields;

use crate::models::listing::{CreateListing, Listing};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, item_id, title, sku, description, image_urls, \
    attributes, price, created_at, updated_at";

/// Provides read and repair-write access to listings.
///
/// Listings are created by upstream ingestion; this subsystem reads them
/// for scanning and fills empty fields during repair. It never deletes.
pub struct ListingRepo;

impl ListingRepo {
    /// Insert a new listing, returning the created row.
    pub async fn create(pool: &PgPool, body: &CreateListing) -> Result<Listing, sqlx::Error> {
        let query = format!(
            "INSERT INTO listings (item_id, title, sku, description, image_urls, attributes, price)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Listing>(&query)
            .bind(&body.item_id)
            .bind(&body.title)
            .bind(&body.sku)
            .bind(&body.description)
            .bind(&body.image_urls)
            .bind(&body.attributes)
            .bind(body.price)
            .fetch_one(pool)
            .await
    }

    /// List the most recently updated listings, newest first.
    pub async fn list_recent(pool: &PgPool, limit: i64) -> Result<Vec<Listing>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM listings
             ORDER BY updated_at DESC
             LIMIT $1"
        );
        sqlx::query_as::<_, Listing>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Find a single listing by its marketplace item id.
    pub async fn find_by_item_id(
        pool: &PgPool,
        item_id: &str,
    ) -> Result<Option<Listing>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM listings WHERE item_id = $1");
        sqlx::query_as::<_, Listing>(&query)
            .bind(item_id)
            .fetch_optional(pool)
            .await
    }

    /// Total number of listings in the store.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM listings")
            .fetch_one(pool)
            .await
    }

    /// Apply a repair plan to a listing.
    ///
    /// Only the fields present in the plan are touched, and each SET
    /// clause carries a `COALESCE(NULLIF(col, ''), $n)` guard: if the
    /// stored value became non-empty since the plan was computed, the
    /// existing value wins. Repair never overwrites populated data.
    ///
    /// Returns `true` when a row was updated, `false` for an unknown
    /// item id or an empty plan.
    pub async fn apply_repair(
        pool: &PgPool,
        item_id: &str,
        fields: &RepairFields,
    ) -> Result<bool, sqlx::Error> {
        let mut sets: Vec<String> = Vec::new();
        let mut values: Vec<&str> = Vec::new();

        for (column, value) in [
            ("description", fields.description.as_deref()),
            ("sku", fields.sku.as_deref()),
            ("image_urls", fields.image_urls.as_deref()),
            ("attributes", fields.attributes.as_deref()),
        ] {
            if let Some(value) = value {
                values.push(value);
                sets.push(format!(
                    "{column} = COALESCE(NULLIF({column}, ''), ${})",
                    values.len() + 1
                ));
            }
        }

        if sets.is_empty() {
            return Ok(false);
        }

        let query = format!("UPDATE listings SET {} WHERE item_id = $1", sets.join(", "));

        let mut q = sqlx::query(&query).bind(item_id);
        for value in values {
            q = q.bind(value);
        }

        let result = q.execute(pool).await?;
        Ok(result.rows_affected() > 0)
    }
}
