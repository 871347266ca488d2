//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod listing_repo;
pub mod sync_job_repo;

pub use listing_repo::ListingRepo;
pub use sync_job_repo::SyncJobRepo;
