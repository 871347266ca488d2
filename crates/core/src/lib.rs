//! Pure domain logic for the listing completeness and sync engine.
//!
//! This crate has no database dependencies. Everything here is evaluated
//! against pre-loaded data passed in by the caller, so it can be unit
//! tested without a running store.

pub mod completeness;
pub mod error;
pub mod gap;
pub mod images;
pub mod jobs;
pub mod repair;
pub mod types;
