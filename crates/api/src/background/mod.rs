//! Background tasks.
//!
//! `repair` holds the per-job runner spawned by the repair endpoint;
//! `job_retention` is a long-running cleanup loop spawned at startup
//! via `tokio::spawn` with a [`tokio_util::sync::CancellationToken`]
//! for graceful shutdown.

pub mod job_retention;
pub mod repair;
