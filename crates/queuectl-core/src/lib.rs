//! # queuectl-core
//!
//! Domain model and storage contract shared by every queuectl crate.
//!
//! This crate owns:
//! - [`Job`] / [`JobState`] / [`ConfigEntry`] — the persistent data model (§3)
//! - [`clock`] — UTC timestamps in ISO-8601 with a `Z` suffix, and opaque job/worker IDs
//! - [`paths`] — resolving `QUEUECTL_HOME` into concrete file paths
//! - [`backoff`] — the exponential backoff formula shared by the store and the worker loop
//! - [`JobStore`] — the trait a persistence backend must implement; this crate defines
//!   the contract only, `queuectl-store-sqlite` provides the implementation
//! - [`QueueError`] — the stable error taxonomy surfaced to every adapter
//!
//! Nothing in this crate touches a filesystem, a database, or a subprocess.
//! Those concerns live in `queuectl-store-sqlite` and `queuectl-worker`, which
//! depend on this crate but never the other way around.

pub mod backoff;
pub mod clock;
pub mod error;
pub mod job;
pub mod paths;
pub mod store;

pub use backoff::backoff_seconds;
pub use clock::{generate_job_id, generate_worker_id, now, now_iso, parse_timestamp};
pub use error::{QueueError, Result};
pub use job::{
    truncate_last_error, ConfigEntry, EnqueueRequest, Job, JobState, CONFIG_BACKOFF_BASE,
    CONFIG_MAX_RETRIES, CONFIG_POLL_INTERVAL, DEFAULT_BACKOFF_BASE, DEFAULT_MAX_RETRIES,
    DEFAULT_POLL_INTERVAL, KNOWN_CONFIG_KEYS, MAX_LAST_ERROR_LEN,
};
pub use paths::Paths;
pub use store::{AcquiredJob, JobStore, NewJob};
