//! The `JobStore` contract (spec §4.3). `queuectl-store-sqlite` is the
//! concrete implementation; this trait is the seam that lets the queue
//! engine, the worker loop, and the CLI all depend on storage without
//! depending on SQLite specifically — the same role `seesaw::job::JobStore`
//! plays for the teacher's Postgres-backed `PgJobStore`.

use crate::error::Result;
use crate::job::{ConfigEntry, Job, JobState};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// A job handed back by [`JobStore::claim_next`]: just enough to run it.
#[derive(Debug, Clone, PartialEq)]
pub struct AcquiredJob {
    pub id: String,
    pub command: String,
    pub attempts: u32,
    pub max_retries: u32,
}

/// A new job to insert. `id` is generated by the store when absent;
/// `max_retries` falls back to the configured default when absent.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub id: Option<String>,
    pub command: String,
    pub max_retries: Option<u32>,
}

#[async_trait]
pub trait JobStore: Send + Sync {
    /// Initialize schema and seed config defaults. Idempotent.
    async fn init(&self) -> Result<()>;

    /// Insert a new job in `pending` state. Fails with `AlreadyExists` if
    /// `id` is already present (either caller-supplied or colliding with a
    /// generated one, which the caller should retry).
    async fn insert_job(&self, job: NewJob) -> Result<Job>;

    async fn get_job(&self, id: &str) -> Result<Option<Job>>;

    /// Ordered by `created_at` ascending, optionally filtered by state.
    async fn list_jobs(&self, state: Option<JobState>) -> Result<Vec<Job>>;

    async fn count_jobs_by_state(&self) -> Result<BTreeMap<String, i64>>;

    /// Atomically select and claim the oldest eligible job (spec §4.4).
    /// Returns `None` without mutating anything when the queue is empty.
    async fn claim_next(&self, now: DateTime<Utc>) -> Result<Option<AcquiredJob>>;

    /// Transition `processing -> completed`.
    async fn mark_completed(&self, id: &str, attempts: u32, now: DateTime<Utc>) -> Result<()>;

    /// Transition `processing -> failed` or `-> dead` depending on
    /// `attempts` vs `max_retries` (spec §4.4).
    #[allow(clippy::too_many_arguments)]
    async fn mark_failed(
        &self,
        id: &str,
        attempts: u32,
        max_retries: u32,
        error: &str,
        now: DateTime<Utc>,
        backoff_seconds: f64,
    ) -> Result<()>;

    /// Requeue a job (DLQ retry or manual reset): `state=pending, attempts=0`.
    /// Does not clear `last_error`.
    async fn reset_job(&self, id: &str, now: DateTime<Utc>) -> Result<()>;

    /// Unconditional delete. Returns whether a row existed; deleting an
    /// absent id is a no-op, not an error (spec §8).
    async fn delete_job(&self, id: &str) -> Result<bool>;

    async fn get_config(&self, key: &str) -> Result<Option<String>>;

    async fn set_config(&self, key: &str, value: &str) -> Result<()>;

    async fn list_config(&self) -> Result<Vec<ConfigEntry>>;

    /// Insert `key=value` only if absent; a no-op otherwise.
    async fn ensure_config_default(&self, key: &str, value: &str) -> Result<()>;
}
