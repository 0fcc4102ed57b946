//! Exponential backoff policy (spec §4.4).
//!
//! `backoff_seconds = backoff_base ^ attempts`, no jitter, no ceiling. This
//! is deliberately more permissive than the teacher's
//! `PgJobStore::mark_failed`, which clamps with `.min(3600)`; the spec's
//! invariant #4 is stated against the un-ceilinged formula, so the clamp is
//! not carried over here (see DESIGN.md).

/// Compute the retry delay, in seconds, for a job that has just failed its
/// `attempts`-th execution.
pub fn backoff_seconds(base: f64, attempts: u32) -> f64 {
    base.powi(attempts as i32)
}
