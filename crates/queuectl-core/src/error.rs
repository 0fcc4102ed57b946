//! Error taxonomy shared by every queuectl crate and adapter.
//!
//! Every failure carries a short, stable `kind()` label plus a one-line
//! message (spec §7). Adapters map `kind()` to exit codes or HTTP statuses;
//! this crate knows about neither.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueueError {
    /// Caller-correctable: malformed input to enqueue/worker_start/etc.
    #[error("{0}")]
    InvalidArgument(String),

    /// Caller-correctable: a job id collided with an existing row.
    #[error("{0}")]
    AlreadyExists(String),

    /// Caller-correctable: no job/worker/log with that id.
    #[error("{0}")]
    NotFound(String),

    /// Caller-correctable: reset/delete via the DLQ surface on a job not in `dead`.
    #[error("{0}")]
    NotInDlq(String),

    /// Transient: the persistence layer failed. Surfaced with its message.
    #[error("{0}")]
    Store(String),

    /// Starting a worker process failed.
    #[error("{0}")]
    Spawn(String),
}

impl QueueError {
    /// Stable, short label a caller can branch on without parsing the message.
    pub fn kind(&self) -> &'static str {
        match self {
            QueueError::InvalidArgument(_) => "invalid_argument",
            QueueError::AlreadyExists(_) => "already_exists",
            QueueError::NotFound(_) => "not_found",
            QueueError::NotInDlq(_) => "not_in_dlq",
            QueueError::Store(_) => "store_error",
            QueueError::Spawn(_) => "spawn_error",
        }
    }

    /// Whether this error is the caller's fault (as opposed to a transient
    /// engine-side failure). Adapters use this to pick a 4xx vs 5xx family.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            QueueError::InvalidArgument(_)
                | QueueError::AlreadyExists(_)
                | QueueError::NotFound(_)
                | QueueError::NotInDlq(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, QueueError>;
