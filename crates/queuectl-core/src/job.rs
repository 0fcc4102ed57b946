//! The persistent job and config data model (spec §3).

use crate::error::QueueError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Recognized config keys and their defaults (spec §3).
pub const CONFIG_MAX_RETRIES: &str = "max_retries_default";
pub const CONFIG_BACKOFF_BASE: &str = "backoff_base";
pub const CONFIG_POLL_INTERVAL: &str = "poll_interval";

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_BACKOFF_BASE: f64 = 2.0;
pub const DEFAULT_POLL_INTERVAL: f64 = 2.0;

/// Every config key queuectl actually reads. The store itself stays a flat
/// string->string map with no schema (spec §3); this allowlist is consulted
/// only by adapters that want to warn a caller about a probable typo
/// (SPEC_FULL.md §3 item 2).
pub const KNOWN_CONFIG_KEYS: &[&str] = &[CONFIG_MAX_RETRIES, CONFIG_BACKOFF_BASE, CONFIG_POLL_INTERVAL];

/// The five lifecycle positions a job can occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Pending,
    Processing,
    Completed,
    Failed,
    Dead,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Pending => "pending",
            JobState::Processing => "processing",
            JobState::Completed => "completed",
            JobState::Failed => "failed",
            JobState::Dead => "dead",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, QueueError> {
        match raw {
            "pending" => Ok(JobState::Pending),
            "processing" => Ok(JobState::Processing),
            "completed" => Ok(JobState::Completed),
            "failed" => Ok(JobState::Failed),
            "dead" => Ok(JobState::Dead),
            other => Err(QueueError::InvalidArgument(format!(
                "unknown job state '{other}'"
            ))),
        }
    }
}

impl std::fmt::Display for JobState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A job row as persisted by the store (spec §3 field table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    pub command: String,
    pub state: JobState,
    pub attempts: u32,
    pub max_retries: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub available_at: DateTime<Utc>,
    pub processing_started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

/// Longest a stored `last_error` is allowed to be (spec §3, §7).
pub const MAX_LAST_ERROR_LEN: usize = 512;

const TRUNCATION_SENTINEL: &str = "\u{2026} [truncated]";

/// Tail-truncate an error message to [`MAX_LAST_ERROR_LEN`] characters,
/// prefixing a sentinel when truncation actually occurs so a downstream
/// consumer can tell a truncated message from a naturally short one
/// (spec §9 open question, decided in DESIGN.md).
pub fn truncate_last_error(raw: &str) -> String {
    if raw.chars().count() <= MAX_LAST_ERROR_LEN {
        return raw.to_string();
    }
    let sentinel_len = TRUNCATION_SENTINEL.chars().count();
    let keep = MAX_LAST_ERROR_LEN.saturating_sub(sentinel_len);
    let tail: String = {
        let chars: Vec<char> = raw.chars().collect();
        chars[chars.len() - keep..].iter().collect()
    };
    format!("{TRUNCATION_SENTINEL}{tail}")
}

/// A single config row (spec §3: flat string→string map, each carrying `updated_at`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

/// A typed enqueue payload, replacing the original's free-form JSON dict
/// (spec.md §9 redesign note). Unknown keys are rejected at the CLI
/// deserialization boundary via `deny_unknown_fields`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnqueueRequest {
    pub id: Option<String>,
    pub command: String,
    #[serde(default)]
    pub max_retries: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_round_trips_through_str() {
        for state in [
            JobState::Pending,
            JobState::Processing,
            JobState::Completed,
            JobState::Failed,
            JobState::Dead,
        ] {
            assert_eq!(JobState::parse(state.as_str()).unwrap(), state);
        }
    }

    #[test]
    fn unknown_state_is_invalid_argument() {
        let err = JobState::parse("zombie").unwrap_err();
        assert_eq!(err.kind(), "invalid_argument");
    }

    #[test]
    fn short_errors_are_untouched() {
        let raw = "boom";
        assert_eq!(truncate_last_error(raw), raw);
    }

    #[test]
    fn long_errors_are_tail_truncated_with_sentinel() {
        let raw = "x".repeat(1000);
        let truncated = truncate_last_error(&raw);
        assert_eq!(truncated.chars().count(), MAX_LAST_ERROR_LEN);
        assert!(truncated.starts_with("\u{2026} [truncated]"));
        assert!(truncated.ends_with('x'));
    }

    #[test]
    fn enqueue_request_rejects_unknown_fields() {
        let json = r#"{"command": "echo hi", "nonsense": true}"#;
        let result: Result<EnqueueRequest, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn enqueue_request_accepts_minimal_payload() {
        let json = r#"{"command": "echo hi"}"#;
        let req: EnqueueRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.command, "echo hi");
        assert!(req.id.is_none());
        assert!(req.max_retries.is_none());
    }
}
