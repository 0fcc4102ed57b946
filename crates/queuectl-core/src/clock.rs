//! UTC timestamps in ISO-8601 with a trailing `Z`, and opaque job/worker IDs.
//!
//! Mirrors the original `queuectl.utils` helpers: a `Z`-suffixed timestamp is
//! written everywhere, but a parser must accept either `Z` or an explicit
//! `+00:00` (spec §6).

use crate::error::QueueError;
use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

/// The current UTC instant.
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// The current UTC instant formatted as ISO-8601 with microsecond precision
/// and a literal `Z` suffix, e.g. `2024-01-02T03:04:05.678901Z`.
pub fn now_iso() -> String {
    format_timestamp(&now())
}

/// Format a UTC instant the way queuectl persists it everywhere: `Z` suffix,
/// microsecond precision.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Parse a timestamp accepting either a `Z` suffix or an explicit `+00:00` offset.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, QueueError> {
    let normalized = if let Some(stripped) = raw.strip_suffix('Z') {
        format!("{stripped}+00:00")
    } else {
        raw.to_string()
    };
    DateTime::parse_from_rfc3339(&normalized)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| QueueError::InvalidArgument(format!("invalid timestamp '{raw}': {err}")))
}

/// Generate an opaque, short job id: `job-<8 hex chars>`.
pub fn generate_job_id() -> String {
    format!("job-{}", short_hex())
}

/// Generate an opaque, short worker id: `worker-<8 hex chars>`.
pub fn generate_worker_id() -> String {
    format!("worker-{}", short_hex())
}

fn short_hex() -> String {
    let simple = Uuid::new_v4().simple().to_string();
    simple[..8].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_z_suffix() {
        let ts = now();
        let formatted = format_timestamp(&ts);
        assert!(formatted.ends_with('Z'));
        let parsed = parse_timestamp(&formatted).unwrap();
        // Sub-microsecond precision may be lost; compare at microsecond granularity.
        assert_eq!(parsed.timestamp_micros(), ts.timestamp_micros());
    }

    #[test]
    fn accepts_explicit_offset() {
        let parsed = parse_timestamp("2024-01-02T03:04:05.678901+00:00").unwrap();
        assert_eq!(parsed.timestamp_micros(), parse_timestamp("2024-01-02T03:04:05.678901Z").unwrap().timestamp_micros());
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_timestamp("not-a-timestamp").is_err());
    }

    #[test]
    fn ids_are_prefixed_and_short() {
        let job_id = generate_job_id();
        let worker_id = generate_worker_id();
        assert!(job_id.starts_with("job-"));
        assert!(worker_id.starts_with("worker-"));
        assert_eq!(job_id.len(), "job-".len() + 8);
    }
}
