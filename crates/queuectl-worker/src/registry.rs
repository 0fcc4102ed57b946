//! Cross-process worker registry and per-worker control files (spec §4.5).
//!
//! Both documents are small, frequently-read JSON files shared between a
//! supervisor (writer) and the workers themselves (readers, and
//! self-deleters of their own control file on exit). Every write goes
//! through [`write_json_atomic`]: write to a sibling temp file, then
//! `rename` over the target, so a concurrent reader always sees either the
//! whole previous document or the whole new one, never a partial write.

use chrono::{DateTime, Utc};
use queuectl_core::clock::{format_timestamp, parse_timestamp};
use queuectl_core::{Paths, QueueError};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;

/// One row of the registry list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegistryEntry {
    pub id: String,
    pub pid: u32,
    pub started_at: DateTime<Utc>,
}

/// A registry entry annotated with whether its pid currently answers to a
/// liveness probe (spec §4.5 `list_workers`).
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedEntry {
    pub entry: RegistryEntry,
    pub alive: bool,
}

/// The per-worker control record (spec §3, §6).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ControlRecord {
    pub id: String,
    pub stop: bool,
    pub created_at: DateTime<Utc>,
}

impl ControlRecord {
    fn fresh(id: &str) -> Self {
        Self {
            id: id.to_string(),
            stop: false,
            created_at: queuectl_core::now(),
        }
    }
}

/// Write `value` to `path` via write-temp-then-rename, pretty-printed.
/// `serde_json`'s default (non-`preserve_order`) map representation sorts
/// object keys alphabetically, matching spec §6's "sorted keys" shape.
fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), QueueError> {
    let as_value = serde_json::to_value(value)
        .map_err(|e| QueueError::Store(format!("serializing {}: {e}", path.display())))?;
    let text = serde_json::to_string_pretty(&as_value)
        .map_err(|e| QueueError::Store(format!("encoding {}: {e}", path.display())))?;

    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let tmp_path = dir.join(format!(
        ".{}.tmp",
        path.file_name().and_then(|n| n.to_str()).unwrap_or("tmp")
    ));
    std::fs::write(&tmp_path, text)
        .map_err(|e| QueueError::Store(format!("writing {}: {e}", tmp_path.display())))?;
    std::fs::rename(&tmp_path, path)
        .map_err(|e| QueueError::Store(format!("renaming into {}: {e}", path.display())))?;
    Ok(())
}

fn read_registry(path: &Path) -> Result<Vec<RegistryEntry>, QueueError> {
    match std::fs::read_to_string(path) {
        Ok(text) => {
            serde_json::from_str(&text).map_err(|e| QueueError::Store(format!("corrupt registry: {e}")))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(QueueError::Store(format!("reading registry: {e}"))),
    }
}

/// Read a worker's control file. A missing file reads as `stop=false`; a
/// malformed one is also treated as `stop=false` rather than crashing the
/// worker loop (spec §4.6 step 1: "do not crash").
pub fn read_control(path: &Path, worker_id: &str) -> ControlRecord {
    match std::fs::read_to_string(path) {
        Ok(text) => serde_json::from_str(&text).unwrap_or_else(|_| ControlRecord::fresh(worker_id)),
        Err(_) => ControlRecord::fresh(worker_id),
    }
}

/// Append `{id, pid, started_at}` to the registry and write a fresh control
/// file with `stop=false` for it. Does not itself start a process; the
/// caller is responsible for actually spawning `worker_id`'s OS process.
pub fn spawn(paths: &Paths, worker_id: &str, pid: u32) -> Result<(), QueueError> {
    let mut entries = read_registry(&paths.registry_file)?;
    entries.retain(|e| e.id != worker_id);
    entries.push(RegistryEntry {
        id: worker_id.to_string(),
        pid,
        started_at: queuectl_core::now(),
    });
    write_json_atomic(&paths.registry_file, &entries)?;
    write_json_atomic(&paths.worker_control_file(worker_id), &ControlRecord::fresh(worker_id))
}

/// Set `stop=true` on `worker_id`'s control file, creating it fresh (with
/// `stop=true`) if it is absent.
pub fn request_stop(paths: &Paths, worker_id: &str) -> Result<(), QueueError> {
    let control_path = paths.worker_control_file(worker_id);
    let mut record = read_control(&control_path, worker_id);
    record.stop = true;
    write_json_atomic(&control_path, &record)
}

/// Probe whether `pid` answers to a no-op signal (liveness check only; does
/// not affect the process). Grounded in `libc::kill(pid, 0)`.
pub fn pid_is_alive(pid: u32) -> bool {
    // SAFETY: signal 0 sends no signal; it only checks permission/existence.
    unsafe { libc::kill(pid as libc::pid_t, 0) == 0 }
}

/// Read the registry and annotate each entry with current liveness.
pub fn list_workers(paths: &Paths) -> Result<Vec<AnnotatedEntry>, QueueError> {
    let entries = read_registry(&paths.registry_file)?;
    Ok(entries
        .into_iter()
        .map(|entry| {
            let alive = pid_is_alive(entry.pid);
            AnnotatedEntry { entry, alive }
        })
        .collect())
}

/// Drop entries whose pid is no longer alive and rewrite the registry.
/// Returns the surviving entries.
pub fn sweep(paths: &Paths) -> Result<Vec<RegistryEntry>, QueueError> {
    let entries = read_registry(&paths.registry_file)?;
    let alive: Vec<RegistryEntry> = entries.into_iter().filter(|e| pid_is_alive(e.pid)).collect();
    write_json_atomic(&paths.registry_file, &alive)?;
    Ok(alive)
}

/// Best-effort removal of a worker's control file, ignoring "already gone".
pub fn remove_control_file(paths: &Paths, worker_id: &str) {
    let _ = std::fs::remove_file(paths.worker_control_file(worker_id));
}

/// Round-trip a timestamp the same way the rest of the crate does, for
/// callers that hand-build a [`RegistryEntry`] from a raw ISO-8601 string.
pub fn parse_started_at(raw: &str) -> Result<DateTime<Utc>, QueueError> {
    parse_timestamp(raw)
}

pub fn format_started_at(ts: &DateTime<Utc>) -> String {
    format_timestamp(ts)
}
