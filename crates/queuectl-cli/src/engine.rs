//! The control-plane surface (spec §4.7): the operations the `queuectl`
//! binary exposes. Carries no presentation logic — `main.rs` and `output.rs`
//! own formatting, exit codes, and colors. This is the seam an HTTP
//! adapter would sit behind too, were one ever added (spec.md explicitly
//! keeps that out of scope for this workspace; see DESIGN.md).

use queuectl_core::{
    ConfigEntry, EnqueueRequest, Job, JobState, JobStore, NewJob, Paths, QueueError, Result,
};
use queuectl_store_sqlite::SqliteJobStore;
use queuectl_worker::registry::{self, AnnotatedEntry};
use std::collections::BTreeMap;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

/// `{id, pid}` returned by a successful `worker_start`.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SpawnedWorker {
    pub id: String,
    pub pid: u32,
}

/// Outcome of `worker_stop --wait`: ids that never exited within `timeout`.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct StopReport {
    pub survivors: Vec<String>,
}

/// How often `worker_stop --wait` polls pid liveness (spec §4.7: "at ≥2 Hz").
const STOP_POLL_INTERVAL: Duration = Duration::from_millis(400);

pub struct Engine {
    store: Arc<dyn JobStore>,
    paths: Paths,
}

impl Engine {
    /// Resolve paths, ensure directories exist, open the store, and seed
    /// config defaults. Called once per CLI invocation.
    pub async fn open(paths: Paths) -> Result<Self> {
        paths
            .ensure_directories()
            .map_err(|e| QueueError::Store(format!("creating {}: {e}", paths.data_dir.display())))?;
        let store = SqliteJobStore::connect(&paths).await?;
        store.init().await?;
        Ok(Self { store: Arc::new(store), paths })
    }

    pub async fn enqueue(&self, req: EnqueueRequest) -> Result<Job> {
        if req.command.trim().is_empty() {
            return Err(QueueError::InvalidArgument("command must not be empty".to_string()));
        }
        self.store
            .insert_job(NewJob { id: req.id, command: req.command, max_retries: req.max_retries })
            .await
    }

    pub async fn get_job(&self, id: &str) -> Result<Job> {
        self.store
            .get_job(id)
            .await?
            .ok_or_else(|| QueueError::NotFound(format!("no job with id '{id}'")))
    }

    pub async fn list_jobs(&self, state: Option<JobState>) -> Result<Vec<Job>> {
        self.store.list_jobs(state).await
    }

    pub async fn count_by_state(&self) -> Result<BTreeMap<String, i64>> {
        self.store.count_jobs_by_state().await
    }

    pub async fn delete_job(&self, id: &str) -> Result<()> {
        if self.store.delete_job(id).await? {
            Ok(())
        } else {
            Err(QueueError::NotFound(format!("no job with id '{id}'")))
        }
    }

    /// DLQ retry: requeue a job currently in `dead` back to `pending`.
    pub async fn reset_job(&self, id: &str) -> Result<()> {
        let job = self.get_job(id).await?;
        if job.state != JobState::Dead {
            return Err(QueueError::NotInDlq(format!("job '{id}' is not in the dead-letter queue")));
        }
        self.store.reset_job(id, queuectl_core::now()).await
    }

    pub async fn list_dlq(&self) -> Result<Vec<Job>> {
        self.store.list_jobs(Some(JobState::Dead)).await
    }

    /// Delete a DLQ entry specifically, as distinct from `delete_job`: it
    /// first checks the job is actually `dead` (spec_full.md §6 item 2).
    pub async fn delete_dlq_job(&self, id: &str) -> Result<()> {
        let job = self.get_job(id).await?;
        if job.state != JobState::Dead {
            return Err(QueueError::NotInDlq(format!("job '{id}' is not in the dead-letter queue")));
        }
        self.delete_job(id).await
    }

    pub async fn get_config(&self, key: &str) -> Result<Option<String>> {
        self.store.get_config(key).await
    }

    /// The store is a flat map with no schema (spec §3) and accepts any
    /// key; this adapter additionally warns when `key` isn't one queuectl
    /// actually reads, since that's almost always a typo rather than
    /// intentional (SPEC_FULL.md §3 item 2).
    pub async fn set_config(&self, key: &str, value: &str) -> Result<()> {
        if !queuectl_core::KNOWN_CONFIG_KEYS.contains(&key) {
            tracing::warn!(key, "setting unrecognized config key; queuectl never reads this key");
        }
        self.store.set_config(key, value).await
    }

    pub async fn list_config(&self) -> Result<Vec<ConfigEntry>> {
        self.store.list_config().await
    }

    /// Spawn `count` detached worker processes re-entering this same
    /// binary's hidden `__worker-internal` subcommand (spec_full.md §6
    /// item 3). Each gets a fresh generated worker id.
    pub fn worker_start(&self, count: u32) -> Result<Vec<SpawnedWorker>> {
        if count == 0 {
            return Err(QueueError::InvalidArgument("worker count must be at least 1".to_string()));
        }
        let exe = std::env::current_exe()
            .map_err(|e| QueueError::Spawn(format!("resolving current executable: {e}")))?;

        let mut spawned = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let worker_id = queuectl_core::generate_worker_id();
            let child = std::process::Command::new(&exe)
                .arg("__worker-internal")
                .arg("--worker-id")
                .arg(&worker_id)
                .env(queuectl_core::paths::HOME_ENV_VAR, &self.paths.data_dir)
                .stdin(Stdio::null())
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .spawn()
                .map_err(|e| QueueError::Spawn(format!("spawning worker process: {e}")))?;
            // `child` is dropped without waiting; it's a detached
            // long-running process the registry now tracks by pid.
            let pid = child.id();
            registry::spawn(&self.paths, &worker_id, pid)?;
            spawned.push(SpawnedWorker { id: worker_id, pid });
        }
        Ok(spawned)
    }

    /// Stop one worker (`id = Some`) or every registered worker (`id =
    /// None`). With `wait`, polls pid liveness at ≥2 Hz until every
    /// targeted worker exits or `timeout` elapses, then sweeps the
    /// registry and reports any survivors (spec §4.7).
    pub async fn worker_stop(&self, id: Option<&str>, wait: bool, timeout: Duration) -> Result<StopReport> {
        let entries = registry::list_workers(&self.paths)?;
        let targets: Vec<AnnotatedEntry> = match id {
            Some(id) => {
                let matched: Vec<_> = entries.into_iter().filter(|e| e.entry.id == id).collect();
                if matched.is_empty() {
                    return Err(QueueError::NotFound(format!("no worker with id '{id}'")));
                }
                matched
            }
            None => entries,
        };

        for target in &targets {
            registry::request_stop(&self.paths, &target.entry.id)?;
        }

        if !wait {
            return Ok(StopReport::default());
        }

        let deadline = tokio::time::Instant::now() + timeout;
        let mut remaining: Vec<String> = targets.iter().map(|t| t.entry.id.clone()).collect();
        loop {
            remaining.retain(|worker_id| {
                targets
                    .iter()
                    .find(|t| &t.entry.id == worker_id)
                    .map(|t| registry::pid_is_alive(t.entry.pid))
                    .unwrap_or(false)
            });
            if remaining.is_empty() || tokio::time::Instant::now() >= deadline {
                break;
            }
            tokio::time::sleep(STOP_POLL_INTERVAL).await;
        }

        registry::sweep(&self.paths)?;
        Ok(StopReport { survivors: remaining })
    }

    pub fn worker_list(&self) -> Result<Vec<AnnotatedEntry>> {
        registry::list_workers(&self.paths)
    }

    /// Tail the last `lines` lines of a worker's log file.
    pub fn worker_logs(&self, id: &str, lines: usize) -> Result<String> {
        let path = self.paths.worker_log_file(id);
        let text = std::fs::read_to_string(&path)
            .map_err(|_| QueueError::NotFound(format!("no log file for worker '{id}'")))?;
        let all_lines: Vec<&str> = text.lines().collect();
        let start = all_lines.len().saturating_sub(lines);
        Ok(all_lines[start..].join("\n"))
    }
}

/// Exposed for `main.rs`'s `__worker-internal` entrypoint, which needs a
/// raw store handle plus the worker loop, not the rest of the engine.
pub async fn open_store_for_worker(paths: &Paths) -> Result<SqliteJobStore> {
    let store = SqliteJobStore::connect(paths).await?;
    store.init().await?;
    Ok(store)
}
