//! The worker loop itself (spec §4.6): poll, claim, execute, classify,
//! mutate, log, honor stop.
//!
//! Claiming and mutating the job store are async (`queuectl-core::JobStore`
//! runs over `sqlx`); running the subprocess is deliberately synchronous
//! (see `exec`'s module doc), so each execution is handed to a blocking
//! task via `tokio::task::spawn_blocking` rather than the loop itself
//! spawning an OS thread per job.

use crate::exec::{self, Outcome, EXECUTION_TIMEOUT};
use crate::registry;
use queuectl_core::{backoff_seconds, now, now_iso, JobStore, Paths, CONFIG_BACKOFF_BASE, DEFAULT_BACKOFF_BASE};
use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_appender::rolling::{self, RollingFileAppender};

/// Everything the loop needs that isn't the store itself.
#[derive(Clone)]
pub struct WorkerLoopConfig {
    pub worker_id: String,
    pub paths: Paths,
    pub poll_interval: Duration,
}

/// A handle a supervisor (or a test) holds to cooperatively stop a worker
/// loop running in the same process, without going through the control
/// file. `queuectl-cli`'s SIGTERM/SIGINT handlers flip this same flag.
#[derive(Clone)]
pub struct WorkerHandle {
    stop_requested: Arc<AtomicBool>,
}

impl WorkerHandle {
    pub fn new() -> Self {
        Self {
            stop_requested: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
    }

    fn is_stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::SeqCst)
    }
}

impl Default for WorkerHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Run the worker loop until a stop is observed, either via `handle` (an
/// in-process signal) or the on-disk control file (spec §4.6 step 1).
///
/// Returns once the loop exits cleanly. Store errors inside an iteration
/// are logged and the iteration is retried after `poll_interval`, per
/// spec §7 ("errors arising from the store inside the worker loop are
/// fatal to the current iteration").
pub async fn run_worker_loop(config: WorkerLoopConfig, store: Arc<dyn JobStore>, handle: WorkerHandle) {
    let control_path = config.paths.worker_control_file(&config.worker_id);
    let log_path = config.paths.worker_log_file(&config.worker_id);

    let mut log_file = match open_log_file(&log_path) {
        Ok(f) => f,
        Err(e) => {
            warn!(worker_id = %config.worker_id, error = %e, "failed to open worker log file");
            return;
        }
    };

    log_line(&mut log_file, &format!("worker {} starting", config.worker_id));
    info!(worker_id = %config.worker_id, "worker loop starting");

    loop {
        if handle.is_stop_requested() {
            log_line(&mut log_file, "stop requested (in-process signal)");
            break;
        }
        let control = registry::read_control(&control_path, &config.worker_id);
        if control.stop {
            log_line(&mut log_file, "stop requested (control file)");
            break;
        }

        let claimed = match store.claim_next(now()).await {
            Ok(claimed) => claimed,
            Err(e) => {
                warn!(worker_id = %config.worker_id, error = %e, "claim_next failed, retrying after poll_interval");
                log_line(&mut log_file, &format!("store error during claim: {e}"));
                tokio::time::sleep(config.poll_interval).await;
                continue;
            }
        };

        let Some(job) = claimed else {
            tokio::time::sleep(config.poll_interval).await;
            continue;
        };

        info!(worker_id = %config.worker_id, job_id = %job.id, "claimed job, executing");
        let command = job.command.clone();
        let outcome = tokio::task::spawn_blocking(move || exec::execute_command(&command, EXECUTION_TIMEOUT))
            .await
            .unwrap_or_else(|join_err| Outcome::Failed {
                exit_code: -1,
                error_message: format!("Error executing command: worker task panicked: {join_err}"),
            });

        let outcome_now = now();
        match outcome {
            Outcome::Completed => {
                let attempts = job.attempts + 1;
                if let Err(e) = store.mark_completed(&job.id, attempts, outcome_now).await {
                    warn!(worker_id = %config.worker_id, job_id = %job.id, error = %e, "mark_completed failed");
                    log_line(&mut log_file, &format!("job {} completed but store update failed: {e}", job.id));
                } else {
                    log_line(&mut log_file, &format!("job {} completed (attempt {attempts})", job.id));
                }
            }
            Outcome::Failed { exit_code, error_message } => {
                let attempts = job.attempts + 1;
                let backoff_base = resolve_backoff_base(store.as_ref()).await;
                let retryable = attempts <= job.max_retries;
                let delay = if retryable { backoff_seconds(backoff_base, attempts) } else { 0.0 };

                if let Err(e) = store
                    .mark_failed(&job.id, attempts, job.max_retries, &error_message, outcome_now, delay)
                    .await
                {
                    warn!(worker_id = %config.worker_id, job_id = %job.id, error = %e, "mark_failed failed");
                    log_line(
                        &mut log_file,
                        &format!("job {} failed (exit {exit_code}) but store update failed: {e}", job.id),
                    );
                } else if retryable {
                    log_line(
                        &mut log_file,
                        &format!(
                            "job {} failed (exit {exit_code}, attempt {attempts}/{}): {error_message}; retrying in {delay:.1}s",
                            job.id, job.max_retries
                        ),
                    );
                } else {
                    log_line(
                        &mut log_file,
                        &format!(
                            "job {} exhausted retries (exit {exit_code}, attempt {attempts}/{}): {error_message}; moved to dead-letter queue",
                            job.id, job.max_retries
                        ),
                    );
                }
            }
        }
    }

    log_line(&mut log_file, &format!("worker {} stopped", config.worker_id));
    registry::remove_control_file(&config.paths, &config.worker_id);
    info!(worker_id = %config.worker_id, "worker loop exited");
}

async fn resolve_backoff_base(store: &dyn JobStore) -> f64 {
    match store.get_config(CONFIG_BACKOFF_BASE).await {
        Ok(Some(raw)) => raw.parse::<f64>().unwrap_or(DEFAULT_BACKOFF_BASE),
        _ => DEFAULT_BACKOFF_BASE,
    }
}

/// A non-rotating append-only writer for one worker's log file, built on
/// `tracing-appender`'s rolling-file machinery (spec §4.2) rather than a
/// hand-rolled `OpenOptions` append loop — `rolling::never` gives the same
/// crash-safe append semantics without reimplementing them.
fn open_log_file(path: &std::path::Path) -> std::io::Result<RollingFileAppender> {
    let dir = path.parent().unwrap_or_else(|| std::path::Path::new("."));
    std::fs::create_dir_all(dir)?;
    let file_name = path
        .file_name()
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::InvalidInput, "log path has no file name"))?;
    Ok(rolling::never(dir, file_name))
}

fn log_line(file: &mut RollingFileAppender, message: &str) {
    let _ = writeln!(file, "{} {}", now_iso(), message);
    let _ = file.flush();
}
