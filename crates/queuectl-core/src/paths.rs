//! Resolve `QUEUECTL_HOME` into concrete file paths (spec §6).
//!
//! This replaces the original's module-level `refresh_paths()` global
//! mutation with a plain value constructed once per process and threaded
//! through explicitly (spec.md §9 design note on global mutable state).

use std::env;
use std::io;
use std::path::PathBuf;

/// Environment variable naming the queuectl data root.
pub const HOME_ENV_VAR: &str = "QUEUECTL_HOME";

/// Resolved filesystem layout for one queuectl data root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub data_dir: PathBuf,
    pub db_file: PathBuf,
    pub worker_dir: PathBuf,
    pub log_dir: PathBuf,
    pub registry_file: PathBuf,
}

impl Paths {
    /// Resolve from `QUEUECTL_HOME`, defaulting to `<home>/.queuectl`.
    pub fn resolve() -> Self {
        let base = match env::var_os(HOME_ENV_VAR) {
            Some(value) => PathBuf::from(value),
            None => default_home(),
        };
        Self::from_root(base)
    }

    /// Build a layout rooted at an explicit directory (used by tests that
    /// don't want to touch process environment).
    pub fn from_root(data_dir: PathBuf) -> Self {
        let worker_dir = data_dir.join("workers");
        let log_dir = data_dir.join("logs");
        let db_file = data_dir.join("queue.db");
        let registry_file = worker_dir.join("registry.json");
        Self {
            data_dir,
            db_file,
            worker_dir,
            log_dir,
            registry_file,
        }
    }

    /// Create the data, worker, and log directories if they don't exist.
    pub fn ensure_directories(&self) -> io::Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;
        std::fs::create_dir_all(&self.worker_dir)?;
        std::fs::create_dir_all(&self.log_dir)?;
        Ok(())
    }

    /// Path to a worker's control file: `<root>/workers/<worker_id>.json`.
    pub fn worker_control_file(&self, worker_id: &str) -> PathBuf {
        self.worker_dir.join(format!("{worker_id}.json"))
    }

    /// Path to a worker's append-only log: `<root>/logs/<worker_id>.log`.
    pub fn worker_log_file(&self, worker_id: &str) -> PathBuf {
        self.log_dir.join(format!("{worker_id}.log"))
    }

    /// A `sqlx` sqlite connection URL for [`Self::db_file`], creating the
    /// file if absent.
    pub fn sqlite_url(&self) -> String {
        format!("sqlite://{}?mode=rwc", self.db_file.display())
    }
}

fn default_home() -> PathBuf {
    let home = env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| env::var_os("USERPROFILE").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."));
    home.join(".queuectl")
}
