//! Shared test fixtures for queuectl crates: a throwaway data-root sandbox
//! and small helpers for building shell commands that sleep, fail, or
//! succeed, plus a bounded polling loop for waiting on async state changes.
//!
//! Mirrors the role `seesaw-testing` plays for the teacher: a crate the
//! other crates only ever pull in as a `[dev-dependencies]`.

use queuectl_core::Paths;
use std::future::Future;
use std::time::Duration;
use tempfile::TempDir;

/// A temporary `QUEUECTL_HOME`-shaped directory tree, with directories
/// already created. Dropped (and deleted) at the end of the test.
pub struct TestHome {
    _dir: TempDir,
    pub paths: Paths,
}

impl TestHome {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp test-home dir");
        let paths = Paths::from_root(dir.path().to_path_buf());
        paths.ensure_directories().expect("ensure test-home dirs");
        Self { _dir: dir, paths }
    }

    /// The root directory path, for passing to a child process's environment.
    pub fn root(&self) -> &std::path::Path {
        &self.paths.data_dir
    }
}

impl Default for TestHome {
    fn default() -> Self {
        Self::new()
    }
}

/// A shell command that exits successfully after printing a marker.
pub fn ok_command() -> String {
    "printf ok".to_string()
}

/// A shell command that sleeps for `seconds` before exiting 0. Used to
/// exercise "worker finishes current job before honoring stop" scenarios.
pub fn sleeping_command(seconds: u64) -> String {
    format!("sleep {seconds}")
}

/// A shell command that exits with `code` and emits nothing on stderr,
/// used to exercise the synthetic `last_error` path (spec §8 boundaries).
pub fn failing_command_silent(code: i32) -> String {
    format!("exit {code}")
}

/// A shell command that exits with `code` after writing `message` to stderr.
pub fn failing_command_with_stderr(code: i32, message: &str) -> String {
    format!("echo '{message}' 1>&2; exit {code}")
}

/// A shell command referencing a binary that does not exist on `PATH`.
pub fn missing_command() -> String {
    "queuectl-definitely-not-a-real-binary-xyz".to_string()
}

/// Poll `check` every `interval` until it returns `true` or `timeout` elapses.
/// Returns whether `check` ever returned `true`.
pub async fn wait_until<F, Fut>(timeout: Duration, interval: Duration, mut check: F) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if check().await {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(interval).await;
    }
}
