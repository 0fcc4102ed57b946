//! CLI-surface smoke tests (spec_full.md §8): drive the actual `queuectl`
//! binary as a subprocess, the way a user would, rather than calling
//! `Engine` directly. `env!("CARGO_BIN_EXE_queuectl")` is Cargo's standard
//! mechanism for integration tests to locate a sibling binary target.

use serde_json::Value;
use std::path::Path;
use std::process::Command;
use std::time::{Duration, Instant};

fn queuectl(home: &Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_queuectl"))
        .args(args)
        .env("QUEUECTL_HOME", home)
        .output()
        .expect("spawn queuectl")
}

fn queuectl_json(home: &Path, args: &[&str]) -> Value {
    let mut full_args = vec!["--json"];
    full_args.extend_from_slice(args);
    let output = queuectl(home, &full_args);
    assert!(
        output.status.success(),
        "queuectl {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid JSON output")
}

fn poll_until(timeout: Duration, mut check: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if check() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(Duration::from_millis(100));
    }
}

#[test]
fn enqueue_get_list_status_delete_round_trip() {
    let home = queuectl_testing::TestHome::new();

    let job: Value = queuectl_json(home.root(), &["enqueue", "printf ok", "--id", "smoke-1"]);
    assert_eq!(job["id"], "smoke-1");
    assert_eq!(job["state"], "pending");

    let fetched: Value = queuectl_json(home.root(), &["get", "smoke-1"]);
    assert_eq!(fetched["command"], "printf ok");

    let listed: Value = queuectl_json(home.root(), &["list"]);
    let jobs = listed.as_array().unwrap();
    assert_eq!(jobs.len(), 1);

    let status = queuectl(home.root(), &["status"]);
    assert!(status.status.success());

    let deleted = queuectl(home.root(), &["delete", "smoke-1"]);
    assert!(deleted.status.success());

    let missing = queuectl(home.root(), &["get", "smoke-1"]);
    assert!(!missing.status.success());
}

#[test]
fn enqueue_rejects_duplicate_ids() {
    let home = queuectl_testing::TestHome::new();
    let first = queuectl(home.root(), &["enqueue", "printf ok", "--id", "dup"]);
    assert!(first.status.success());
    let second = queuectl(home.root(), &["enqueue", "printf ok", "--id", "dup"]);
    assert!(!second.status.success());
    assert!(String::from_utf8_lossy(&second.stderr).contains("already exists"));
}

#[test]
fn config_set_get_list_round_trip() {
    let home = queuectl_testing::TestHome::new();
    let set = queuectl(home.root(), &["config", "set", "poll_interval", "5"]);
    assert!(set.status.success());

    let get = queuectl(home.root(), &["config", "get", "poll_interval"]);
    assert_eq!(String::from_utf8_lossy(&get.stdout).trim(), "5");

    let listed: Value = queuectl_json(home.root(), &["config", "list"]);
    let entries = listed.as_array().unwrap();
    assert!(entries.iter().any(|e| e["key"] == "poll_interval" && e["value"] == "5"));
}

#[test]
fn dlq_retry_after_exhausting_retries() {
    let home = queuectl_testing::TestHome::new();

    queuectl(home.root(), &["config", "set", "backoff_base", "1"]);
    queuectl(home.root(), &["config", "set", "poll_interval", "0.1"]);
    queuectl(home.root(), &["enqueue", "exit 1", "--id", "dlq-1", "--max-retries", "0"]);

    let spawned: Value = queuectl_json(home.root(), &["worker", "start", "--count", "1"]);
    let worker_id = spawned[0]["id"].as_str().unwrap().to_string();

    let reached_dead = poll_until(Duration::from_secs(15), || {
        let job: Value = queuectl_json(home.root(), &["get", "dlq-1"]);
        job["state"] == "dead"
    });
    assert!(reached_dead, "job should have moved to the dead-letter queue");

    let dlq: Value = queuectl_json(home.root(), &["dlq", "list"]);
    let entries = dlq.as_array().unwrap();
    assert!(entries.iter().any(|j| j["id"] == "dlq-1"));

    let retried = queuectl(home.root(), &["dlq", "retry", "dlq-1"]);
    assert!(retried.status.success());

    let job: Value = queuectl_json(home.root(), &["get", "dlq-1"]);
    assert_eq!(job["state"], "pending");
    assert_eq!(job["attempts"], 0);

    queuectl(home.root(), &["worker", "stop", &worker_id, "--wait"]);
}
