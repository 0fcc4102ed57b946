//! Argument parsing (spec §4.7's control-plane surface mapped onto clap
//! subcommands). No queue-engine logic lives here — every variant is
//! handled by calling straight into [`crate::engine::Engine`].

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "queuectl", version, about = "Durable local background-job queue", long_about = None)]
pub struct Cli {
    /// Render output as JSON instead of a formatted table.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Submit a job to the queue.
    Enqueue {
        /// Shell command line to execute.
        command: String,
        /// Explicit job id; generated when omitted.
        #[arg(long)]
        id: Option<String>,
        /// Max retries after the first attempt; falls back to the configured default.
        #[arg(long)]
        max_retries: Option<u32>,
    },
    /// Show one job by id.
    Get {
        id: String,
    },
    /// List jobs, optionally filtered by state.
    List {
        #[arg(long, value_enum)]
        state: Option<JobStateArg>,
    },
    /// Combined job-count and worker-registry view.
    Status,
    /// Permanently remove a job.
    Delete {
        id: String,
    },
    /// Requeue a dead-lettered job back to pending.
    Reset {
        id: String,
    },
    /// Dead-letter queue operations.
    Dlq {
        #[command(subcommand)]
        action: DlqAction,
    },
    /// Read or write configuration key/value pairs.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Manage worker processes.
    Worker {
        #[command(subcommand)]
        action: WorkerAction,
    },
    /// Hidden re-entry point: this is the subcommand a spawned worker
    /// process actually runs (spec_full.md §6 item 3). Not meant to be
    /// invoked directly by a user.
    #[command(hide = true, name = "__worker-internal")]
    WorkerInternal {
        #[arg(long)]
        worker_id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum DlqAction {
    /// List jobs currently in the dead-letter queue.
    List,
    /// Requeue a dead-lettered job back to pending.
    Retry { id: String },
    /// Delete a dead-lettered job (errors if it isn't actually dead).
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    Get { key: String },
    Set { key: String, value: String },
    List,
}

#[derive(Subcommand, Debug)]
pub enum WorkerAction {
    /// Start one or more worker processes.
    Start {
        #[arg(long, default_value_t = 1)]
        count: u32,
    },
    /// Request one or all workers to stop.
    Stop {
        /// Stop only this worker; stops every registered worker when omitted.
        id: Option<String>,
        /// Block until the target(s) exit or `--timeout` elapses.
        #[arg(long)]
        wait: bool,
        /// Seconds to wait when `--wait` is set.
        #[arg(long, default_value_t = 10)]
        timeout: u64,
    },
    /// List known workers and their liveness.
    List,
    /// Tail a worker's log file.
    Logs {
        id: String,
        #[arg(long, default_value_t = 50)]
        lines: usize,
    },
}

#[derive(clap::ValueEnum, Debug, Clone, Copy)]
pub enum JobStateArg {
    Pending,
    Processing,
    Completed,
    Failed,
    Dead,
}

impl From<JobStateArg> for queuectl_core::JobState {
    fn from(value: JobStateArg) -> Self {
        match value {
            JobStateArg::Pending => queuectl_core::JobState::Pending,
            JobStateArg::Processing => queuectl_core::JobState::Processing,
            JobStateArg::Completed => queuectl_core::JobState::Completed,
            JobStateArg::Failed => queuectl_core::JobState::Failed,
            JobStateArg::Dead => queuectl_core::JobState::Dead,
        }
    }
}
