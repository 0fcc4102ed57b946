//! `queuectl` — the CLI adapter over the queue-engine crates (spec §4.7).
//!
//! Contains no queue-engine logic of its own: it parses arguments, opens
//! an [`engine::Engine`], calls into it, and formats the result. The
//! hidden `__worker-internal` subcommand is the one exception that reaches
//! past the engine into `queuectl-worker` directly, because it *is* the
//! worker process (spec_full.md §6 item 3), not a caller of one.

mod cli;
mod engine;
mod output;

use clap::Parser;
use cli::{Cli, Command, ConfigAction, DlqAction, WorkerAction};
use engine::Engine;
use queuectl_core::{EnqueueRequest, Paths, QueueError};
use queuectl_worker::{WorkerHandle, WorkerLoopConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_logging();

    let exit_code = match run(cli).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {err}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_target(false).try_init();
}

async fn run(cli: Cli) -> Result<(), QueueError> {
    if let Command::WorkerInternal { worker_id } = cli.command {
        return run_worker_internal(worker_id).await;
    }

    let paths = Paths::resolve();
    let engine = Engine::open(paths).await?;
    dispatch(&engine, cli.command, cli.json).await
}

async fn dispatch(engine: &Engine, command: Command, json: bool) -> Result<(), QueueError> {
    match command {
        Command::Enqueue { command, id, max_retries } => {
            let job = engine.enqueue(EnqueueRequest { id, command, max_retries }).await?;
            if json {
                print_json(&job)?;
            } else {
                println!("enqueued {}", job.id);
            }
        }
        Command::Get { id } => {
            let job = engine.get_job(&id).await?;
            if json {
                print_json(&job)?;
            } else {
                output::print_job(&job);
            }
        }
        Command::List { state } => {
            let jobs = engine.list_jobs(state.map(Into::into)).await?;
            if json {
                print_json(&jobs)?;
            } else {
                output::print_job_list(&jobs);
            }
        }
        Command::Status => {
            let counts = engine.count_by_state().await?;
            let workers = engine.worker_list()?;
            if json {
                print_json(&serde_json::json!({ "counts": counts, "workers": workers.len() }))?;
            } else {
                output::print_counts(&counts);
                println!();
                output::print_worker_list(&workers);
            }
        }
        Command::Delete { id } => {
            engine.delete_job(&id).await?;
            println!("deleted {id}");
        }
        Command::Reset { id } => {
            engine.reset_job(&id).await?;
            println!("reset {id}");
        }
        Command::Dlq { action } => dispatch_dlq(engine, action, json).await?,
        Command::Config { action } => dispatch_config(engine, action, json).await?,
        Command::Worker { action } => dispatch_worker(engine, action, json).await?,
        Command::WorkerInternal { .. } => unreachable!("handled in run() before dispatch"),
    }
    Ok(())
}

async fn dispatch_dlq(engine: &Engine, action: DlqAction, json: bool) -> Result<(), QueueError> {
    match action {
        DlqAction::List => {
            let jobs = engine.list_dlq().await?;
            if json {
                print_json(&jobs)?;
            } else {
                output::print_job_list(&jobs);
            }
        }
        DlqAction::Retry { id } => {
            engine.reset_job(&id).await?;
            println!("requeued {id}");
        }
        DlqAction::Delete { id } => {
            engine.delete_dlq_job(&id).await?;
            println!("deleted {id}");
        }
    }
    Ok(())
}

async fn dispatch_config(engine: &Engine, action: ConfigAction, json: bool) -> Result<(), QueueError> {
    match action {
        ConfigAction::Get { key } => {
            let value = engine.get_config(&key).await?;
            match value {
                Some(value) => println!("{value}"),
                None => println!("(unset)"),
            }
        }
        ConfigAction::Set { key, value } => {
            engine.set_config(&key, &value).await?;
            println!("set {key}={value}");
        }
        ConfigAction::List => {
            let entries = engine.list_config().await?;
            if json {
                print_json(&entries)?;
            } else {
                output::print_config(&entries);
            }
        }
    }
    Ok(())
}

async fn dispatch_worker(engine: &Engine, action: WorkerAction, json: bool) -> Result<(), QueueError> {
    match action {
        WorkerAction::Start { count } => {
            let spawned = engine.worker_start(count)?;
            if json {
                print_json(&spawned)?;
            } else {
                for worker in &spawned {
                    println!("started {} (pid {})", worker.id, worker.pid);
                }
            }
        }
        WorkerAction::Stop { id, wait, timeout } => {
            let report = engine.worker_stop(id.as_deref(), wait, Duration::from_secs(timeout)).await?;
            if json {
                print_json(&report.survivors)?;
            } else {
                output::print_stop_report(&report.survivors);
            }
        }
        WorkerAction::List => {
            let workers = engine.worker_list()?;
            if json {
                print_json(&workers_for_json(&workers))?;
            } else {
                output::print_worker_list(&workers);
            }
        }
        WorkerAction::Logs { id, lines } => {
            let text = engine.worker_logs(&id, lines)?;
            println!("{text}");
        }
    }
    Ok(())
}

/// `AnnotatedEntry` doesn't derive `Serialize` (it's a presentation-layer
/// composition of a serializable entry plus a liveness bool); flatten it
/// for `--json` output here instead of growing the worker crate's public
/// type just for this one adapter's convenience.
fn workers_for_json(workers: &[queuectl_worker::AnnotatedEntry]) -> Vec<serde_json::Value> {
    workers
        .iter()
        .map(|w| {
            serde_json::json!({
                "id": w.entry.id,
                "pid": w.entry.pid,
                "started_at": w.entry.started_at,
                "alive": w.alive,
            })
        })
        .collect()
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), QueueError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| QueueError::Store(format!("encoding JSON output: {e}")))?;
    println!("{text}");
    Ok(())
}

/// The hidden re-entry point a spawned worker process actually runs.
/// Installs cooperative SIGTERM/SIGINT handling (spec §4.6 step 2) and
/// enters the worker loop until stopped.
async fn run_worker_internal(worker_id: String) -> Result<(), QueueError> {
    let paths = Paths::resolve();
    paths
        .ensure_directories()
        .map_err(|e| QueueError::Store(format!("creating {}: {e}", paths.data_dir.display())))?;

    let store = engine::open_store_for_worker(&paths).await?;
    let poll_interval = resolve_poll_interval(&store).await;

    let handle = WorkerHandle::new();
    install_signal_handlers(handle.clone());

    let config = WorkerLoopConfig { worker_id, paths, poll_interval };
    queuectl_worker::run_worker_loop(config, Arc::new(store), handle).await;
    Ok(())
}

async fn resolve_poll_interval(store: &queuectl_store_sqlite::SqliteJobStore) -> Duration {
    use queuectl_core::{JobStore, CONFIG_POLL_INTERVAL, DEFAULT_POLL_INTERVAL};
    let seconds = match store.get_config(CONFIG_POLL_INTERVAL).await {
        Ok(Some(raw)) => raw.parse::<f64>().unwrap_or(DEFAULT_POLL_INTERVAL),
        _ => DEFAULT_POLL_INTERVAL,
    };
    Duration::from_secs_f64(seconds.max(0.01))
}

/// SIGTERM (and SIGINT, where available) set the same cooperative flag the
/// worker loop checks each iteration; neither signal aborts a running
/// subprocess (spec §4.6 "Shutdown", §5 "Cancellation").
fn install_signal_handlers(handle: WorkerHandle) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let term_handle = handle.clone();
        tokio::spawn(async move {
            if let Ok(mut term) = signal(SignalKind::terminate()) {
                term.recv().await;
                term_handle.request_stop();
            }
        });
        let int_handle = handle;
        tokio::spawn(async move {
            if let Ok(mut int) = signal(SignalKind::interrupt()) {
                int.recv().await;
                int_handle.request_stop();
            }
        });
    }
    #[cfg(not(unix))]
    {
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                handle.request_stop();
            }
        });
    }
}
