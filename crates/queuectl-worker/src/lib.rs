//! # queuectl-worker
//!
//! Everything that runs *inside* a worker OS process (spec §4.5, §4.6):
//! the cross-process [`registry`] of running workers and their control
//! files, synchronous subprocess [`exec`]ution with outcome classification,
//! and the [`worker_loop`] that ties claim → execute → classify → mutate
//! together.
//!
//! This crate depends only on `queuectl-core`. It knows nothing about
//! SQLite specifically (it talks to storage through the `JobStore` trait)
//! and nothing about CLI argument parsing (that's `queuectl-cli`, which
//! spawns the OS process this crate's loop runs inside).

pub mod exec;
pub mod registry;
pub mod worker_loop;

pub use registry::{AnnotatedEntry, ControlRecord, RegistryEntry};
pub use worker_loop::{run_worker_loop, WorkerHandle, WorkerLoopConfig};
