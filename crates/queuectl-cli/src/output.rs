//! Terminal rendering. Presentation only — grounded in
//! `fourthplaces-mntogether/packages/dev-cli/src/cmd/jobs.rs`'s
//! `console::style` coloring of job states, generalized to this spec's
//! five-state lifecycle instead of that tool's job-status vocabulary.

use console::style;
use queuectl_core::{ConfigEntry, Job, JobState};
use queuectl_worker::AnnotatedEntry;
use std::collections::BTreeMap;

fn styled_state(state: JobState) -> console::StyledObject<&'static str> {
    let label = state.as_str();
    match state {
        JobState::Pending => style(label).yellow(),
        JobState::Processing => style(label).blue(),
        JobState::Completed => style(label).green(),
        JobState::Failed => style(label).red(),
        JobState::Dead => style(label).red().bold(),
    }
}

pub fn print_job(job: &Job) {
    println!("{}  {}", style(&job.id).bold(), styled_state(job.state));
    println!("  command:      {}", job.command);
    println!("  attempts:     {}/{}", job.attempts, job.max_retries);
    println!("  created_at:   {}", job.created_at.to_rfc3339());
    println!("  updated_at:   {}", job.updated_at.to_rfc3339());
    println!("  available_at: {}", job.available_at.to_rfc3339());
    if let Some(started) = job.processing_started_at {
        println!("  processing_started_at: {}", started.to_rfc3339());
    }
    if let Some(completed) = job.completed_at {
        println!("  completed_at: {}", completed.to_rfc3339());
    }
    if let Some(error) = &job.last_error {
        println!("  last_error:   {error}");
    }
}

pub fn print_job_list(jobs: &[Job]) {
    if jobs.is_empty() {
        println!("{}", style("No jobs").dim());
        return;
    }
    for job in jobs {
        println!(
            "{:<12} {:<11} attempts={}/{} {}",
            style(&job.id).bold(),
            styled_state(job.state),
            job.attempts,
            job.max_retries,
            job.command
        );
    }
}

pub fn print_counts(counts: &BTreeMap<String, i64>) {
    println!("{}", style("Job counts by state:").cyan().bold());
    for state in ["pending", "processing", "completed", "failed", "dead"] {
        let count = counts.get(state).copied().unwrap_or(0);
        println!("  {:<11} {count}", state);
    }
}

pub fn print_config(entries: &[ConfigEntry]) {
    if entries.is_empty() {
        println!("{}", style("No config entries").dim());
        return;
    }
    for entry in entries {
        println!("{:<20} {}", style(&entry.key).cyan(), entry.value);
    }
}

pub fn print_worker_list(entries: &[AnnotatedEntry]) {
    if entries.is_empty() {
        println!("{}", style("No known workers").dim());
        return;
    }
    for entry in entries {
        let liveness = if entry.alive { style("alive").green() } else { style("dead").red() };
        println!(
            "{:<16} pid={:<8} {} started_at={}",
            style(&entry.entry.id).bold(),
            entry.entry.pid,
            liveness,
            entry.entry.started_at.to_rfc3339()
        );
    }
}

pub fn print_stop_report(survivors: &[String]) {
    if survivors.is_empty() {
        println!("{}", style("All targeted workers stopped").green());
    } else {
        println!("{}", style("Workers still running after timeout:").yellow());
        for id in survivors {
            println!("  {id}");
        }
    }
}
