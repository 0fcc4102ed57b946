//! SQLite-backed implementation of `queuectl_core::JobStore`.
//!
//! This is the transactional persistence layer the spec calls for (§4.3):
//! an embedded SQL engine in WAL mode, `BEGIN IMMEDIATE` for the
//! claim-under-lock primitive, and prepared statements for everything else.
//!
//! It mirrors the teacher's `seesaw-job-postgres::PgJobStore` almost
//! exactly in shape — `claim_ready`/`mark_succeeded`/`mark_failed` become
//! `claim_next`/`mark_completed`/`mark_failed` — but swaps Postgres's
//! `FOR UPDATE SKIP LOCKED` row-level claim for SQLite's single-writer
//! `BEGIN IMMEDIATE`, since SQLite has no row locks: the whole database
//! takes a reserved write lock for the duration of the claim transaction,
//! and a concurrent claimant simply waits for it (`busy_timeout`) rather
//! than skipping to a different row. Either way at-most-one-claimant
//! holds a given job.
//!
//! # Database Schema
//!
//! ```sql
//! CREATE TABLE jobs (
//!     id TEXT PRIMARY KEY,
//!     command TEXT NOT NULL,
//!     state TEXT NOT NULL,
//!     attempts INTEGER NOT NULL DEFAULT 0,
//!     max_retries INTEGER NOT NULL DEFAULT 3,
//!     created_at TEXT NOT NULL,
//!     updated_at TEXT NOT NULL,
//!     available_at TEXT NOT NULL,
//!     processing_started_at TEXT,
//!     completed_at TEXT,
//!     last_error TEXT
//! );
//! CREATE TABLE config (
//!     key TEXT PRIMARY KEY,
//!     value TEXT NOT NULL,
//!     updated_at TEXT NOT NULL
//! );
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use queuectl_core::clock::{format_timestamp, parse_timestamp};
use queuectl_core::{
    AcquiredJob, ConfigEntry, Job, JobState, JobStore, NewJob, Paths, QueueError,
};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::time::Duration;

/// How long a writer waits on SQLite's reserved lock before giving up
/// (spec §5: "store transaction timeout, recommended 30s").
const STORE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct SqliteJobStore {
    pool: SqlitePool,
}

impl SqliteJobStore {
    /// Open (creating if absent) the SQLite file named in `paths`, in WAL
    /// mode with a 30s busy timeout.
    pub async fn connect(paths: &Paths) -> Result<Self, QueueError> {
        let options = SqliteConnectOptions::from_str(&paths.sqlite_url())
            .map_err(|e| QueueError::Store(format!("invalid sqlite path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(STORE_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(options)
            .await
            .map_err(store_err)?;

        Ok(Self { pool })
    }

    /// Wrap an already-open pool (used by tests that want to share one
    /// in-memory/temp-file database across several `SqliteJobStore` handles
    /// to emulate independent worker processes).
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn store_err(err: sqlx::Error) -> QueueError {
    QueueError::Store(err.to_string())
}

fn row_to_job(row: &sqlx::sqlite::SqliteRow) -> Result<Job, QueueError> {
    let state_raw: String = row.try_get("state").map_err(store_err)?;
    let created_at: String = row.try_get("created_at").map_err(store_err)?;
    let updated_at: String = row.try_get("updated_at").map_err(store_err)?;
    let available_at: String = row.try_get("available_at").map_err(store_err)?;
    let processing_started_at: Option<String> =
        row.try_get("processing_started_at").map_err(store_err)?;
    let completed_at: Option<String> = row.try_get("completed_at").map_err(store_err)?;

    Ok(Job {
        id: row.try_get("id").map_err(store_err)?,
        command: row.try_get("command").map_err(store_err)?,
        state: JobState::parse(&state_raw)?,
        attempts: row.try_get::<i64, _>("attempts").map_err(store_err)? as u32,
        max_retries: row.try_get::<i64, _>("max_retries").map_err(store_err)? as u32,
        created_at: parse_timestamp(&created_at)?,
        updated_at: parse_timestamp(&updated_at)?,
        available_at: parse_timestamp(&available_at)?,
        processing_started_at: processing_started_at
            .map(|s| parse_timestamp(&s))
            .transpose()?,
        completed_at: completed_at.map(|s| parse_timestamp(&s)).transpose()?,
        last_error: row.try_get("last_error").map_err(store_err)?,
    })
}

#[async_trait]
impl JobStore for SqliteJobStore {
    async fn init(&self) -> Result<(), QueueError> {
        let mut tx = self.pool.begin().await.map_err(store_err)?;
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS jobs (
                id TEXT PRIMARY KEY,
                command TEXT NOT NULL,
                state TEXT NOT NULL,
                attempts INTEGER NOT NULL DEFAULT 0,
                max_retries INTEGER NOT NULL DEFAULT 3,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                available_at TEXT NOT NULL,
                processing_started_at TEXT,
                completed_at TEXT,
                last_error TEXT
            )
            "#,
        )
        .execute(&mut *tx)
        .await
        .map_err(store_err)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS config (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&mut *tx)
        .await
        .map_err(store_err)?;

        tx.commit().await.map_err(store_err)?;

        self.ensure_config_default(
            queuectl_core::CONFIG_MAX_RETRIES,
            &queuectl_core::DEFAULT_MAX_RETRIES.to_string(),
        )
        .await?;
        self.ensure_config_default(
            queuectl_core::CONFIG_BACKOFF_BASE,
            &queuectl_core::DEFAULT_BACKOFF_BASE.to_string(),
        )
        .await?;
        self.ensure_config_default(
            queuectl_core::CONFIG_POLL_INTERVAL,
            &queuectl_core::DEFAULT_POLL_INTERVAL.to_string(),
        )
        .await?;

        Ok(())
    }

    async fn insert_job(&self, job: NewJob) -> Result<Job, QueueError> {
        let id = job.id.unwrap_or_else(queuectl_core::generate_job_id);
        let now = queuectl_core::now();
        let now_str = format_timestamp(&now);
        let max_retries = match job.max_retries {
            Some(value) => value,
            None => self
                .get_config(queuectl_core::CONFIG_MAX_RETRIES)
                .await?
                .and_then(|v| v.parse::<u32>().ok())
                .unwrap_or(queuectl_core::DEFAULT_MAX_RETRIES),
        };

        let mut tx = self.pool.begin().await.map_err(store_err)?;

        let existing = sqlx::query("SELECT 1 FROM jobs WHERE id = ?1")
            .bind(&id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(store_err)?;
        if existing.is_some() {
            return Err(QueueError::AlreadyExists(format!(
                "job '{id}' already exists"
            )));
        }

        sqlx::query(
            r#"
            INSERT INTO jobs(
                id, command, state, attempts, max_retries,
                created_at, updated_at, available_at,
                processing_started_at, completed_at, last_error
            ) VALUES (?1, ?2, 'pending', 0, ?3, ?4, ?4, ?4, NULL, NULL, NULL)
            "#,
        )
        .bind(&id)
        .bind(&job.command)
        .bind(max_retries as i64)
        .bind(&now_str)
        .execute(&mut *tx)
        .await
        .map_err(store_err)?;

        tx.commit().await.map_err(store_err)?;

        Ok(Job {
            id,
            command: job.command,
            state: JobState::Pending,
            attempts: 0,
            max_retries,
            created_at: now,
            updated_at: now,
            available_at: now,
            processing_started_at: None,
            completed_at: None,
            last_error: None,
        })
    }

    async fn get_job(&self, id: &str) -> Result<Option<Job>, QueueError> {
        let row = sqlx::query("SELECT * FROM jobs WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err)?;
        row.as_ref().map(row_to_job).transpose()
    }

    async fn list_jobs(&self, state: Option<JobState>) -> Result<Vec<Job>, QueueError> {
        let rows = match state {
            Some(state) => sqlx::query("SELECT * FROM jobs WHERE state = ?1 ORDER BY created_at")
                .bind(state.as_str())
                .fetch_all(&self.pool)
                .await
                .map_err(store_err)?,
            None => sqlx::query("SELECT * FROM jobs ORDER BY created_at")
                .fetch_all(&self.pool)
                .await
                .map_err(store_err)?,
        };
        rows.iter().map(row_to_job).collect()
    }

    async fn count_jobs_by_state(&self) -> Result<BTreeMap<String, i64>, QueueError> {
        let rows = sqlx::query("SELECT state, COUNT(*) AS count FROM jobs GROUP BY state")
            .fetch_all(&self.pool)
            .await
            .map_err(store_err)?;
        let mut counts = BTreeMap::new();
        for row in rows {
            let state: String = row.try_get("state").map_err(store_err)?;
            let count: i64 = row.try_get("count").map_err(store_err)?;
            counts.insert(state, count);
        }
        Ok(counts)
    }

    async fn claim_next(&self, now: DateTime<Utc>) -> Result<Option<AcquiredJob>, QueueError> {
        let now_str = format_timestamp(&now);
        let mut conn = self.pool.acquire().await.map_err(store_err)?;

        sqlx::query("BEGIN IMMEDIATE")
            .execute(&mut *conn)
            .await
            .map_err(store_err)?;

        let selected = sqlx::query(
            r#"
            SELECT id, command, attempts, max_retries
            FROM jobs
            WHERE state IN ('pending', 'failed') AND available_at <= ?1
            ORDER BY created_at ASC
            LIMIT 1
            "#,
        )
        .bind(&now_str)
        .fetch_optional(&mut *conn)
        .await;

        let row = match selected {
            Ok(row) => row,
            Err(e) => {
                let _ = sqlx::query("ROLLBACK").execute(&mut *conn).await;
                return Err(store_err(e));
            }
        };

        let Some(row) = row else {
            sqlx::query("COMMIT")
                .execute(&mut *conn)
                .await
                .map_err(store_err)?;
            return Ok(None);
        };

        let id: String = row.try_get("id").map_err(store_err)?;
        let command: String = row.try_get("command").map_err(store_err)?;
        let attempts: i64 = row.try_get("attempts").map_err(store_err)?;
        let max_retries: i64 = row.try_get("max_retries").map_err(store_err)?;

        let update = sqlx::query(
            "UPDATE jobs SET state = 'processing', processing_started_at = ?1, updated_at = ?1 WHERE id = ?2",
        )
        .bind(&now_str)
        .bind(&id)
        .execute(&mut *conn)
        .await;

        if let Err(e) = update {
            let _ = sqlx::query("ROLLBACK").execute(&mut *conn).await;
            return Err(store_err(e));
        }

        sqlx::query("COMMIT")
            .execute(&mut *conn)
            .await
            .map_err(store_err)?;

        Ok(Some(AcquiredJob {
            id,
            command,
            attempts: attempts as u32,
            max_retries: max_retries as u32,
        }))
    }

    async fn mark_completed(
        &self,
        id: &str,
        attempts: u32,
        now: DateTime<Utc>,
    ) -> Result<(), QueueError> {
        let now_str = format_timestamp(&now);
        sqlx::query(
            "UPDATE jobs SET state = 'completed', attempts = ?1, completed_at = ?2, updated_at = ?2 WHERE id = ?3",
        )
        .bind(attempts as i64)
        .bind(&now_str)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(())
    }

    async fn mark_failed(
        &self,
        id: &str,
        attempts: u32,
        max_retries: u32,
        error: &str,
        now: DateTime<Utc>,
        backoff_seconds: f64,
    ) -> Result<(), QueueError> {
        let now_str = format_timestamp(&now);
        let new_state = if attempts > max_retries {
            JobState::Dead
        } else {
            JobState::Failed
        };
        let available_at = if backoff_seconds > 0.0 {
            format_timestamp(&(now + chrono::Duration::milliseconds((backoff_seconds * 1000.0) as i64)))
        } else {
            now_str.clone()
        };
        let truncated = queuectl_core::truncate_last_error(error);

        sqlx::query(
            "UPDATE jobs SET state = ?1, attempts = ?2, updated_at = ?3, available_at = ?4, last_error = ?5 WHERE id = ?6",
        )
        .bind(new_state.as_str())
        .bind(attempts as i64)
        .bind(&now_str)
        .bind(&available_at)
        .bind(&truncated)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(())
    }

    async fn reset_job(&self, id: &str, now: DateTime<Utc>) -> Result<(), QueueError> {
        let now_str = format_timestamp(&now);
        sqlx::query(
            "UPDATE jobs SET state = 'pending', attempts = 0, updated_at = ?1, available_at = ?1 WHERE id = ?2",
        )
        .bind(&now_str)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(())
    }

    async fn delete_job(&self, id: &str) -> Result<bool, QueueError> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_config(&self, key: &str) -> Result<Option<String>, QueueError> {
        let row = sqlx::query("SELECT value FROM config WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(row.map(|r| r.get("value")))
    }

    async fn set_config(&self, key: &str, value: &str) -> Result<(), QueueError> {
        let now_str = format_timestamp(&queuectl_core::now());
        sqlx::query(
            r#"
            INSERT INTO config(key, value, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(&now_str)
        .execute(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(())
    }

    async fn list_config(&self) -> Result<Vec<ConfigEntry>, QueueError> {
        let rows = sqlx::query("SELECT key, value, updated_at FROM config ORDER BY key")
            .fetch_all(&self.pool)
            .await
            .map_err(store_err)?;
        rows.into_iter()
            .map(|row| {
                let updated_at: String = row.try_get("updated_at").map_err(store_err)?;
                Ok(ConfigEntry {
                    key: row.try_get("key").map_err(store_err)?,
                    value: row.try_get("value").map_err(store_err)?,
                    updated_at: parse_timestamp(&updated_at)?,
                })
            })
            .collect()
    }

    async fn ensure_config_default(&self, key: &str, value: &str) -> Result<(), QueueError> {
        let mut tx = self.pool.begin().await.map_err(store_err)?;
        let existing = sqlx::query("SELECT 1 FROM config WHERE key = ?1")
            .bind(key)
            .fetch_optional(&mut *tx)
            .await
            .map_err(store_err)?;
        if existing.is_none() {
            let now_str = format_timestamp(&queuectl_core::now());
            sqlx::query("INSERT INTO config(key, value, updated_at) VALUES (?1, ?2, ?3)")
                .bind(key)
                .bind(value)
                .bind(&now_str)
                .execute(&mut *tx)
                .await
                .map_err(store_err)?;
        }
        tx.commit().await.map_err(store_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use queuectl_core::now;
    use queuectl_testing::TestHome;

    async fn open_store() -> (TestHome, SqliteJobStore) {
        let home = TestHome::new();
        let store = SqliteJobStore::connect(&home.paths).await.unwrap();
        store.init().await.unwrap();
        (home, store)
    }

    #[tokio::test]
    async fn init_is_idempotent() {
        let (_home, store) = open_store().await;
        store.init().await.unwrap();
        assert_eq!(
            store.get_config(queuectl_core::CONFIG_MAX_RETRIES).await.unwrap(),
            Some(queuectl_core::DEFAULT_MAX_RETRIES.to_string())
        );
    }

    #[tokio::test]
    async fn insert_then_get_round_trips() {
        let (_home, store) = open_store().await;
        let job = store
            .insert_job(NewJob {
                id: Some("job-1".to_string()),
                command: "printf ok".to_string(),
                max_retries: Some(5),
            })
            .await
            .unwrap();
        assert_eq!(job.id, "job-1");
        assert_eq!(job.state, JobState::Pending);
        assert_eq!(job.max_retries, 5);

        let fetched = store.get_job("job-1").await.unwrap().unwrap();
        assert_eq!(fetched, job);
    }

    #[tokio::test]
    async fn inserting_duplicate_id_is_already_exists() {
        let (_home, store) = open_store().await;
        store
            .insert_job(NewJob {
                id: Some("dup".to_string()),
                command: "printf ok".to_string(),
                max_retries: None,
            })
            .await
            .unwrap();
        let err = store
            .insert_job(NewJob {
                id: Some("dup".to_string()),
                command: "printf ok".to_string(),
                max_retries: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "already_exists");
    }

    #[tokio::test]
    async fn insert_without_max_retries_uses_config_default() {
        let (_home, store) = open_store().await;
        store.set_config(queuectl_core::CONFIG_MAX_RETRIES, "7").await.unwrap();
        let job = store
            .insert_job(NewJob {
                id: None,
                command: "printf ok".to_string(),
                max_retries: None,
            })
            .await
            .unwrap();
        assert_eq!(job.max_retries, 7);
    }

    #[tokio::test]
    async fn claim_next_picks_oldest_eligible_and_marks_processing() {
        let (_home, store) = open_store().await;
        store
            .insert_job(NewJob {
                id: Some("a".to_string()),
                command: "printf a".to_string(),
                max_retries: None,
            })
            .await
            .unwrap();
        store
            .insert_job(NewJob {
                id: Some("b".to_string()),
                command: "printf b".to_string(),
                max_retries: None,
            })
            .await
            .unwrap();

        let claimed = store.claim_next(now()).await.unwrap().unwrap();
        assert_eq!(claimed.id, "a");

        let job = store.get_job("a").await.unwrap().unwrap();
        assert_eq!(job.state, JobState::Processing);
        assert!(job.processing_started_at.is_some());
    }

    #[tokio::test]
    async fn claim_next_skips_jobs_not_yet_available() {
        let (_home, store) = open_store().await;
        store
            .insert_job(NewJob {
                id: Some("future".to_string()),
                command: "printf x".to_string(),
                max_retries: None,
            })
            .await
            .unwrap();
        store
            .mark_failed("future", 1, 3, "boom", now(), 3600.0)
            .await
            .unwrap();

        let claimed = store.claim_next(now()).await.unwrap();
        assert!(claimed.is_none());
    }

    #[tokio::test]
    async fn claim_next_on_empty_queue_returns_none() {
        let (_home, store) = open_store().await;
        assert!(store.claim_next(now()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn mark_failed_under_max_retries_goes_back_to_failed() {
        let (_home, store) = open_store().await;
        store
            .insert_job(NewJob {
                id: Some("j".to_string()),
                command: "printf x".to_string(),
                max_retries: Some(3),
            })
            .await
            .unwrap();
        store.claim_next(now()).await.unwrap();
        store
            .mark_failed("j", 1, 3, "exit 1", now(), 2.0)
            .await
            .unwrap();

        let job = store.get_job("j").await.unwrap().unwrap();
        assert_eq!(job.state, JobState::Failed);
        assert_eq!(job.attempts, 1);
        assert_eq!(job.last_error.as_deref(), Some("exit 1"));
        assert!(job.available_at > job.updated_at - chrono::Duration::seconds(1));
    }

    #[tokio::test]
    async fn mark_failed_past_max_retries_goes_dead() {
        let (_home, store) = open_store().await;
        store
            .insert_job(NewJob {
                id: Some("j".to_string()),
                command: "printf x".to_string(),
                max_retries: Some(2),
            })
            .await
            .unwrap();
        store
            .mark_failed("j", 3, 2, "still failing", now(), 8.0)
            .await
            .unwrap();

        let job = store.get_job("j").await.unwrap().unwrap();
        assert_eq!(job.state, JobState::Dead);
    }

    #[tokio::test]
    async fn mark_failed_truncates_long_errors() {
        let (_home, store) = open_store().await;
        store
            .insert_job(NewJob {
                id: Some("j".to_string()),
                command: "printf x".to_string(),
                max_retries: None,
            })
            .await
            .unwrap();
        let long_error = "e".repeat(1000);
        store
            .mark_failed("j", 1, 3, &long_error, now(), 1.0)
            .await
            .unwrap();

        let job = store.get_job("j").await.unwrap().unwrap();
        let stored = job.last_error.unwrap();
        assert_eq!(stored.chars().count(), queuectl_core::MAX_LAST_ERROR_LEN);
        assert!(stored.starts_with('\u{2026}'));
    }

    #[tokio::test]
    async fn mark_completed_clears_processing_state() {
        let (_home, store) = open_store().await;
        store
            .insert_job(NewJob {
                id: Some("j".to_string()),
                command: "printf x".to_string(),
                max_retries: None,
            })
            .await
            .unwrap();
        store.claim_next(now()).await.unwrap();
        store.mark_completed("j", 1, now()).await.unwrap();

        let job = store.get_job("j").await.unwrap().unwrap();
        assert_eq!(job.state, JobState::Completed);
        assert!(job.completed_at.is_some());
    }

    #[tokio::test]
    async fn reset_job_clears_attempts_but_keeps_last_error() {
        let (_home, store) = open_store().await;
        store
            .insert_job(NewJob {
                id: Some("j".to_string()),
                command: "printf x".to_string(),
                max_retries: Some(1),
            })
            .await
            .unwrap();
        store
            .mark_failed("j", 2, 1, "dead now", now(), 1.0)
            .await
            .unwrap();
        store.reset_job("j", now()).await.unwrap();

        let job = store.get_job("j").await.unwrap().unwrap();
        assert_eq!(job.state, JobState::Pending);
        assert_eq!(job.attempts, 0);
        assert_eq!(job.last_error.as_deref(), Some("dead now"));
    }

    #[tokio::test]
    async fn delete_job_reports_whether_a_row_existed() {
        let (_home, store) = open_store().await;
        store
            .insert_job(NewJob {
                id: Some("j".to_string()),
                command: "printf x".to_string(),
                max_retries: None,
            })
            .await
            .unwrap();
        assert!(store.delete_job("j").await.unwrap());
        assert!(!store.delete_job("j").await.unwrap());
        assert!(store.get_job("j").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_jobs_filters_by_state() {
        let (_home, store) = open_store().await;
        store
            .insert_job(NewJob {
                id: Some("a".to_string()),
                command: "printf a".to_string(),
                max_retries: None,
            })
            .await
            .unwrap();
        store
            .insert_job(NewJob {
                id: Some("b".to_string()),
                command: "printf b".to_string(),
                max_retries: None,
            })
            .await
            .unwrap();
        store.claim_next(now()).await.unwrap();

        let pending = store.list_jobs(Some(JobState::Pending)).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, "b");

        let all = store.list_jobs(None).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn count_jobs_by_state_reflects_transitions() {
        let (_home, store) = open_store().await;
        store
            .insert_job(NewJob {
                id: Some("a".to_string()),
                command: "printf a".to_string(),
                max_retries: None,
            })
            .await
            .unwrap();
        let counts = store.count_jobs_by_state().await.unwrap();
        assert_eq!(counts.get("pending"), Some(&1));
    }

    #[tokio::test]
    async fn set_config_upserts() {
        let (_home, store) = open_store().await;
        store.set_config("poll_interval", "5").await.unwrap();
        store.set_config("poll_interval", "9").await.unwrap();
        assert_eq!(
            store.get_config("poll_interval").await.unwrap(),
            Some("9".to_string())
        );
    }

    #[tokio::test]
    async fn ensure_config_default_does_not_clobber_existing_value() {
        let (_home, store) = open_store().await;
        store.set_config("poll_interval", "42").await.unwrap();
        store.ensure_config_default("poll_interval", "2").await.unwrap();
        assert_eq!(
            store.get_config("poll_interval").await.unwrap(),
            Some("42".to_string())
        );
    }
}
