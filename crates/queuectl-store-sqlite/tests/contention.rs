//! Exercises the one property the whole store design exists to guarantee:
//! two processes racing `claim_next` against the same database file never
//! hand the same job to both of them (spec §4.4, §8 "concurrent workers").

use queuectl_core::{now, JobStore, NewJob};
use queuectl_store_sqlite::SqliteJobStore;
use queuectl_testing::TestHome;
use std::collections::HashSet;
use std::sync::Arc;

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_claimants_never_double_claim() {
    let home = TestHome::new();

    let seed = SqliteJobStore::connect(&home.paths).await.unwrap();
    seed.init().await.unwrap();

    const JOB_COUNT: usize = 40;
    for i in 0..JOB_COUNT {
        seed.insert_job(NewJob {
            id: Some(format!("job-{i}")),
            command: "printf ok".to_string(),
            max_retries: None,
        })
        .await
        .unwrap();
    }

    // Each "worker" opens its own pool against the same database file, the
    // way separate `queuectl worker start` processes would.
    let mut workers = Vec::new();
    for _ in 0..8 {
        workers.push(Arc::new(SqliteJobStore::connect(&home.paths).await.unwrap()));
    }

    let mut handles = Vec::new();
    for worker in workers {
        handles.push(tokio::spawn(async move {
            let mut claimed = Vec::new();
            loop {
                match worker.claim_next(now()).await.unwrap() {
                    Some(job) => claimed.push(job.id),
                    None => break,
                }
            }
            claimed
        }));
    }

    let mut all_claimed = Vec::new();
    for handle in handles {
        all_claimed.extend(handle.await.unwrap());
    }

    assert_eq!(all_claimed.len(), JOB_COUNT, "every job claimed exactly once in total");
    let unique: HashSet<_> = all_claimed.iter().collect();
    assert_eq!(unique.len(), JOB_COUNT, "no job claimed by more than one worker");
}
