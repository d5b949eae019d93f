//! Worker runner: main loop that polls for jobs and executes them.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, watch};
use tokio::time;
use tracing;

use gatehouse_core::config::worker::WorkerConfig;
use gatehouse_entity::job::Job;

use crate::executor::{JobExecutionError, JobExecutor};
use crate::queue::JobQueue;

/// How long shutdown waits for in-flight jobs.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Main worker runner that polls the queue and executes jobs
#[derive(Debug)]
pub struct WorkerRunner {
    queue: Arc<JobQueue>,
    executor: Arc<JobExecutor>,
    concurrency: usize,
    poll_interval: Duration,
}

impl WorkerRunner {
    /// Create a new worker runner
    pub fn new(queue: Arc<JobQueue>, executor: Arc<JobExecutor>, config: &WorkerConfig) -> Self {
        Self {
            queue,
            executor,
            concurrency: config.concurrency.max(1),
            poll_interval: Duration::from_secs(config.poll_interval_seconds.max(1)),
        }
    }

    /// Start the worker runner; runs until the cancel signal is received
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) {
        let worker_id = self.queue.worker_id().to_string();
        tracing::info!(
            worker_id = %worker_id,
            concurrency = self.concurrency,
            poll_interval_secs = self.poll_interval.as_secs(),
            "Worker started"
        );

        let semaphore = Arc::new(Semaphore::new(self.concurrency));

        loop {
            let claimed = tokio::select! {
                _ = cancel.changed() => {
                    if *cancel.borrow() {
                        tracing::info!(worker_id = %worker_id, "Worker received shutdown signal");
                        break;
                    }
                    continue;
                }
                claimed = self.poll_and_execute(&semaphore) => claimed,
            };

            // Keep draining while jobs are available.
            if claimed {
                continue;
            }

            tokio::select! {
                _ = cancel.changed() => {
                    if *cancel.borrow() {
                        tracing::info!(worker_id = %worker_id, "Worker shutting down");
                        break;
                    }
                }
                _ = time::sleep(self.poll_interval) => {}
            }
        }

        tracing::info!(worker_id = %worker_id, "Waiting for in-flight jobs to complete");
        let permits = self.concurrency as u32;
        if time::timeout(DRAIN_TIMEOUT, semaphore.acquire_many(permits))
            .await
            .is_err()
        {
            tracing::warn!(worker_id = %worker_id, "In-flight jobs did not finish in time");
        }
        tracing::info!(worker_id = %worker_id, "Worker shut down complete");
    }

    /// Claim one job and spawn its execution. Returns whether a job was claimed.
    async fn poll_and_execute(&self, semaphore: &Arc<Semaphore>) -> bool {
        let permit = match semaphore.clone().acquire_owned().await {
            Ok(p) => p,
            Err(_) => return false,
        };

        match self.queue.dequeue().await {
            Ok(Some(job)) => {
                let queue = Arc::clone(&self.queue);
                let executor = Arc::clone(&self.executor);
                tokio::spawn(async move {
                    let _permit = permit;
                    process(&queue, &executor, job).await;
                });
                true
            }
            Ok(None) => {
                tracing::trace!("No jobs available");
                false
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to dequeue job");
                false
            }
        }
    }
}

/// Execute one claimed job and record its outcome.
async fn process(queue: &JobQueue, executor: &JobExecutor, job: Job) {
    let job_id = job.id;
    match executor.execute(&job).await {
        Ok(result) => {
            if let Err(e) = queue.complete(job_id, result).await {
                tracing::error!(job_id = %job_id, error = %e, "Failed to mark job as completed");
            } else {
                tracing::info!(job_id = %job_id, job_type = %job.job_type, "Job completed");
            }
        }
        Err(err) => {
            let msg = err.to_string();
            let outcome = if err.is_retryable() && job.can_retry() {
                tracing::warn!(
                    job_id = %job_id,
                    attempt = job.attempts,
                    max_attempts = job.max_attempts,
                    error = %msg,
                    "Job failed, will retry"
                );
                queue.retry_later(&job, &msg).await
            } else {
                log_final_failure(&job, &err);
                queue.fail(job_id, &msg).await
            };
            if let Err(e) = outcome {
                tracing::error!(job_id = %job_id, error = %e, "Failed to record job failure");
            }
        }
    }
}

fn log_final_failure(job: &Job, err: &JobExecutionError) {
    match err {
        JobExecutionError::Permanent(msg) => {
            tracing::error!(job_id = %job.id, error = %msg, "Job failed permanently")
        }
        JobExecutionError::Transient(msg) => tracing::error!(
            job_id = %job.id,
            attempts = job.attempts,
            error = %msg,
            "Job failed, attempts exhausted"
        ),
        JobExecutionError::Internal(e) => {
            tracing::error!(job_id = %job.id, error = %e, "Job internal error")
        }
    }
}
