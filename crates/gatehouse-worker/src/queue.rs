//! Persistent job queue; the production [`TaskDispatcher`].

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tracing;
use uuid::Uuid;

use gatehouse_core::config::worker::WorkerConfig;
use gatehouse_core::error::AppError;
use gatehouse_core::traits::TaskDispatcher;
use gatehouse_core::types::AsyncTask;
use gatehouse_database::JobRepository;
use gatehouse_entity::job::{CreateJob, Job};

/// Upper bound on the retry delay, in seconds.
const MAX_BACKOFF_SECONDS: i64 = 300;

/// Job queue for enqueuing and dequeuing work
#[derive(Debug, Clone)]
pub struct JobQueue {
    repo: Arc<JobRepository>,
    queue: String,
    max_attempts: i32,
    worker_id: String,
}

impl JobQueue {
    /// Create a new job queue with a fresh worker identifier
    pub fn new(repo: Arc<JobRepository>, config: &WorkerConfig) -> Self {
        Self {
            repo,
            queue: config.queue.clone(),
            max_attempts: config.max_attempts.max(1),
            worker_id: format!("worker-{}", Uuid::new_v4()),
        }
    }

    /// Identifier this queue claims jobs under
    pub fn worker_id(&self) -> &str {
        &self.worker_id
    }

    /// Build the row inserted for a task.
    pub fn job_for(&self, task: &AsyncTask) -> CreateJob {
        CreateJob {
            name: task.name.clone(),
            job_type: task.worker_kind.as_str().to_string(),
            queue: self.queue.clone(),
            payload: task.input.clone(),
            max_attempts: self.max_attempts,
        }
    }

    /// Enqueue a task
    pub async fn enqueue(&self, task: &AsyncTask) -> Result<Job, AppError> {
        let job = self.repo.create(&self.job_for(task)).await?;
        tracing::debug!(
            job_id = %job.id,
            worker_kind = %task.worker_kind,
            queue = %job.queue,
            "Enqueued job"
        );
        Ok(job)
    }

    /// Claim the next due job, if any
    pub async fn dequeue(&self) -> Result<Option<Job>, AppError> {
        let job = self.repo.dequeue(&self.queue, &self.worker_id).await?;
        if let Some(job) = &job {
            tracing::debug!(job_id = %job.id, job_type = %job.job_type, "Dequeued job");
        }
        Ok(job)
    }

    /// Mark a job as completed successfully
    pub async fn complete(
        &self,
        job_id: Uuid,
        result: Option<serde_json::Value>,
    ) -> Result<(), AppError> {
        self.repo.complete(job_id, result.as_ref()).await?;
        tracing::debug!(job_id = %job_id, "Job completed");
        Ok(())
    }

    /// Mark a job as failed
    pub async fn fail(&self, job_id: Uuid, error: &str) -> Result<(), AppError> {
        self.repo.fail(job_id, error).await?;
        tracing::debug!(job_id = %job_id, error, "Job failed");
        Ok(())
    }

    /// Return a job to the queue after a transient failure
    pub async fn retry_later(&self, job: &Job, error: &str) -> Result<(), AppError> {
        let retry_at = Utc::now() + backoff(job.attempts);
        self.repo.reschedule(job.id, error, retry_at).await?;
        tracing::debug!(job_id = %job.id, retry_at = %retry_at, "Job rescheduled");
        Ok(())
    }
}

#[async_trait]
impl TaskDispatcher for JobQueue {
    async fn submit(&self, task: AsyncTask) -> Result<(), AppError> {
        self.enqueue(&task).await.map(|_| ())
    }
}

/// Exponential retry delay: 2, 4, 8, ... seconds, capped.
pub fn backoff(attempts: i32) -> Duration {
    let exp = attempts.clamp(1, 16) as u32;
    Duration::seconds(2_i64.pow(exp).min(MAX_BACKOFF_SECONDS))
}
