//! Job executor: dispatches jobs to registered handlers.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing;

use gatehouse_core::error::AppError;
use gatehouse_core::types::WorkerKind;
use gatehouse_entity::job::Job;

/// Trait for job handler implementations
#[async_trait]
pub trait JobHandler: Send + Sync + std::fmt::Debug {
    /// The worker kind this handler processes
    fn worker_kind(&self) -> WorkerKind;

    /// Execute the job with its payload
    async fn execute(&self, job: &Job) -> Result<Option<Value>, JobExecutionError>;
}

/// Error from job execution
#[derive(Debug, thiserror::Error)]
pub enum JobExecutionError {
    /// Permanent failure, do not retry
    #[error("Permanent job failure: {0}")]
    Permanent(String),

    /// Transient failure, may retry
    #[error("Transient job failure: {0}")]
    Transient(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] AppError),
}

impl JobExecutionError {
    /// Whether another attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Permanent(_) => false,
            Self::Transient(_) => true,
            Self::Internal(e) => e.kind.is_infrastructure(),
        }
    }
}

/// Dispatches jobs to the appropriate handler based on their worker kind
#[derive(Debug, Default)]
pub struct JobExecutor {
    handlers: HashMap<WorkerKind, Arc<dyn JobHandler>>,
}

impl JobExecutor {
    /// Create an executor with no handlers
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a job handler, replacing any previous handler for its kind
    pub fn register(&mut self, handler: Arc<dyn JobHandler>) {
        let kind = handler.worker_kind();
        tracing::info!(worker_kind = %kind, "Registered job handler");
        self.handlers.insert(kind, handler);
    }

    /// Execute a job by dispatching to the correct handler
    pub async fn execute(&self, job: &Job) -> Result<Option<Value>, JobExecutionError> {
        let kind = WorkerKind::from_str(&job.job_type).map_err(|_| {
            JobExecutionError::Permanent(format!("Unknown worker kind '{}'", job.job_type))
        })?;
        let handler = self.handlers.get(&kind).ok_or_else(|| {
            JobExecutionError::Permanent(format!("No handler registered for '{kind}'"))
        })?;

        tracing::debug!(
            job_id = %job.id,
            worker_kind = %kind,
            attempt = job.attempts,
            max_attempts = job.max_attempts,
            "Executing job"
        );

        handler.execute(job).await
    }

    /// Check if a handler is registered for a worker kind
    pub fn has_handler(&self, kind: WorkerKind) -> bool {
        self.handlers.contains_key(&kind)
    }
}
