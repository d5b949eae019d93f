//! Dispatcher used when no job table is available.

use async_trait::async_trait;
use tracing;

use gatehouse_core::result::AppResult;
use gatehouse_core::traits::TaskDispatcher;
use gatehouse_core::types::AsyncTask;

/// Logs each submitted task and drops it. Development only.
#[derive(Debug, Default, Clone)]
pub struct LoggingDispatcher;

#[async_trait]
impl TaskDispatcher for LoggingDispatcher {
    async fn submit(&self, task: AsyncTask) -> AppResult<()> {
        tracing::info!(
            task = %task.name,
            worker_kind = %task.worker_kind,
            input = %task.input,
            "Task dropped (no job queue configured)"
        );
        Ok(())
    }
}
