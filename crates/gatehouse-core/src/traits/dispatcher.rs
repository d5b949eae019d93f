//! Asynchronous task submission seam.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::task::AsyncTask;

/// Fire-and-forget submission of asynchronous side effects.
///
/// Implementations own delivery and retry. A returned error only means the
/// task could not be handed off; callers decide whether that is fatal.
#[async_trait]
pub trait TaskDispatcher: Send + Sync + std::fmt::Debug + 'static {
    /// Hand a task off for asynchronous execution.
    async fn submit(&self, task: AsyncTask) -> AppResult<()>;
}
