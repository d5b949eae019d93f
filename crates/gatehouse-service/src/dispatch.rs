//! Side-effect dispatch with an explicit failure policy per call site.

use std::sync::Arc;

use tracing::{debug, warn};

use gatehouse_core::error::{AppError, ErrorKind};
use gatehouse_core::result::AppResult;
use gatehouse_core::traits::TaskDispatcher;
use gatehouse_core::types::AsyncTask;

/// What a dispatch failure means for the originating operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchPolicy {
    /// Log the failure and carry on; the primary change already succeeded.
    BestEffort,
    /// The dispatch is the point of the operation; surface failures.
    MustSucceed,
}

/// Submits tasks to the dispatcher under a [`DispatchPolicy`].
#[derive(Debug, Clone)]
pub struct SideEffects {
    dispatcher: Arc<dyn TaskDispatcher>,
}

impl SideEffects {
    /// Creates a new side-effect dispatcher.
    pub fn new(dispatcher: Arc<dyn TaskDispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Submit `task`, applying `policy` to a failure.
    ///
    /// `BestEffort` failures are logged at `warn` and swallowed.
    /// `MustSucceed` failures are returned as `Dispatch` errors.
    pub async fn dispatch(&self, task: AsyncTask, policy: DispatchPolicy) -> AppResult<()> {
        let name = task.name.clone();
        let worker_kind = task.worker_kind;

        match self.dispatcher.submit(task).await {
            Ok(()) => {
                debug!(task = %name, worker_kind = %worker_kind, "Task dispatched");
                Ok(())
            }
            Err(e) => match policy {
                DispatchPolicy::BestEffort => {
                    warn!(
                        task = %name,
                        worker_kind = %worker_kind,
                        error = %e,
                        "Best-effort task dispatch failed"
                    );
                    Ok(())
                }
                DispatchPolicy::MustSucceed => Err(AppError::with_source(
                    ErrorKind::Dispatch,
                    format!("Failed to dispatch task: {name}"),
                    e,
                )),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    #[derive(Debug)]
    struct Unavailable;

    #[async_trait]
    impl TaskDispatcher for Unavailable {
        async fn submit(&self, _task: AsyncTask) -> AppResult<()> {
            Err(AppError::database("queue down"))
        }
    }

    #[tokio::test]
    async fn test_best_effort_swallows_failure() {
        let effects = SideEffects::new(Arc::new(Unavailable));
        let task = AsyncTask::password_changed_email(uuid::Uuid::new_v4());
        assert!(
            effects
                .dispatch(task, DispatchPolicy::BestEffort)
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_must_succeed_surfaces_dispatch_error() {
        let effects = SideEffects::new(Arc::new(Unavailable));
        let task = AsyncTask::password_reset_email(uuid::Uuid::new_v4());
        let err = effects
            .dispatch(task, DispatchPolicy::MustSucceed)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Dispatch);
        assert_eq!(err.kind.status_code(), 500);
    }
}
