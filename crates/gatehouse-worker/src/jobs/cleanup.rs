//! Removal of a destroyed user's uploaded files.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing;

use gatehouse_core::types::WorkerKind;
use gatehouse_entity::job::Job;

use super::email::payload_user_id;
use crate::executor::{JobExecutionError, JobHandler};

/// Handler for `cleanup-user-files`
#[derive(Debug)]
pub struct CleanupUserFilesHandler {
    /// Directory holding one sub-directory per user id
    uploads_root: PathBuf,
}

impl CleanupUserFilesHandler {
    /// Create a new cleanup handler
    pub fn new(uploads_root: impl Into<PathBuf>) -> Self {
        Self {
            uploads_root: uploads_root.into(),
        }
    }
}

#[async_trait]
impl JobHandler for CleanupUserFilesHandler {
    fn worker_kind(&self) -> WorkerKind {
        WorkerKind::CleanupUserFiles
    }

    async fn execute(&self, job: &Job) -> Result<Option<Value>, JobExecutionError> {
        let user_id = payload_user_id(&job.payload)?;
        let dir = self.uploads_root.join(user_id.to_string());

        let removed = match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => true,
            Err(e) if e.kind() == ErrorKind::NotFound => false,
            Err(e) => {
                return Err(JobExecutionError::Transient(format!(
                    "Failed to remove {}: {e}",
                    dir.display()
                )));
            }
        };

        tracing::info!(user_id = %user_id, removed, "User files cleaned up");
        Ok(Some(json!({ "removed": removed })))
    }
}
