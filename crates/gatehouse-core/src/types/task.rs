//! Asynchronous side-effect tasks handed to the task dispatcher.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// The consumer a task is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkerKind {
    /// Generate a verification code and mail the verification link.
    VerifyEmail,
    /// Generate a reset code and mail the reset link.
    PasswordResetEmail,
    /// Notify the user that their password changed.
    PasswordChangedEmail,
    /// Notify a former user that their account was destroyed.
    UserDestroyedEmail,
    /// Remove a destroyed user's uploaded files.
    CleanupUserFiles,
}

impl WorkerKind {
    /// All worker kinds, in registration order.
    pub const ALL: [WorkerKind; 5] = [
        Self::VerifyEmail,
        Self::PasswordResetEmail,
        Self::PasswordChangedEmail,
        Self::UserDestroyedEmail,
        Self::CleanupUserFiles,
    ];

    /// Wire name of the worker kind, also used as the queued job type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VerifyEmail => "verify-email",
            Self::PasswordResetEmail => "password-reset-email",
            Self::PasswordChangedEmail => "password-changed-email",
            Self::UserDestroyedEmail => "user-destroyed-email",
            Self::CleanupUserFiles => "cleanup-user-files",
        }
    }
}

impl fmt::Display for WorkerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkerKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| AppError::internal(format!("Unknown worker kind '{s}'")))
    }
}

/// A unit of asynchronous work: `{name, workerKind, input}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AsyncTask {
    /// Human-readable task name, used in logs.
    pub name: String,
    /// Consumer the task is routed to.
    pub worker_kind: WorkerKind,
    /// Consumer-specific input.
    pub input: serde_json::Value,
}

impl AsyncTask {
    /// Build a task with an arbitrary input payload.
    pub fn new(name: impl Into<String>, worker_kind: WorkerKind, input: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            worker_kind,
            input,
        }
    }

    /// Send a fresh verification code to the user's current address.
    pub fn verify_email(user_id: Uuid) -> Self {
        Self::new(
            "Send verification email",
            WorkerKind::VerifyEmail,
            serde_json::json!({ "userId": user_id }),
        )
    }

    /// Send a fresh password reset code to the user.
    pub fn password_reset_email(user_id: Uuid) -> Self {
        Self::new(
            "Send password reset email",
            WorkerKind::PasswordResetEmail,
            serde_json::json!({ "userId": user_id }),
        )
    }

    /// Notify the user that their password was changed.
    pub fn password_changed_email(user_id: Uuid) -> Self {
        Self::new(
            "Send password changed email",
            WorkerKind::PasswordChangedEmail,
            serde_json::json!({ "userId": user_id }),
        )
    }

    /// Notify the former owner of `email` that their account is gone.
    pub fn user_destroyed_email(email: &str) -> Self {
        Self::new(
            "Send user destroyed email",
            WorkerKind::UserDestroyedEmail,
            serde_json::json!({ "email": email }),
        )
    }

    /// Remove everything the user uploaded.
    pub fn cleanup_user_files(user_id: Uuid) -> Self {
        Self::new(
            "Cleanup destroyed user files",
            WorkerKind::CleanupUserFiles,
            serde_json::json!({ "userId": user_id }),
        )
    }

    /// Extract the `userId` field of the input, if present and well formed.
    pub fn user_id(&self) -> Option<Uuid> {
        self.input
            .get("userId")
            .and_then(|v| v.as_str())
            .and_then(|s| Uuid::parse_str(s).ok())
    }
}
