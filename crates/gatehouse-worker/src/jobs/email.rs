//! Account email jobs: verification, password reset, and notices.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tracing;
use uuid::Uuid;

use gatehouse_auth::code::generate_code;
use gatehouse_core::config::worker::WorkerConfig;
use gatehouse_core::types::WorkerKind;
use gatehouse_database::CredentialStore;
use gatehouse_entity::job::Job;
use gatehouse_entity::user::User;

use crate::executor::{JobExecutionError, JobHandler};
use crate::mailer::{Mailer, OutboundMail};

/// Shared state of the account email handlers.
#[derive(Debug)]
pub struct AccountMailer {
    store: Arc<dyn CredentialStore>,
    mailer: Arc<dyn Mailer>,
    app_name: String,
    web_base_url: String,
    sender: String,
}

impl AccountMailer {
    /// Create a new account mailer
    pub fn new(
        store: Arc<dyn CredentialStore>,
        mailer: Arc<dyn Mailer>,
        config: &WorkerConfig,
    ) -> Self {
        Self {
            store,
            mailer,
            app_name: config.app_name.clone(),
            web_base_url: config.web_base_url.trim_end_matches('/').to_string(),
            sender: config.email_sender.clone(),
        }
    }

    /// Link the web client opens for a code.
    pub fn link(&self, path: &str, code: &str) -> String {
        format!("{}/{}/{}", self.web_base_url, path, code)
    }

    async fn load_user(&self, job: &Job) -> Result<User, JobExecutionError> {
        let user_id = payload_user_id(&job.payload)?;
        self.store.find_by_id(user_id).await?.ok_or_else(|| {
            JobExecutionError::Permanent(format!("User {user_id} no longer exists"))
        })
    }

    async fn deliver(&self, to: &str, subject: &str, body: String) -> Result<(), JobExecutionError> {
        self.mailer
            .send(OutboundMail {
                from: self.sender.clone(),
                to: to.to_string(),
                subject: format!("{} - {}", self.app_name, subject),
                body,
            })
            .await
            .map_err(|e| JobExecutionError::Transient(format!("Mail delivery failed: {e}")))
    }

    async fn send_verification(&self, job: &Job) -> Result<Value, JobExecutionError> {
        let user = self.load_user(job).await?;
        if user.email_verified {
            tracing::info!(user_id = %user.id, "Email already verified, skipping");
            return Ok(json!({ "skipped": true }));
        }

        let code = generate_code();
        if !self.store.set_verification_code(user.id, &code).await? {
            return Err(JobExecutionError::Permanent(format!(
                "User {} no longer exists",
                user.id
            )));
        }

        let link = self.link("verify-email", &code);
        self.deliver(
            &user.email,
            "Verify your email",
            format!("Confirm your email address by opening {link}"),
        )
        .await?;

        tracing::info!(user_id = %user.id, "Verification email sent");
        Ok(json!({ "sentTo": user.email }))
    }

    async fn send_password_reset(&self, job: &Job) -> Result<Value, JobExecutionError> {
        let user = self.load_user(job).await?;

        let code = generate_code();
        if !self.store.set_password_reset_code(user.id, &code).await? {
            return Err(JobExecutionError::Permanent(format!(
                "User {} no longer exists",
                user.id
            )));
        }

        let link = self.link("reset-password", &code);
        self.deliver(
            &user.email,
            "Reset your password",
            format!(
                "Choose a new password by opening {link}\n\
                 If you did not ask for this, ignore this message."
            ),
        )
        .await?;

        tracing::info!(user_id = %user.id, "Password reset email sent");
        Ok(json!({ "sentTo": user.email }))
    }

    async fn send_password_changed(&self, job: &Job) -> Result<Value, JobExecutionError> {
        let user = self.load_user(job).await?;
        self.deliver(
            &user.email,
            "Your password was changed",
            "The password for your account was just changed. \
             All existing sessions have been signed out."
                .to_string(),
        )
        .await?;
        Ok(json!({ "sentTo": user.email }))
    }

    async fn send_user_destroyed(&self, job: &Job) -> Result<Value, JobExecutionError> {
        let email = job
            .payload
            .get("email")
            .and_then(Value::as_str)
            .filter(|e| !e.is_empty())
            .ok_or_else(|| JobExecutionError::Permanent("Missing email in payload".into()))?;

        self.deliver(
            email,
            "Your account was deleted",
            format!("Your {} account and its data have been deleted.", self.app_name),
        )
        .await?;
        Ok(json!({ "sentTo": email }))
    }
}

/// Read `userId` from a task payload.
pub fn payload_user_id(payload: &Value) -> Result<Uuid, JobExecutionError> {
    payload
        .get("userId")
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| JobExecutionError::Permanent("Missing or invalid userId in payload".into()))
}

/// Handler for `verify-email`
#[derive(Debug)]
pub struct VerifyEmailHandler {
    inner: Arc<AccountMailer>,
}

impl VerifyEmailHandler {
    /// Create a new verify-email handler
    pub fn new(inner: Arc<AccountMailer>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl JobHandler for VerifyEmailHandler {
    fn worker_kind(&self) -> WorkerKind {
        WorkerKind::VerifyEmail
    }

    async fn execute(&self, job: &Job) -> Result<Option<Value>, JobExecutionError> {
        Ok(Some(self.inner.send_verification(job).await?))
    }
}

/// Handler for `password-reset-email`
#[derive(Debug)]
pub struct PasswordResetEmailHandler {
    inner: Arc<AccountMailer>,
}

impl PasswordResetEmailHandler {
    /// Create a new password-reset-email handler
    pub fn new(inner: Arc<AccountMailer>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl JobHandler for PasswordResetEmailHandler {
    fn worker_kind(&self) -> WorkerKind {
        WorkerKind::PasswordResetEmail
    }

    async fn execute(&self, job: &Job) -> Result<Option<Value>, JobExecutionError> {
        Ok(Some(self.inner.send_password_reset(job).await?))
    }
}

/// Handler for `password-changed-email`
#[derive(Debug)]
pub struct PasswordChangedEmailHandler {
    inner: Arc<AccountMailer>,
}

impl PasswordChangedEmailHandler {
    /// Create a new password-changed-email handler
    pub fn new(inner: Arc<AccountMailer>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl JobHandler for PasswordChangedEmailHandler {
    fn worker_kind(&self) -> WorkerKind {
        WorkerKind::PasswordChangedEmail
    }

    async fn execute(&self, job: &Job) -> Result<Option<Value>, JobExecutionError> {
        Ok(Some(self.inner.send_password_changed(job).await?))
    }
}

/// Handler for `user-destroyed-email`
#[derive(Debug)]
pub struct UserDestroyedEmailHandler {
    inner: Arc<AccountMailer>,
}

impl UserDestroyedEmailHandler {
    /// Create a new user-destroyed-email handler
    pub fn new(inner: Arc<AccountMailer>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl JobHandler for UserDestroyedEmailHandler {
    fn worker_kind(&self) -> WorkerKind {
        WorkerKind::UserDestroyedEmail
    }

    async fn execute(&self, job: &Job) -> Result<Option<Value>, JobExecutionError> {
        Ok(Some(self.inner.send_user_destroyed(job).await?))
    }
}
