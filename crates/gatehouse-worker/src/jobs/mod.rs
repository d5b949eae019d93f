//! Built-in job handler implementations, one per worker kind.

pub mod cleanup;
pub mod email;

use std::sync::Arc;

use gatehouse_core::config::worker::WorkerConfig;
use gatehouse_database::CredentialStore;

pub use cleanup::CleanupUserFilesHandler;
pub use email::{
    AccountMailer, PasswordChangedEmailHandler, PasswordResetEmailHandler,
    UserDestroyedEmailHandler, VerifyEmailHandler,
};

use crate::executor::JobExecutor;
use crate::mailer::Mailer;

/// Build an executor with a handler registered for every worker kind.
pub fn default_executor(
    store: Arc<dyn CredentialStore>,
    mailer: Arc<dyn Mailer>,
    config: &WorkerConfig,
) -> JobExecutor {
    let account_mailer = Arc::new(AccountMailer::new(store, mailer, config));

    let mut executor = JobExecutor::new();
    executor.register(Arc::new(VerifyEmailHandler::new(account_mailer.clone())));
    executor.register(Arc::new(PasswordResetEmailHandler::new(
        account_mailer.clone(),
    )));
    executor.register(Arc::new(PasswordChangedEmailHandler::new(
        account_mailer.clone(),
    )));
    executor.register(Arc::new(UserDestroyedEmailHandler::new(account_mailer)));
    executor.register(Arc::new(CleanupUserFilesHandler::new(
        config.uploads_root.clone(),
    )));
    executor
}
