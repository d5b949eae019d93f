//! Background job processing for Gatehouse.
//!
//! This crate provides:
//! - A persistent job queue that implements the task dispatcher seam
//! - A worker runner that polls for and executes queued jobs
//! - A job executor that dispatches jobs to the handler for their worker kind
//! - Handlers for account email and user file cleanup

pub mod dispatcher;
pub mod executor;
pub mod jobs;
pub mod mailer;
pub mod queue;
pub mod runner;

pub use dispatcher::LoggingDispatcher;
pub use executor::{JobExecutionError, JobExecutor, JobHandler};
pub use mailer::{LogMailer, Mailer};
pub use queue::JobQueue;
pub use runner::WorkerRunner;
