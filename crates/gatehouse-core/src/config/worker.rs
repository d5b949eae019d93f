//! Background worker configuration.

use serde::{Deserialize, Serialize};

/// Background job worker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the worker is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Number of concurrent job processing tasks.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Interval in seconds between job queue polls.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_seconds: u64,
    /// Attempts before a transiently failing job is marked failed.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: i32,
    /// Queue name jobs are enqueued on and dequeued from.
    #[serde(default = "default_queue")]
    pub queue: String,
    /// Root directory holding per-user upload folders.
    #[serde(default = "default_uploads_root")]
    pub uploads_root: String,
    /// Product name used in outbound mail subjects.
    #[serde(default = "default_app_name")]
    pub app_name: String,
    /// Base URL of the web client; verification and reset links point here.
    #[serde(default = "default_web_base_url")]
    pub web_base_url: String,
    /// `From` address of outbound mail.
    #[serde(default = "default_email_sender")]
    pub email_sender: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            concurrency: default_concurrency(),
            poll_interval_seconds: default_poll_interval(),
            max_attempts: default_max_attempts(),
            queue: default_queue(),
            uploads_root: default_uploads_root(),
            app_name: default_app_name(),
            web_base_url: default_web_base_url(),
            email_sender: default_email_sender(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_concurrency() -> usize {
    4
}

fn default_poll_interval() -> u64 {
    5
}

fn default_max_attempts() -> i32 {
    3
}

fn default_queue() -> String {
    "default".to_string()
}

fn default_uploads_root() -> String {
    "./data/uploads".to_string()
}

fn default_app_name() -> String {
    "Gatehouse".to_string()
}

fn default_web_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_email_sender() -> String {
    "no-reply@localhost".to_string()
}
