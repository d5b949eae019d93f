//! Outbound mail seam used by the notification jobs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing;

use gatehouse_core::result::AppResult;

/// A plain-text message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMail {
    /// Sender address.
    pub from: String,
    /// Recipient address.
    pub to: String,
    /// Subject line.
    pub subject: String,
    /// Plain-text body.
    pub body: String,
}

/// Delivers outbound mail.
#[async_trait]
pub trait Mailer: Send + Sync + std::fmt::Debug {
    /// Send one message.
    async fn send(&self, mail: OutboundMail) -> AppResult<()>;
}

/// Mailer that writes each message to the log instead of delivering it.
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, mail: OutboundMail) -> AppResult<()> {
        tracing::info!(
            from = %mail.from,
            to = %mail.to,
            subject = %mail.subject,
            body = %mail.body,
            "Outbound mail"
        );
        Ok(())
    }
}
