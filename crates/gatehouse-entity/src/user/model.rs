//! User entity model.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Email address, always stored in lowercase.
    pub email: String,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Credential epoch. Advanced on every password change; tokens carrying
    /// an older value are no longer honoured.
    pub password_at: DateTime<Utc>,
    /// Whether the email address has been confirmed.
    pub email_verified: bool,
    /// Pending single-use verification code.
    #[serde(skip_serializing)]
    pub email_verification_code: Option<String>,
    /// Pending single-use password reset code.
    #[serde(skip_serializing)]
    pub password_reset_code: Option<String>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Credential epoch in milliseconds since the Unix epoch, as embedded in tokens.
    pub fn credential_epoch(&self) -> i64 {
        self.password_at.timestamp_millis()
    }

    /// The epoch to store on the next credential change.
    ///
    /// Strictly greater than the current epoch at millisecond resolution, so
    /// tokens issued just before the change are always revoked.
    pub fn next_credential_epoch(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let floor = self.password_at + Duration::milliseconds(1);
        truncate_to_millis(now.max(floor))
    }
}

/// Drop sub-millisecond precision so the stored epoch round-trips through tokens.
pub fn truncate_to_millis(at: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(at.timestamp_millis()).unwrap_or(at)
}

/// Data required to create a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Lowercase email address.
    pub email: String,
    /// Pre-hashed password.
    pub password_hash: String,
    /// Initial credential epoch.
    pub password_at: DateTime<Utc>,
}
