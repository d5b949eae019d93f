//! The credential store seam.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use gatehouse_core::result::AppResult;
use gatehouse_entity::user::{CreateUser, User};

/// Persistence for user records.
///
/// Emails are passed in already lowercased; implementations compare them
/// exactly. Every mutation that is guarded by a single-use code is a
/// single conditional write, never a read followed by a write.
#[async_trait]
pub trait CredentialStore: Send + Sync + std::fmt::Debug + 'static {
    /// Find a user by primary key.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find a user by (lowercase) email.
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Find the user whose email and pending reset code both match.
    async fn find_by_email_and_reset_code(&self, email: &str, code: &str)
    -> AppResult<Option<User>>;

    /// Insert a new, unverified user.
    ///
    /// Fails with `AlreadyExists` when the email is taken.
    async fn create(&self, data: &CreateUser) -> AppResult<User>;

    /// Replace the password hash, advance the credential epoch and clear any
    /// pending reset code.
    ///
    /// When `expected_reset_code` is given, the write only applies while that
    /// code is still pending. Returns whether a row was updated.
    async fn update_credential(
        &self,
        user_id: Uuid,
        password_hash: &str,
        password_at: DateTime<Utc>,
        expected_reset_code: Option<&str>,
    ) -> AppResult<bool>;

    /// Change the email address, mark it unverified and drop any pending
    /// verification code.
    ///
    /// Fails with `AlreadyExists` when another account owns the address.
    async fn update_email(&self, user_id: Uuid, email: &str) -> AppResult<bool>;

    /// Store a pending verification code, replacing any previous one.
    async fn set_verification_code(&self, user_id: Uuid, code: &str) -> AppResult<bool>;

    /// Store a pending password reset code, replacing any previous one.
    async fn set_password_reset_code(&self, user_id: Uuid, code: &str) -> AppResult<bool>;

    /// Mark every user holding `code` as verified and clear the code.
    ///
    /// Returns the number of rows that matched.
    async fn consume_verification_code(&self, code: &str) -> AppResult<u64>;

    /// Hard-delete a user. Returns whether a row was removed.
    async fn delete(&self, user_id: Uuid) -> AppResult<bool>;

    /// Check that the store is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}
