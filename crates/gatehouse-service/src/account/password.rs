//! Password reset and change flows.

use chrono::Utc;
use tracing::info;

use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_core::types::AsyncTask;
use gatehouse_entity::user::User;

use super::service::{AccountService, normalize_email};
use crate::context::SessionContext;
use crate::dispatch::DispatchPolicy;

impl AccountService {
    /// Sends a password reset code to the account registered under `email`.
    pub async fn request_password_reset(&self, email: &str) -> AppResult<()> {
        let email = normalize_email(email);
        let user = self
            .store
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AppError::not_found("User not found!"))?;

        self.effects
            .dispatch(
                AsyncTask::password_reset_email(user.id),
                DispatchPolicy::MustSucceed,
            )
            .await?;
        info!(user_id = %user.id, "Password reset requested");
        Ok(())
    }

    /// Sets a new password using a pending reset code.
    ///
    /// The email and code must both match the same account. The code is
    /// consumed by the credential update itself, so at most one of several
    /// concurrent resets with the same code succeeds.
    pub async fn complete_password_reset(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> AppResult<()> {
        self.validator.validate_reset_code(code)?;
        let email = normalize_email(email);

        let user = self
            .store
            .find_by_email_and_reset_code(&email, code)
            .await?
            .ok_or_else(|| AppError::invalid_code("Invalid password reset code"))?;

        self.replace_password(&user, new_password, Some(code)).await
    }

    /// Changes the session user's password after checking the old one.
    pub async fn change_password(
        &self,
        ctx: &SessionContext,
        old_password: &str,
        new_password: &str,
    ) -> AppResult<()> {
        let user = self.session_user(ctx).await?;
        self.hasher.require_match(
            old_password,
            &user.password_hash,
            "Old password did not match.",
        )?;

        self.replace_password(&user, new_password, None).await
    }

    /// Hash and store a new password, advance the credential epoch, clear any
    /// pending reset code, flush cached decisions, then notify the user.
    async fn replace_password(
        &self,
        user: &User,
        new_password: &str,
        expected_reset_code: Option<&str>,
    ) -> AppResult<()> {
        self.validator.validate(new_password)?;
        let password_hash = self.hasher.hash_password(new_password)?;
        let password_at = user.next_credential_epoch(Utc::now());

        let updated = self
            .store
            .update_credential(user.id, &password_hash, password_at, expected_reset_code)
            .await?;
        if !updated {
            return Err(match expected_reset_code {
                Some(_) => AppError::invalid_code("Invalid password reset code"),
                None => AppError::user_not_found("User not found"),
            });
        }
        info!(user_id = %user.id, "Password changed");

        self.authority.flush_user(user.id).await?;

        self.effects
            .dispatch(
                AsyncTask::password_changed_email(user.id),
                DispatchPolicy::BestEffort,
            )
            .await
    }
}
