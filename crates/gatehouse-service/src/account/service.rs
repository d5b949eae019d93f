//! Account lifecycle: registration, login, verification, email change, destruction.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use gatehouse_auth::jwt::TokenCodec;
use gatehouse_auth::password::{PasswordHasher, PasswordValidator};
use gatehouse_auth::session::SessionAuthority;
use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_core::types::AsyncTask;
use gatehouse_database::store::CredentialStore;
use gatehouse_entity::user::model::truncate_to_millis;
use gatehouse_entity::user::{CreateUser, User};

use crate::context::SessionContext;
use crate::dispatch::{DispatchPolicy, SideEffects};

/// Token and user id returned by register and login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResult {
    /// Freshly issued bearer token.
    pub token: String,
    /// The account the token belongs to.
    pub user_id: Uuid,
}

/// Drives account state transitions over the credential store.
///
/// Every credential-affecting transition commits the store write first,
/// then flushes cached decisions, then dispatches notifications.
#[derive(Debug, Clone)]
pub struct AccountService {
    pub(super) store: Arc<dyn CredentialStore>,
    pub(super) codec: Arc<TokenCodec>,
    pub(super) authority: Arc<SessionAuthority>,
    pub(super) hasher: Arc<PasswordHasher>,
    pub(super) validator: Arc<PasswordValidator>,
    pub(super) effects: SideEffects,
}

/// Canonical form of an email address: trimmed and lowercase.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl AccountService {
    /// Creates a new account service.
    pub fn new(
        store: Arc<dyn CredentialStore>,
        codec: Arc<TokenCodec>,
        authority: Arc<SessionAuthority>,
        hasher: Arc<PasswordHasher>,
        validator: Arc<PasswordValidator>,
        effects: SideEffects,
    ) -> Self {
        Self {
            store,
            codec,
            authority,
            hasher,
            validator,
            effects,
        }
    }

    /// Load the session user, failing with `UserNotFound` if it is gone.
    pub(super) async fn session_user(&self, ctx: &SessionContext) -> AppResult<User> {
        self.store
            .find_by_id(ctx.user_id)
            .await?
            .ok_or_else(|| AppError::user_not_found("User not found"))
    }

    /// Registers a new, unverified account and returns a token for it.
    pub async fn register(&self, email: &str, password: &str) -> AppResult<AuthResult> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(AppError::invalid_input("Email is required"));
        }
        self.validator.validate(password)?;
        if !self.codec.is_configured() {
            return Err(AppError::configuration("Token signing secret is not configured"));
        }

        // Pre-check only; the store's unique constraint is authoritative.
        if self.store.find_by_email(&email).await?.is_some() {
            return Err(AppError::already_exists(format!(
                "User with email {email} already exists."
            )));
        }

        let password_hash = self.hasher.hash_password(password)?;
        let user = self
            .store
            .create(&CreateUser {
                email,
                password_hash,
                password_at: truncate_to_millis(Utc::now()),
            })
            .await?;
        info!(user_id = %user.id, "User registered");

        let token = self.codec.issue(&user)?;

        self.effects
            .dispatch(AsyncTask::verify_email(user.id), DispatchPolicy::BestEffort)
            .await?;

        Ok(AuthResult {
            token,
            user_id: user.id,
        })
    }

    /// Exchanges email and password for a token.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<AuthResult> {
        let email = normalize_email(email);
        if password.is_empty() {
            return Err(AppError::invalid_input("Password is required"));
        }

        let user = self
            .store
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AppError::not_found("User not found!"))?;

        self.hasher.require_match(
            password,
            &user.password_hash,
            "Email or password did not match.",
        )?;

        let token = self.codec.issue(&user)?;
        info!(user_id = %user.id, "User logged in");

        Ok(AuthResult {
            token,
            user_id: user.id,
        })
    }

    /// Sends a fresh verification code to the session user.
    pub async fn resend_verification(&self, ctx: &SessionContext) -> AppResult<()> {
        let user = self.session_user(ctx).await?;
        if user.email_verified {
            return Err(AppError::invalid_input("Email already verified!"));
        }

        self.effects
            .dispatch(AsyncTask::verify_email(user.id), DispatchPolicy::MustSucceed)
            .await?;
        info!(user_id = %user.id, "Verification email requested");
        Ok(())
    }

    /// Consumes a verification code, marking its owner verified.
    pub async fn verify_email(&self, code: &str) -> AppResult<()> {
        let code = code.trim();
        if code.is_empty() {
            return Err(AppError::invalid_code("Invalid verification code"));
        }

        let matched = self.store.consume_verification_code(code).await?;
        if matched == 0 {
            return Err(AppError::invalid_code("Invalid verification code"));
        }

        info!(matched, "Email verified");
        Ok(())
    }

    /// Moves the session user to a new, unverified email address.
    pub async fn change_email(
        &self,
        ctx: &SessionContext,
        password: &str,
        new_email: &str,
    ) -> AppResult<()> {
        let user = self.session_user(ctx).await?;
        self.hasher
            .require_match(password, &user.password_hash, "Password did not match.")?;

        let new_email = normalize_email(new_email);
        if new_email.is_empty() {
            return Err(AppError::invalid_input("New email is required"));
        }
        if new_email == user.email {
            return Err(AppError::invalid_input(
                "New email must differ from the current email",
            ));
        }
        if let Some(existing) = self.store.find_by_email(&new_email).await? {
            if existing.id != user.id {
                return Err(AppError::already_exists(format!(
                    "User with email {new_email} already exists."
                )));
            }
        }

        if !self.store.update_email(user.id, &new_email).await? {
            return Err(AppError::user_not_found("User not found"));
        }
        info!(user_id = %user.id, "Email changed");

        self.authority.flush_user(user.id).await?;

        self.effects
            .dispatch(AsyncTask::verify_email(user.id), DispatchPolicy::BestEffort)
            .await
    }

    /// Permanently deletes the session user after re-checking the password.
    pub async fn destroy_account(&self, ctx: &SessionContext, password: &str) -> AppResult<()> {
        let user = self.session_user(ctx).await?;
        self.hasher
            .require_match(password, &user.password_hash, "Password did not match.")?;

        if !self.store.delete(user.id).await? {
            return Err(AppError::user_not_found("User not found"));
        }
        info!(user_id = %user.id, "User destroyed");

        self.authority.flush_user(user.id).await?;

        self.effects
            .dispatch(
                AsyncTask::user_destroyed_email(&user.email),
                DispatchPolicy::BestEffort,
            )
            .await?;
        self.effects
            .dispatch(
                AsyncTask::cleanup_user_files(user.id),
                DispatchPolicy::BestEffort,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  A@X.com "), "a@x.com");
        assert_eq!(normalize_email(""), "");
    }
}
