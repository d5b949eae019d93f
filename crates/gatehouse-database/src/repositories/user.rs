//! PostgreSQL credential store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use gatehouse_core::error::{AppError, ErrorKind};
use gatehouse_core::result::AppResult;
use gatehouse_entity::user::{CreateUser, User};

use crate::store::CredentialStore;

const EMAIL_UNIQUE_CONSTRAINT: &str = "users_email_key";

/// Repository for user records backed by the `users` table.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Map a write error, turning an email uniqueness violation into `AlreadyExists`.
fn map_email_write_error(e: sqlx::Error, email: &str, context: &'static str) -> AppError {
    match e {
        sqlx::Error::Database(ref db_err)
            if db_err.constraint() == Some(EMAIL_UNIQUE_CONSTRAINT) =>
        {
            AppError::already_exists(format!("User with email {email} already exists."))
        }
        _ => AppError::with_source(ErrorKind::Database, context, e),
    }
}

#[async_trait]
impl CredentialStore for UserRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find user by id", e))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find user by email", e)
            })
    }

    async fn find_by_email_and_reset_code(
        &self,
        email: &str,
        code: &str,
    ) -> AppResult<Option<User>> {
        sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE email = $1 AND password_reset_code = $2",
        )
        .bind(email)
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find user by reset code", e)
        })
    }

    async fn create(&self, data: &CreateUser) -> AppResult<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (email, password_hash, password_at) \
             VALUES ($1, $2, $3) \
             RETURNING *",
        )
        .bind(&data.email)
        .bind(&data.password_hash)
        .bind(data.password_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_email_write_error(e, &data.email, "Failed to create user"))
    }

    async fn update_credential(
        &self,
        user_id: Uuid,
        password_hash: &str,
        password_at: DateTime<Utc>,
        expected_reset_code: Option<&str>,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, password_at = $3, \
                              password_reset_code = NULL, updated_at = NOW() \
             WHERE id = $1 AND ($4::text IS NULL OR password_reset_code = $4)",
        )
        .bind(user_id)
        .bind(password_hash)
        .bind(password_at)
        .bind(expected_reset_code)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update password", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_email(&self, user_id: Uuid, email: &str) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE users SET email = $2, email_verified = FALSE, \
                              email_verification_code = NULL, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(user_id)
        .bind(email)
        .execute(&self.pool)
        .await
        .map_err(|e| map_email_write_error(e, email, "Failed to update email"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_verification_code(&self, user_id: Uuid, code: &str) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE users SET email_verification_code = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(user_id)
        .bind(code)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to store verification code", e)
        })?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_password_reset_code(&self, user_id: Uuid, code: &str) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE users SET password_reset_code = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(user_id)
        .bind(code)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to store reset code", e)
        })?;

        Ok(result.rows_affected() > 0)
    }

    async fn consume_verification_code(&self, code: &str) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE users SET email_verified = TRUE, email_verification_code = NULL, \
                              updated_at = NOW() \
             WHERE email_verification_code = $1",
        )
        .bind(code)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to consume verification code", e)
        })?;

        Ok(result.rows_affected())
    }

    async fn delete(&self, user_id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete user", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Health check failed", e))
    }
}
