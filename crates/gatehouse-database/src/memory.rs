//! In-memory credential store for development and tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use gatehouse_core::error::AppError;
use gatehouse_core::result::AppResult;
use gatehouse_entity::user::{CreateUser, User};

use crate::store::CredentialStore;

/// Process-local store keyed by user id.
///
/// Each mutation holds the write lock for its whole check-and-update, which
/// gives the same single-row atomicity as the conditional SQL updates.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    /// Whether the store holds no users.
    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

fn email_taken(users: &HashMap<Uuid, User>, email: &str, except: Option<Uuid>) -> bool {
    users
        .values()
        .any(|u| u.email == email && Some(u.id) != except)
}

#[async_trait]
impl CredentialStore for MemoryUserStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_email_and_reset_code(
        &self,
        email: &str,
        code: &str,
    ) -> AppResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email && u.password_reset_code.as_deref() == Some(code))
            .cloned())
    }

    async fn create(&self, data: &CreateUser) -> AppResult<User> {
        let mut users = self.users.write().await;
        if email_taken(&users, &data.email, None) {
            return Err(AppError::already_exists(format!(
                "User with email {} already exists.",
                data.email
            )));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: data.email.clone(),
            password_hash: data.password_hash.clone(),
            password_at: data.password_at,
            email_verified: false,
            email_verification_code: None,
            password_reset_code: None,
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update_credential(
        &self,
        user_id: Uuid,
        password_hash: &str,
        password_at: DateTime<Utc>,
        expected_reset_code: Option<&str>,
    ) -> AppResult<bool> {
        let mut users = self.users.write().await;
        let Some(user) = users.get_mut(&user_id) else {
            return Ok(false);
        };
        if let Some(expected) = expected_reset_code {
            if user.password_reset_code.as_deref() != Some(expected) {
                return Ok(false);
            }
        }

        user.password_hash = password_hash.to_string();
        user.password_at = password_at;
        user.password_reset_code = None;
        user.updated_at = Utc::now();
        Ok(true)
    }

    async fn update_email(&self, user_id: Uuid, email: &str) -> AppResult<bool> {
        let mut users = self.users.write().await;
        if email_taken(&users, email, Some(user_id)) {
            return Err(AppError::already_exists(format!(
                "User with email {email} already exists."
            )));
        }
        let Some(user) = users.get_mut(&user_id) else {
            return Ok(false);
        };

        user.email = email.to_string();
        user.email_verified = false;
        user.email_verification_code = None;
        user.updated_at = Utc::now();
        Ok(true)
    }

    async fn set_verification_code(&self, user_id: Uuid, code: &str) -> AppResult<bool> {
        let mut users = self.users.write().await;
        Ok(match users.get_mut(&user_id) {
            Some(user) => {
                user.email_verification_code = Some(code.to_string());
                user.updated_at = Utc::now();
                true
            }
            None => false,
        })
    }

    async fn set_password_reset_code(&self, user_id: Uuid, code: &str) -> AppResult<bool> {
        let mut users = self.users.write().await;
        Ok(match users.get_mut(&user_id) {
            Some(user) => {
                user.password_reset_code = Some(code.to_string());
                user.updated_at = Utc::now();
                true
            }
            None => false,
        })
    }

    async fn consume_verification_code(&self, code: &str) -> AppResult<u64> {
        let mut users = self.users.write().await;
        let mut matched = 0;
        for user in users
            .values_mut()
            .filter(|u| u.email_verification_code.as_deref() == Some(code))
        {
            user.email_verified = true;
            user.email_verification_code = None;
            user.updated_at = Utc::now();
            matched += 1;
        }
        Ok(matched)
    }

    async fn delete(&self, user_id: Uuid) -> AppResult<bool> {
        Ok(self.users.write().await.remove(&user_id).is_some())
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
