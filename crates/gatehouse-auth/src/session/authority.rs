//! Session authority: turns bearer tokens into authorization decisions.

use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use gatehouse_core::config::auth::AuthConfig;
use gatehouse_core::error::{AppError, ErrorKind};
use gatehouse_core::result::AppResult;
use gatehouse_database::store::CredentialStore;
use gatehouse_entity::decision::Decision;
use gatehouse_entity::user::User;

use super::cache::DecisionCache;
use crate::jwt::TokenCodec;

/// Validates bearer tokens into [`Decision`]s, consulting the decision cache
/// before the credential store.
///
/// A cache hit is returned as-is without re-checking the credential epoch,
/// so every credential change must go through [`flush_user`](Self::flush_user)
/// before it is acknowledged.
#[derive(Clone)]
pub struct SessionAuthority {
    codec: Arc<TokenCodec>,
    store: Arc<dyn CredentialStore>,
    cache: DecisionCache,
    privileged_domains: Vec<String>,
}

impl std::fmt::Debug for SessionAuthority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionAuthority")
            .field("privileged_domains", &self.privileged_domains)
            .finish()
    }
}

impl SessionAuthority {
    /// Creates a session authority.
    pub fn new(
        codec: Arc<TokenCodec>,
        store: Arc<dyn CredentialStore>,
        cache: DecisionCache,
        config: &AuthConfig,
    ) -> Self {
        let privileged_domains = config
            .privileged_email_domains
            .iter()
            .map(|d| d.trim().trim_start_matches('@').to_lowercase())
            .filter(|d| !d.is_empty())
            .collect();

        Self {
            codec,
            store,
            cache,
            privileged_domains,
        }
    }

    /// Authorize a bearer token.
    ///
    /// 1. Empty token: the anonymous `public` decision.
    /// 2. Signature or structure failure: `InvalidToken`.
    /// 3. Cached decision for `(user, token)`: returned unchanged.
    /// 4. Unknown user: `UserNotFound`.
    /// 5. Token epoch differs from the stored epoch: `TokenExpired`.
    /// 6. Otherwise the derived decision, cached for the configured TTL. The
    ///    user is re-read after the write so a credential change that lands
    ///    in between drops the entry instead of leaving it cached.
    pub async fn authorize(&self, token: &str) -> AppResult<Decision> {
        if token.is_empty() {
            return Ok(Decision::public());
        }

        let claims = self.codec.verify(token).map_err(|e| match e.kind {
            ErrorKind::MalformedToken => AppError::invalid_token("Invalid token"),
            _ => e,
        })?;
        let user_id = claims
            .parsed_user_id()
            .ok_or_else(|| AppError::invalid_token("Invalid token"))?;

        if let Some(decision) = self.cache.get(user_id, token).await? {
            debug!(user_id = %user_id, "Decision cache hit");
            return Ok(decision);
        }

        let user = self.current_user(user_id, claims.password_at).await?;
        let decision = Decision::for_user(user.id, self.is_privileged(&user.email));

        // Cache write failures do not fail the request.
        if let Err(e) = self.cache.put(user_id, token, &decision).await {
            warn!(user_id = %user_id, error = %e, "Failed to cache decision");
            return Ok(decision);
        }

        // A credential change may have committed and flushed between the
        // load above and the write; the entry must not outlive it.
        if let Err(e) = self.current_user(user_id, claims.password_at).await {
            debug!(user_id = %user_id, "Credential changed while caching, dropping decision");
            self.cache.remove(user_id, token).await?;
            return Err(e);
        }

        Ok(decision)
    }

    /// Load the user and check the token's credential epoch against it.
    async fn current_user(&self, user_id: Uuid, token_epoch: i64) -> AppResult<User> {
        let user = self
            .store
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::user_not_found("User not found"))?;

        if token_epoch != user.credential_epoch() {
            return Err(AppError::token_expired(
                "Token expired, password has been changed",
            ));
        }
        Ok(user)
    }

    /// Drop every cached decision for the user.
    pub async fn flush_user(&self, user_id: Uuid) -> AppResult<u64> {
        self.cache.flush_user(user_id).await
    }

    /// Whether the email belongs to a privileged domain.
    pub fn is_privileged(&self, email: &str) -> bool {
        let email = email.to_lowercase();
        self.privileged_domains
            .iter()
            .any(|domain| email.ends_with(&format!("@{domain}")))
    }
}
