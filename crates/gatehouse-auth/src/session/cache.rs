//! Decision cache protocol over a [`CacheProvider`].

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};
use uuid::Uuid;

use gatehouse_cache::keys;
use gatehouse_cache::provider::CacheManager;
use gatehouse_core::result::AppResult;
use gatehouse_core::traits::CacheProvider;
use gatehouse_entity::decision::Decision;

/// Memoizes authorization decisions per `(user, token)` pair.
///
/// Entries live under `"{user_id}:{token}"` so every decision for a user can
/// be dropped with one prefix delete.
#[derive(Debug, Clone)]
pub struct DecisionCache {
    cache: Arc<CacheManager>,
    ttl: Duration,
}

impl DecisionCache {
    /// Creates a decision cache with the given entry TTL.
    pub fn new(cache: Arc<CacheManager>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    /// Look up a cached decision.
    ///
    /// Backend errors propagate. A value that no longer deserializes is
    /// treated as absent.
    pub async fn get(&self, user_id: Uuid, token: &str) -> AppResult<Option<Decision>> {
        let key = keys::decision(user_id, token);
        let Some(raw) = self.cache.get(&key).await? else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(decision) => Ok(Some(decision)),
            Err(e) => {
                warn!(user_id = %user_id, error = %e, "Discarding undecodable cached decision");
                Ok(None)
            }
        }
    }

    /// Store a decision. Overwrites an existing entry for the same pair.
    pub async fn put(&self, user_id: Uuid, token: &str, decision: &Decision) -> AppResult<()> {
        let key = keys::decision(user_id, token);
        self.cache.set_json(&key, decision, self.ttl).await
    }

    /// Drop the cached decision for one `(user, token)` pair.
    pub async fn remove(&self, user_id: Uuid, token: &str) -> AppResult<()> {
        self.cache.delete(&keys::decision(user_id, token)).await
    }

    /// Drop every cached decision for the user. Returns the number removed.
    pub async fn flush_user(&self, user_id: Uuid) -> AppResult<u64> {
        let removed = self
            .cache
            .delete_prefix(&keys::decision_user_prefix(user_id))
            .await?;
        debug!(user_id = %user_id, removed, "Flushed cached decisions");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatehouse_cache::memory::MemoryCacheProvider;
    use gatehouse_core::config::cache::MemoryCacheConfig;

    fn decision_cache() -> (DecisionCache, Arc<CacheManager>) {
        let provider = MemoryCacheProvider::new(&MemoryCacheConfig { max_capacity: 100 });
        let manager = Arc::new(CacheManager::from_provider(Arc::new(provider)));
        (
            DecisionCache::new(manager.clone(), Duration::from_secs(3600)),
            manager,
        )
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let (cache, _) = decision_cache();
        let user = Uuid::new_v4();
        let decision = Decision::for_user(user, false);

        assert_eq!(cache.get(user, "tok").await.unwrap(), None);
        cache.put(user, "tok", &decision).await.unwrap();
        assert_eq!(cache.get(user, "tok").await.unwrap(), Some(decision));
    }

    #[tokio::test]
    async fn test_flush_user_leaves_other_users_alone() {
        let (cache, _) = decision_cache();
        let bob = Uuid::new_v4();
        let eve = Uuid::new_v4();
        cache.put(bob, "t1", &Decision::for_user(bob, false)).await.unwrap();
        cache.put(bob, "t2", &Decision::for_user(bob, false)).await.unwrap();
        cache.put(eve, "t1", &Decision::for_user(eve, false)).await.unwrap();

        assert_eq!(cache.flush_user(bob).await.unwrap(), 2);
        assert_eq!(cache.get(bob, "t1").await.unwrap(), None);
        assert_eq!(cache.get(bob, "t2").await.unwrap(), None);
        assert!(cache.get(eve, "t1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_remove_drops_only_that_token() {
        let (cache, _) = decision_cache();
        let user = Uuid::new_v4();
        cache.put(user, "t1", &Decision::for_user(user, false)).await.unwrap();
        cache.put(user, "t2", &Decision::for_user(user, false)).await.unwrap();

        cache.remove(user, "t1").await.unwrap();
        assert_eq!(cache.get(user, "t1").await.unwrap(), None);
        assert!(cache.get(user, "t2").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_corrupt_entry_reads_as_miss() {
        let (cache, manager) = decision_cache();
        let user = Uuid::new_v4();
        manager
            .set(&keys::decision(user, "tok"), "{not json", Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(cache.get(user, "tok").await.unwrap(), None);
    }
}
