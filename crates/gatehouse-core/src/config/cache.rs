//! Decision cache configuration.

use serde::{Deserialize, Serialize};

/// Which cache backend holds authorization decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    /// Shared Redis instance; required when running more than one replica.
    Redis,
    /// Process-local moka cache.
    #[default]
    Memory,
}

/// Top-level cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache backend.
    #[serde(default)]
    pub provider: CacheBackend,
    /// TTL for cached authorization decisions in seconds.
    #[serde(default = "default_decision_ttl")]
    pub decision_ttl_seconds: u64,
    /// Redis-specific cache configuration.
    #[serde(default)]
    pub redis: RedisCacheConfig,
    /// In-memory cache configuration.
    #[serde(default)]
    pub memory: MemoryCacheConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            provider: CacheBackend::default(),
            decision_ttl_seconds: default_decision_ttl(),
            redis: RedisCacheConfig::default(),
            memory: MemoryCacheConfig::default(),
        }
    }
}

/// Redis cache backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisCacheConfig {
    /// Redis connection URL.
    #[serde(default = "default_redis_url")]
    pub url: String,
    /// Key prefix for all Gatehouse cache keys.
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,
    /// Number of keys requested per `SCAN` round trip during prefix deletes.
    #[serde(default = "default_scan_count")]
    pub scan_count: usize,
}

impl Default for RedisCacheConfig {
    fn default() -> Self {
        Self {
            url: default_redis_url(),
            key_prefix: default_key_prefix(),
            scan_count: default_scan_count(),
        }
    }
}

/// In-memory cache backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryCacheConfig {
    /// Maximum number of entries in the cache.
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
}

impl Default for MemoryCacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: default_max_capacity(),
        }
    }
}

fn default_decision_ttl() -> u64 {
    3600
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_key_prefix() -> String {
    "gatehouse:".to_string()
}

fn default_scan_count() -> usize {
    200
}

fn default_max_capacity() -> u64 {
    100_000
}
