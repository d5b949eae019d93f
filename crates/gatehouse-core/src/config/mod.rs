//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section. Every field carries a serde default, so an empty file yields
//! a development setup backed by the in-memory store and cache.

pub mod app;
pub mod auth;
pub mod cache;
pub mod database;
pub mod logging;
pub mod worker;

use serde::{Deserialize, Serialize};

use self::app::ServerConfig;
use self::auth::AuthConfig;
use self::cache::CacheConfig;
use self::database::DatabaseConfig;
use self::logging::LoggingConfig;
use self::worker::WorkerConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Credential store settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Decision cache settings.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Token, password and role settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Background worker settings.
    #[serde(default)]
    pub worker: WorkerConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `GATEHOUSE__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("GATEHOUSE")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("auth.privileged_email_domains")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_source_yields_development_defaults() {
        let config: AppConfig = config::Config::builder()
            .build()
            .and_then(|c| c.try_deserialize())
            .expect("defaults should deserialize");

        assert_eq!(config.database.provider, database::StoreProvider::Memory);
        assert_eq!(config.cache.provider, cache::CacheBackend::Memory);
        assert_eq!(config.cache.decision_ttl_seconds, 3600);
        assert_eq!(config.auth.password_min_length, 5);
        assert_eq!(config.auth.reset_code_min_length, 6);
        assert!(config.auth.jwt_secret.is_empty());
        assert!(config.auth.privileged_email_domains.is_empty());
        assert_eq!(config.worker.max_attempts, 3);
    }

    #[test]
    fn test_toml_overrides_are_applied() {
        let raw = r#"
            [auth]
            jwt_secret = "s3cret"
            privileged_email_domains = ["corp.example"]

            [cache]
            provider = "redis"
        "#;
        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()
            .and_then(|c| c.try_deserialize())
            .expect("overrides should deserialize");

        assert_eq!(config.auth.jwt_secret, "s3cret");
        assert_eq!(config.auth.privileged_email_domains, vec!["corp.example"]);
        assert_eq!(config.cache.provider, cache::CacheBackend::Redis);
    }
}
