//! Gatehouse Server: credential and session authority
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing;
use tracing_subscriber::{EnvFilter, fmt};

use gatehouse_api::AppState;
use gatehouse_auth::jwt::TokenCodec;
use gatehouse_auth::password::{PasswordHasher, PasswordValidator};
use gatehouse_auth::session::{DecisionCache, SessionAuthority};
use gatehouse_cache::provider::CacheManager;
use gatehouse_core::config::AppConfig;
use gatehouse_core::config::database::StoreProvider;
use gatehouse_core::error::AppError;
use gatehouse_core::traits::{CacheProvider, TaskDispatcher};
use gatehouse_database::{
    CredentialStore, DatabasePool, JobRepository, MemoryUserStore, UserRepository,
};
use gatehouse_service::{AccountService, SideEffects};
use gatehouse_worker::jobs::default_executor;
use gatehouse_worker::{JobQueue, LogMailer, LoggingDispatcher, WorkerRunner};

#[tokio::main]
async fn main() {
    let env = std::env::var("GATEHOUSE_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(env = %env, "Configuration loaded");

    if let Err(e) = run(config).await {
        tracing::error!(error = ?e, "Server error");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Gatehouse v{}", env!("CARGO_PKG_VERSION"));

    if config.auth.jwt_secret.is_empty() {
        tracing::warn!("auth.jwt_secret is not set; token issue and verification will fail");
    }

    // ── Step 1: Credential store ─────────────────────────────────
    let (store, pool): (Arc<dyn CredentialStore>, Option<DatabasePool>) =
        match config.database.provider {
            StoreProvider::Postgres => {
                tracing::info!("Connecting to database and running migrations...");
                let pool = DatabasePool::connect_and_migrate(&config.database).await?;
                let store: Arc<dyn CredentialStore> =
                    Arc::new(UserRepository::new(pool.pool().clone()));
                (store, Some(pool))
            }
            StoreProvider::Memory => {
                tracing::warn!("Using in-memory credential store; data is lost on exit");
                (Arc::new(MemoryUserStore::new()) as Arc<dyn CredentialStore>, None)
            }
        };
    if !store.health_check().await? {
        tracing::warn!("Credential store health check failed");
    }

    // ── Step 2: Decision cache ───────────────────────────────────
    let cache = Arc::new(CacheManager::new(&config.cache).await?);
    if !cache.health_check().await? {
        tracing::warn!("Decision cache health check failed");
    }
    let decisions = DecisionCache::new(
        Arc::clone(&cache),
        Duration::from_secs(config.cache.decision_ttl_seconds),
    );

    // ── Step 3: Auth ─────────────────────────────────────────────
    let codec = Arc::new(TokenCodec::new(&config.auth));
    let authority = Arc::new(SessionAuthority::new(
        Arc::clone(&codec),
        Arc::clone(&store),
        decisions,
        &config.auth,
    ));

    // ── Step 4: Task dispatcher and worker ───────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let (dispatcher, worker_handle): (Arc<dyn TaskDispatcher>, Option<JoinHandle<()>>) =
        match &pool {
            Some(pool) => {
                let job_repo = Arc::new(JobRepository::new(pool.pool().clone()));
                let queue = Arc::new(JobQueue::new(job_repo, &config.worker));
                let handle = if config.worker.enabled {
                    Some(start_worker(
                        Arc::clone(&queue),
                        Arc::clone(&store),
                        &config,
                        shutdown_rx.clone(),
                    ))
                } else {
                    tracing::info!("Background worker disabled");
                    None
                };
                (queue as Arc<dyn TaskDispatcher>, handle)
            }
            None => {
                tracing::warn!("No job queue without PostgreSQL; tasks are logged and dropped");
                (Arc::new(LoggingDispatcher) as Arc<dyn TaskDispatcher>, None)
            }
        };

    // ── Step 5: Services ─────────────────────────────────────────
    let accounts = Arc::new(AccountService::new(
        Arc::clone(&store),
        codec,
        Arc::clone(&authority),
        Arc::new(PasswordHasher::new()),
        Arc::new(PasswordValidator::new(&config.auth)),
        SideEffects::new(dispatcher),
    ));

    // ── Step 6: HTTP server ──────────────────────────────────────
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let app = gatehouse_api::build_app(AppState::new(Arc::new(config), authority, accounts));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;
    tracing::info!(addr = %addr, "Gatehouse server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            tracing::info!("Shutdown signal received, starting graceful shutdown...");
            let _ = shutdown_tx.send(true);
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    // ── Step 7: Drain background work ────────────────────────────
    if let Some(handle) = worker_handle {
        if tokio::time::timeout(grace, handle).await.is_err() {
            tracing::warn!("Worker did not stop within the grace period");
        }
    }
    if let Some(pool) = pool {
        pool.close().await;
    }

    tracing::info!("Gatehouse server shut down gracefully");
    Ok(())
}

/// Spawn the job worker over the persistent queue
fn start_worker(
    queue: Arc<JobQueue>,
    store: Arc<dyn CredentialStore>,
    config: &AppConfig,
    cancel: watch::Receiver<bool>,
) -> JoinHandle<()> {
    let executor = Arc::new(default_executor(store, Arc::new(LogMailer), &config.worker));
    let runner = WorkerRunner::new(queue, executor, &config.worker);

    tracing::info!("Background worker started");
    tokio::spawn(async move {
        runner.run(cancel).await;
    })
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
