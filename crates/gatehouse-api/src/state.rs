//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use gatehouse_auth::session::SessionAuthority;
use gatehouse_core::config::AppConfig;
use gatehouse_service::AccountService;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Turns bearer tokens into authorization decisions
    pub authority: Arc<SessionAuthority>,
    /// Account lifecycle operations
    pub accounts: Arc<AccountService>,
}

impl AppState {
    /// Creates the application state.
    pub fn new(
        config: Arc<AppConfig>,
        authority: Arc<SessionAuthority>,
        accounts: Arc<AccountService>,
    ) -> Self {
        Self {
            config,
            authority,
            accounts,
        }
    }
}
