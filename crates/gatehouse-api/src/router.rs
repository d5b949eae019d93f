//! Route definitions for the Gatehouse HTTP API.
//!
//! Every route lives under `/auth`. The router receives `AppState` and
//! passes it to all handlers via Axum's `State` extractor.

use axum::{
    Router,
    routing::{get, post},
};

use crate::handlers;
use crate::state::AppState;

/// Build the auth router without middleware.
pub fn build_router(state: AppState) -> Router {
    Router::new().merge(auth_routes()).with_state(state)
}

/// Auth endpoints
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route(
            "/auth/check",
            get(handlers::auth::check_query).post(handlers::auth::check_body),
        )
        .route(
            "/auth/resend-verification",
            post(handlers::auth::resend_verification),
        )
        .route("/auth/verify-email", post(handlers::auth::verify_email))
        .route(
            "/auth/request-password-reset",
            post(handlers::auth::request_password_reset),
        )
        .route("/auth/reset-password", post(handlers::auth::reset_password))
        .route("/auth/change-password", post(handlers::auth::change_password))
        .route("/auth/change-email", post(handlers::auth::change_email))
        .route("/auth/destroy-account", post(handlers::auth::destroy_account))
}
