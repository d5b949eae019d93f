//! # gatehouse-api
//!
//! HTTP API layer for Gatehouse built on Axum.
//!
//! Provides the `/auth/*` endpoints, middleware (logging, CORS, timeouts),
//! extractors for bearer tokens and upstream sessions, DTOs, and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::build_app;
pub use error::{ApiError, ApiResult};
pub use state::AppState;
