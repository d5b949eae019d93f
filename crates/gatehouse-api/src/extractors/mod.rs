//! Custom Axum extractors.

pub mod auth;
pub mod json;

pub use auth::{SessionUser, bearer_token, header_token};
pub use json::ValidatedJson;
