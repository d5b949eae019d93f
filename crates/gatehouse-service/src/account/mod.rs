//! Account lifecycle manager.

pub mod password;
pub mod service;

pub use service::{AccountService, AuthResult, normalize_email};
