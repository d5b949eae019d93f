//! # gatehouse-service
//!
//! Account lifecycle layer for Gatehouse. The [`AccountService`] drives
//! registration, login, verification, password reset and change, email
//! change and account destruction over the credential store, keeping the
//! decision cache consistent and dispatching side-effect tasks.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod account;
pub mod context;
pub mod dispatch;

pub use account::{AccountService, AuthResult};
pub use context::SessionContext;
pub use dispatch::{DispatchPolicy, SideEffects};
