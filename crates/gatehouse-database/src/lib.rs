//! # gatehouse-database
//!
//! The credential store behind account lifecycle and session checks:
//! a [`CredentialStore`] trait with PostgreSQL and in-memory
//! implementations, plus the job table repository and migrations.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryUserStore;
pub use repositories::{JobRepository, UserRepository};
pub use store::CredentialStore;
