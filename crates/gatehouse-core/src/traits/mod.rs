//! Collaborator traits defined in `gatehouse-core` and implemented by other crates.

pub mod cache;
pub mod dispatcher;

pub use cache::CacheProvider;
pub use dispatcher::TaskDispatcher;
