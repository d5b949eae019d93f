//! Authorization decisions for bearer tokens and the cache that memoizes them.

pub mod authority;
pub mod cache;

pub use authority::SessionAuthority;
pub use cache::DecisionCache;
