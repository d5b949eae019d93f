//! # gatehouse-auth
//!
//! Credential verification and authorization decisions for Gatehouse.
//!
//! ## Modules
//!
//! - `jwt`: stateless bearer token issuing and verification
//! - `password`: Argon2id password hashing and length policy
//! - `code`: single-use verification and reset codes
//! - `session`: the decision cache protocol and the session authority

pub mod code;
pub mod jwt;
pub mod password;
pub mod session;

pub use jwt::{Claims, TokenCodec};
pub use password::{PasswordHasher, PasswordValidator};
pub use session::{DecisionCache, SessionAuthority};
