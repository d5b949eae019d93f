//! Context carrying the upstream-resolved session user.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The already-trusted user a request acts for.
///
/// Resolved outside this service (from upstream session context) and
/// passed into operations that require an authenticated account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    /// The session user's ID.
    pub user_id: Uuid,
}

impl SessionContext {
    /// Creates a new session context.
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }
}
