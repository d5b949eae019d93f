//! Response DTOs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gatehouse_service::AuthResult;

/// Returned by register and login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Bearer token.
    pub token: String,
    /// User id.
    pub id: Uuid,
}

impl From<AuthResult> for TokenResponse {
    fn from(result: AuthResult) -> Self {
        Self {
            token: result.token,
            id: result.user_id,
        }
    }
}
