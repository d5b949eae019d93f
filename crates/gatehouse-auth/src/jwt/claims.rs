//! Claims embedded in every bearer token.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gatehouse_entity::user::User;

/// Token payload: who the token was issued to and at which credential epoch.
///
/// There is deliberately no `exp`; a token stays valid until the user's
/// credential epoch moves past `password_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// The user id, as issued.
    pub user_id: String,
    /// The user's email at issuance.
    pub email: String,
    /// Credential epoch at issuance, in milliseconds since the Unix epoch.
    pub password_at: i64,
}

impl Claims {
    /// Claims for the user's current credentials.
    pub fn for_user(user: &User) -> Self {
        Self {
            user_id: user.id.to_string(),
            email: user.email.clone(),
            password_at: user.credential_epoch(),
        }
    }

    /// Parse the user id claim. `None` when it is empty or not a UUID.
    pub fn parsed_user_id(&self) -> Option<Uuid> {
        if self.user_id.is_empty() {
            return None;
        }
        Uuid::parse_str(&self.user_id).ok()
    }
}
