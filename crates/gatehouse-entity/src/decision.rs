//! Authorization decisions handed to the query engine and memoized in the cache.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::user::Role;

/// Outcome of authorizing a bearer token.
///
/// Serialized as `{"role":"public"}` for anonymous callers and as
/// `{"role","userId","allowedRoles"}` for authenticated ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    /// The role the request runs as.
    pub role: Role,
    /// The authenticated user, absent for anonymous callers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
    /// Every role the caller may assume, absent for anonymous callers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_roles: Option<Vec<Role>>,
}

impl Decision {
    /// The anonymous decision returned for requests without a token.
    pub fn public() -> Self {
        Self {
            role: Role::Public,
            user_id: None,
            allowed_roles: None,
        }
    }

    /// Decision for an authenticated user, elevated when `privileged` holds.
    pub fn for_user(user_id: Uuid, privileged: bool) -> Self {
        let (role, allowed_roles) = if privileged {
            (Role::Superuser, vec![Role::User, Role::Superuser])
        } else {
            (Role::User, vec![Role::User])
        };
        Self {
            role,
            user_id: Some(user_id),
            allowed_roles: Some(allowed_roles),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_decision_has_only_role() {
        let json = serde_json::to_value(Decision::public()).unwrap();
        assert_eq!(json, serde_json::json!({ "role": "public" }));
    }

    #[test]
    fn test_user_decision_shape() {
        let id = Uuid::new_v4();
        let json = serde_json::to_value(Decision::for_user(id, false)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "role": "user", "userId": id, "allowedRoles": ["user"] })
        );
    }

    #[test]
    fn test_privileged_decision_allows_both_roles() {
        let decision = Decision::for_user(Uuid::new_v4(), true);
        assert_eq!(decision.role, Role::Superuser);
        assert_eq!(
            decision.allowed_roles,
            Some(vec![Role::User, Role::Superuser])
        );
    }

    #[test]
    fn test_round_trips_through_cache_json() {
        let decision = Decision::for_user(Uuid::new_v4(), true);
        let raw = serde_json::to_string(&decision).unwrap();
        let back: Decision = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, decision);
    }
}
