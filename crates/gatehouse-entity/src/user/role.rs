//! Authorization role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles an authorization decision can grant.
///
/// Ordered by privilege level: Superuser > User > Public.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Anonymous caller without a token.
    Public,
    /// Authenticated account.
    User,
    /// Authenticated account from a privileged email domain.
    Superuser,
}

impl Role {
    /// Return the privilege level (higher = more privileged).
    pub fn privilege_level(&self) -> u8 {
        match self {
            Self::Superuser => 3,
            Self::User => 2,
            Self::Public => 1,
        }
    }

    /// Check if this role has at least the given role's privileges.
    pub fn has_at_least(&self, other: &Role) -> bool {
        self.privilege_level() >= other.privilege_level()
    }

    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::User => "user",
            Self::Superuser => "superuser",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = gatehouse_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "public" => Ok(Self::Public),
            "user" => Ok(Self::User),
            "superuser" => Ok(Self::Superuser),
            _ => Err(gatehouse_core::AppError::invalid_input(format!(
                "Invalid role: '{s}'. Expected one of: public, user, superuser"
            ))),
        }
    }
}
