//! User roles as issued by the session provider.

use serde::{Deserialize, Serialize};

/// Role attached to a signed-in user.
///
/// Only `Admin` may enter the console. Serialized with the provider's
/// spelling (`"Admin"`, `"User"`) since the session is shared with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum UserRole {
    /// Store administrator with access to the console.
    Admin,
    /// Regular customer account.
    #[default]
    User,
}

impl UserRole {
    /// Whether this role grants access to admin pages.
    #[must_use]
    pub const fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "Admin"),
            Self::User => write!(f, "User"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Admin" => Ok(Self::Admin),
            "User" => Ok(Self::User),
            _ => Err(format!("invalid user role: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_only_admin_is_admin() {
        assert!(UserRole::Admin.is_admin());
        assert!(!UserRole::User.is_admin());
    }

    #[test]
    fn test_role_round_trips_through_display() {
        for role in [UserRole::Admin, UserRole::User] {
            assert_eq!(role.to_string().parse::<UserRole>().unwrap(), role);
        }
    }

    #[test]
    fn test_role_parse_is_case_sensitive() {
        assert!("admin".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_role_serde_uses_provider_spelling() {
        assert_eq!(serde_json::to_string(&UserRole::Admin).unwrap(), "\"Admin\"");
    }
}
