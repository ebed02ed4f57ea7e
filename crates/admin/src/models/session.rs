//! Session-related types for admin authentication.
//!
//! Sign-in is handled by the shared session provider; the console only
//! reads the identity it leaves in the session.

use serde::{Deserialize, Serialize};

use shopdesk_core::{UserId, UserRole};

/// Session-stored user identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's email address.
    pub email: String,
    /// User's display name.
    pub name: String,
    /// Role issued by the session provider.
    pub role: UserRole,
}

impl CurrentUser {
    /// Whether this user may enter admin pages.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Session keys used by the console.
pub mod keys {
    /// Key for storing the current signed-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for a toast that must survive one redirect.
    pub const FLASH: &str = "flash";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_current_user_session_shape() {
        let json = r#"{"id":7,"email":"ops@example.com","name":"Ops","role":"Admin"}"#;
        let user: CurrentUser = serde_json::from_str(json).unwrap();
        assert_eq!(user.id, UserId::new(7));
        assert!(user.is_admin());
    }

    #[test]
    fn test_regular_user_is_not_admin() {
        let user = CurrentUser {
            id: UserId::new(1),
            email: "shopper@example.com".to_string(),
            name: "Shopper".to_string(),
            role: UserRole::User,
        };
        assert!(!user.is_admin());
    }
}
