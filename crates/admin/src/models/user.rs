//! User accounts: customers, staff and administrators.

use serde::{Deserialize, Serialize};

use mahardika_core::{Email, LoyaltyTier, Role, UserUid};

/// Email address of the account whose role can never be changed.
pub const SUPER_ADMIN_EMAIL: &str = "superadmin@mahardika.co";

/// A portal user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub uid: UserUid,
    pub role: Role,
    pub loyalty_tier: LoyaltyTier,
    pub points: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<Email>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    /// Staff member or administrator responsible for this account.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_owner: Option<UserUid>,
}

impl User {
    /// Name shown in tables: display name, then email, then uid.
    #[must_use]
    pub fn name(&self) -> &str {
        self.display_name
            .as_deref()
            .or_else(|| self.email.as_ref().map(Email::as_str))
            .unwrap_or_else(|| self.uid.as_str())
    }

    #[must_use]
    pub fn email_str(&self) -> &str {
        self.email.as_ref().map_or("", Email::as_str)
    }

    /// The built-in super administrator.
    #[must_use]
    pub fn is_super_admin(&self) -> bool {
        self.role == Role::Admin && self.email_str().eq_ignore_ascii_case(SUPER_ADMIN_EMAIL)
    }

    /// Admins and staff may sign in to the portal.
    #[must_use]
    pub const fn can_sign_in(&self) -> bool {
        matches!(self.role, Role::Admin | Role::Staff)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user(uid: &str, role: Role, email: Option<&str>, name: Option<&str>) -> User {
        User {
            uid: UserUid::new(uid),
            role,
            loyalty_tier: LoyaltyTier::Bronze,
            points: 0,
            email: email.map(|e| Email::parse(e).unwrap()),
            display_name: name.map(ToString::to_string),
            photo_url: None,
            linked_owner: None,
        }
    }

    #[test]
    fn test_name_fallbacks() {
        assert_eq!(user("C1", Role::Customer, Some("a@b.co"), Some("Ali")).name(), "Ali");
        assert_eq!(user("C1", Role::Customer, Some("a@b.co"), None).name(), "a@b.co");
        assert_eq!(user("C1", Role::Customer, None, None).name(), "C1");
    }

    #[test]
    fn test_super_admin_requires_admin_role() {
        assert!(user("A1", Role::Admin, Some(SUPER_ADMIN_EMAIL), None).is_super_admin());
        assert!(!user("S1", Role::Staff, Some(SUPER_ADMIN_EMAIL), None).is_super_admin());
        assert!(user("A2", Role::Admin, Some("SuperAdmin@Mahardika.co"), None).is_super_admin());
        assert!(!user("A2", Role::Admin, Some("anotheradmin@mahardika.co"), None).is_super_admin());
    }
}
