//! User invitations.
//!
//! Inviting a user adds the account to the store straight away. No email is
//! sent; the invitation is only logged.

use serde::Deserialize;
use tracing::instrument;
use validator::Validate;

use mahardika_core::{Email, LoyaltyTier, Role, UserUid, next_sequential_id};

use crate::db::{Repository, RepositoryError, Store};
use crate::models::{Toast, User};

use super::forms::FormErrors;

/// Submitted "Add New User" form.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct NewUserForm {
    #[validate(length(min = 2, message = "Display name must be at least 2 characters."))]
    #[serde(default)]
    pub display_name: String,

    #[validate(email(message = "Please enter a valid email address."))]
    #[serde(default)]
    pub email: String,

    #[validate(length(min = 1, message = "Please select a role."))]
    #[serde(default)]
    pub role: String,
}

impl NewUserForm {
    /// Blank form with the customer role preselected.
    #[must_use]
    pub fn blank() -> Self {
        Self {
            role: Role::Customer.as_str().to_string(),
            ..Self::default()
        }
    }
}

/// A validated invitation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invitation {
    pub display_name: String,
    pub email: Email,
    pub role: Role,
}

impl Invitation {
    /// Validate `form`.
    ///
    /// # Errors
    ///
    /// Returns the per-field messages if any field is invalid.
    pub fn from_form(form: &NewUserForm) -> Result<Self, FormErrors> {
        let mut errors = form.validate().err().map(FormErrors::from).unwrap_or_default();

        let email = Email::parse(&form.email);
        if let Err(e) = &email {
            errors.add("email", format!("Please enter a valid email address ({e})."));
        }
        let role = form.role.parse::<Role>();
        if role.is_err() {
            errors.add("role", "Please select a role.");
        }

        match (email, role) {
            (Ok(email), Ok(role)) if errors.is_empty() => Ok(Self {
                display_name: form.display_name.trim().to_string(),
                email,
                role,
            }),
            _ => Err(errors),
        }
    }

    /// List page the new account appears on.
    #[must_use]
    pub const fn landing_path(&self) -> &'static str {
        match self.role {
            Role::Customer => "/customers",
            Role::Staff => "/staff",
            Role::Admin => "/admins",
        }
    }

    /// Confirmation toast.
    #[must_use]
    pub fn toast(&self) -> Toast {
        Toast::new(
            "Invitation Sent (Simulated)",
            format!(
                "An invitation has been sent to {} for the role of {}.",
                self.email, self.role
            ),
        )
    }
}

/// Add the invited user to the store under the next free uid for its role.
///
/// # Errors
///
/// Returns [`RepositoryError::Conflict`] if another account already uses the
/// email address.
#[instrument(skip(store, invitation), fields(role = %invitation.role))]
pub async fn invite(
    store: &Store,
    invitation: &Invitation,
    invited_by: Option<&UserUid>,
) -> Result<User, RepositoryError> {
    let users = store.users.list().await?;
    if users
        .iter()
        .any(|u| invitation.email.same_address(u.email_str()))
    {
        return Err(RepositoryError::conflict("User", invitation.email.as_str()));
    }

    let uid = next_sequential_id(
        invitation.role.uid_prefix(),
        users.iter().map(|u| u.uid.as_str()),
    );
    let user = User {
        uid: UserUid::new(uid),
        role: invitation.role,
        loyalty_tier: LoyaltyTier::Bronze,
        points: 0,
        email: Some(invitation.email.clone()),
        display_name: Some(invitation.display_name.clone()),
        photo_url: None,
        linked_owner: invited_by.cloned(),
    };

    let user = store.users.insert(user).await?;
    tracing::info!(uid = %user.uid, email = %invitation.email, "Invitation sent (simulated)");
    Ok(user)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::Fixtures;

    fn form(name: &str, email: &str, role: &str) -> NewUserForm {
        NewUserForm {
            display_name: name.to_string(),
            email: email.to_string(),
            role: role.to_string(),
        }
    }

    #[test]
    fn test_invalid_form_reports_each_field() {
        let errors = Invitation::from_form(&form("A", "not-an-email", "owner")).unwrap_err();
        assert_eq!(
            errors.get("display_name"),
            Some("Display name must be at least 2 characters.")
        );
        assert_eq!(errors.get("email"), Some("Please enter a valid email address."));
        assert_eq!(errors.get("role"), Some("Please select a role."));
    }

    #[test]
    fn test_landing_path_follows_role() {
        let staff = Invitation::from_form(&form("Nora", "nora@mahardika.co", "staff")).unwrap();
        assert_eq!(staff.landing_path(), "/staff");
        assert_eq!(
            staff.toast().description,
            "An invitation has been sent to nora@mahardika.co for the role of staff."
        );
    }

    #[tokio::test]
    async fn test_invite_assigns_next_uid() {
        let store = Store::from_fixtures(Fixtures::builtin().unwrap());
        let invitation = Invitation::from_form(&form("Lim Wei", "lim@example.com", "customer")).unwrap();

        let user = invite(&store, &invitation, Some(&UserUid::new("ADMIN001"))).await.unwrap();
        assert_eq!(user.uid.as_str(), "CUST006");
        assert_eq!(user.linked_owner.as_ref().map(UserUid::as_str), Some("ADMIN001"));
        assert!(store.users.contains("CUST006").await);
    }

    #[tokio::test]
    async fn test_invite_rejects_duplicate_email() {
        let store = Store::from_fixtures(Fixtures::builtin().unwrap());
        let invitation =
            Invitation::from_form(&form("Again", "superadmin@mahardika.co", "admin")).unwrap();
        let err = invite(&store, &invitation, None).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_invite_rejects_duplicate_email_in_other_case() {
        let store = Store::from_fixtures(Fixtures::builtin().unwrap());
        let before = store.users.len().await;
        let invitation =
            Invitation::from_form(&form("Shadow Admin", "SuperAdmin@Mahardika.co", "admin")).unwrap();

        let err = invite(&store, &invitation, None).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict { .. }));
        assert_eq!(store.users.len().await, before);
    }
}
