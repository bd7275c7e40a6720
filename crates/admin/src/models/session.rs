//! Session-related types.
//!
//! Everything the portal keeps per operator lives in the session: the signed-in
//! identity, flashed toasts, the row selection, a pending delete confirmation
//! and the profile preferences edited on the settings page.

use serde::{Deserialize, Serialize};

use mahardika_core::{Email, Role, UserUid};

use crate::services::actions::RowAction;

use super::User;

/// Session-stored operator identity.
///
/// Sign-in is simulated; this only records which staff or admin account the
/// operator picked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentAdmin {
    pub uid: UserUid,
    pub email: Email,
    pub name: String,
    pub role: Role,
}

impl CurrentAdmin {
    /// Build the session identity for a user that may sign in.
    #[must_use]
    pub fn from_user(user: &User) -> Option<Self> {
        if !user.can_sign_in() {
            return None;
        }
        Some(Self {
            uid: user.uid.clone(),
            email: user.email.clone()?,
            name: user.name().to_string(),
            role: user.role,
        })
    }
}

/// A destructive row action waiting for the operator to confirm it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingConfirmation {
    pub table: String,
    pub id: String,
    pub action: RowAction,
    pub prompt: String,
}

/// Profile and notification preferences from the settings page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub display_name: String,
    pub email: String,
    pub bio: String,
    pub avatar_url: String,
    pub email_notifications: bool,
    pub push_notifications: bool,
    pub whatsapp_notifications: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            display_name: "Irfan Admin".to_string(),
            email: "admin@mahardika.co".to_string(),
            bio: "Lead administrator for Mahardika Insurance Portal.".to_string(),
            avatar_url: String::new(),
            email_notifications: true,
            push_notifications: false,
            whatsapp_notifications: true,
        }
    }
}

/// Session keys.
pub mod keys {
    /// Key for storing the current signed-in operator.
    pub const CURRENT_ADMIN: &str = "current_admin";

    /// Key for toasts waiting to be shown on the next page.
    pub const TOASTS: &str = "toasts";

    /// Key for the row selection of the most recently rendered table.
    pub const SELECTION: &str = "selection";

    /// Key for a delete awaiting confirmation.
    pub const PENDING_CONFIRMATION: &str = "pending_confirmation";

    /// Key for settings page preferences.
    pub const PREFERENCES: &str = "preferences";
}
