//! Admin settings routes.
//!
//! Profile and notification preferences. They are kept in the operator's
//! session and are gone when the session ends.

use askama::Template;
use axum::{
    Form, Router,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;
use validator::Validate;

use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::models::{Preferences, Toast, session::keys};
use crate::services::{FormErrors, notifications};
use crate::state::AppState;

use super::{Layout, render};

/// Settings page template.
#[derive(Template)]
#[template(path = "settings.html")]
pub struct SettingsTemplate {
    pub layout: Layout,
    pub form: SettingsForm,
    pub errors: FormErrors,
}

/// Build the settings router.
pub fn router() -> Router<AppState> {
    Router::new().route("/settings", get(settings_page).post(save_settings))
}

/// Submitted settings form. Unchecked switches are absent from the body.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct SettingsForm {
    #[validate(length(min = 2, message = "Display name must be at least 2 characters."))]
    pub display_name: String,

    #[validate(email(message = "Please enter a valid email address."))]
    pub email: String,

    #[validate(length(max = 160, message = "Bio must not be longer than 160 characters."))]
    pub bio: String,

    pub avatar_url: String,

    pub email_notifications: Option<String>,
    pub push_notifications: Option<String>,
    pub whatsapp_notifications: Option<String>,
}

fn switch(on: bool) -> Option<String> {
    on.then(|| "on".to_string())
}

impl From<&Preferences> for SettingsForm {
    fn from(prefs: &Preferences) -> Self {
        Self {
            display_name: prefs.display_name.clone(),
            email: prefs.email.clone(),
            bio: prefs.bio.clone(),
            avatar_url: prefs.avatar_url.clone(),
            email_notifications: switch(prefs.email_notifications),
            push_notifications: switch(prefs.push_notifications),
            whatsapp_notifications: switch(prefs.whatsapp_notifications),
        }
    }
}

impl SettingsForm {
    /// Validate the form into preferences.
    ///
    /// # Errors
    ///
    /// Returns the per-field messages if any field is invalid.
    pub fn into_preferences(self) -> Result<Preferences, FormErrors> {
        let mut errors = self.validate().err().map(FormErrors::from).unwrap_or_default();
        let avatar_url = self.avatar_url.trim().to_string();
        if !avatar_url.is_empty() && url::Url::parse(&avatar_url).is_err() {
            errors.add("avatar_url", "Please enter a valid URL.");
        }

        errors.into_result(Preferences {
            display_name: self.display_name.trim().to_string(),
            email: self.email.trim().to_string(),
            bio: self.bio,
            avatar_url,
            email_notifications: self.email_notifications.is_some(),
            push_notifications: self.push_notifications.is_some(),
            whatsapp_notifications: self.whatsapp_notifications.is_some(),
        })
    }

    pub const fn email_on(&self) -> bool {
        self.email_notifications.is_some()
    }

    pub const fn push_on(&self) -> bool {
        self.push_notifications.is_some()
    }

    pub const fn whatsapp_on(&self) -> bool {
        self.whatsapp_notifications.is_some()
    }
}

/// Settings page.
///
/// GET /settings
#[instrument(skip(admin, session))]
pub async fn settings_page(
    RequireAdminAuth(admin): RequireAdminAuth,
    session: Session,
) -> Result<Response, AppError> {
    let prefs: Preferences = session
        .get(keys::PREFERENCES)
        .await?
        .unwrap_or_default();
    let template = SettingsTemplate {
        layout: Layout::load(&admin, &session, "/settings").await?,
        form: SettingsForm::from(&prefs),
        errors: FormErrors::new(),
    };
    Ok(render(&template).into_response())
}

/// Save preferences.
///
/// POST /settings
#[instrument(skip(admin, session, form))]
pub async fn save_settings(
    RequireAdminAuth(admin): RequireAdminAuth,
    session: Session,
    Form(form): Form<SettingsForm>,
) -> Result<Response, AppError> {
    match form.clone().into_preferences() {
        Ok(prefs) => {
            session.insert(keys::PREFERENCES, &prefs).await?;
            notifications::flash(
                &session,
                Toast::new("Settings Saved", "Your settings have been (simulated) saved."),
            )
            .await?;
            tracing::info!(uid = %admin.uid, "Preferences saved");
            Ok(Redirect::to("/settings").into_response())
        }
        Err(errors) => {
            let template = SettingsTemplate {
                layout: Layout::load(&admin, &session, "/settings").await?,
                form,
                errors,
            };
            Ok((StatusCode::UNPROCESSABLE_ENTITY, render(&template)).into_response())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_round_trip_through_form() {
        let prefs = Preferences::default();
        let back = SettingsForm::from(&prefs).into_preferences().unwrap();
        assert_eq!(back, prefs);
    }

    #[test]
    fn test_invalid_fields_are_reported() {
        let form = SettingsForm {
            display_name: "A".to_string(),
            email: "not-an-email".to_string(),
            avatar_url: "nope".to_string(),
            ..SettingsForm::default()
        };
        let errors = form.into_preferences().unwrap_err();
        assert_eq!(
            errors.message("display_name"),
            "Display name must be at least 2 characters."
        );
        assert!(errors.has("email"));
        assert_eq!(errors.message("avatar_url"), "Please enter a valid URL.");
    }

    #[test]
    fn test_unchecked_switches_turn_off() {
        let form = SettingsForm {
            display_name: "Irfan".to_string(),
            email: "irfan@mahardika.co".to_string(),
            email_notifications: Some("on".to_string()),
            ..SettingsForm::default()
        };
        let prefs = form.into_preferences().unwrap();
        assert!(prefs.email_notifications);
        assert!(!prefs.push_notifications);
        assert!(!prefs.whatsapp_notifications);
    }
}
