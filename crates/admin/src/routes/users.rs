//! Invite user routes.

use std::collections::HashMap;

use askama::Template;
use axum::{
    Form, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use tower_sessions::Session;
use tracing::instrument;

use mahardika_core::Role;

use crate::db::RepositoryError;
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::models::CurrentAdmin;
use crate::services::users::invite;
use crate::services::{FormErrors, Invitation, NewUserForm, notifications};
use crate::state::AppState;

use super::tables::OptionView;
use super::{Layout, render};

/// Roles offered by the form, in display order.
const ROLE_OPTIONS: [(Role, &str); 3] = [
    (Role::Customer, "Customer"),
    (Role::Staff, "Staff"),
    (Role::Admin, "Admin"),
];

/// Add new user page.
#[derive(Template)]
#[template(path = "users/new.html")]
pub struct NewUserTemplate {
    pub layout: Layout,
    pub form: NewUserForm,
    pub errors: FormErrors,
    pub roles: Vec<OptionView>,
}

impl NewUserTemplate {
    fn new(layout: Layout, form: NewUserForm, errors: FormErrors) -> Self {
        let roles = ROLE_OPTIONS
            .iter()
            .map(|(role, label)| OptionView {
                value: role.as_str().to_string(),
                label: (*label).to_string(),
                selected: role.as_str() == form.role,
            })
            .collect();
        Self {
            layout,
            form,
            errors,
            roles,
        }
    }
}

/// Build the users router.
pub fn router() -> Router<AppState> {
    Router::new().route("/users/new", get(new_form).post(create))
}

/// Invite form. `?role=staff` preselects a role.
#[instrument(skip(admin, session, params))]
pub async fn new_form(
    RequireAdminAuth(admin): RequireAdminAuth,
    session: Session,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, AppError> {
    let mut form = NewUserForm::blank();
    if let Some(role) = params.get("role").and_then(|r| r.parse::<Role>().ok()) {
        form.role = role.as_str().to_string();
    }
    let layout = Layout::load(&admin, &session, "/users/new").await?;
    Ok(render(&NewUserTemplate::new(layout, form, FormErrors::new())).into_response())
}

async fn rejected(
    admin: &CurrentAdmin,
    session: &Session,
    status: StatusCode,
    form: NewUserForm,
    errors: FormErrors,
) -> Result<Response, AppError> {
    let layout = Layout::load(admin, session, "/users/new").await?;
    Ok((status, render(&NewUserTemplate::new(layout, form, errors))).into_response())
}

/// Simulated invitation: the user is added to the store and the invitation is
/// logged.
#[instrument(skip(admin, state, session, form), fields(admin = %admin.uid))]
pub async fn create(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<NewUserForm>,
) -> Result<Response, AppError> {
    let invitation = match Invitation::from_form(&form) {
        Ok(invitation) => invitation,
        Err(errors) => {
            return rejected(&admin, &session, StatusCode::UNPROCESSABLE_ENTITY, form, errors)
                .await;
        }
    };

    match invite(state.store(), &invitation, Some(&admin.uid)).await {
        Ok(_) => {
            notifications::flash(&session, invitation.toast()).await?;
            Ok(Redirect::to(invitation.landing_path()).into_response())
        }
        Err(RepositoryError::Conflict { .. }) => {
            let mut errors = FormErrors::new();
            errors.add("email", "A user with this email already exists.");
            rejected(&admin, &session, StatusCode::CONFLICT, form, errors).await
        }
        Err(e) => Err(e.into()),
    }
}
