//! Policy create, edit and export routes.

use std::collections::HashMap;

use askama::Template;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use chrono::Utc;
use tower_sessions::Session;
use tracing::instrument;

use mahardika_core::{PolicyType, Role};

use crate::components::browser::{BrowserQuery, ViewState};
use crate::db::{Repository, Store};
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::models::CurrentAdmin;
use crate::services::browse::matching_policies;
use crate::services::policies::{self, saved_toast};
use crate::services::{FormErrors, PolicyForm, PolicyWriteError, notifications};
use crate::state::AppState;

use super::tables::OptionView;
use super::{Layout, render};

/// Build the policies router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/policies/export", get(export))
        .route("/policies/new", get(new_form).post(create))
        .route("/policies/{id}/edit", get(edit_form).post(update))
}

// =============================================================================
// Templates
// =============================================================================

/// Create or edit form.
#[derive(Template)]
#[template(path = "policies/form.html")]
pub struct PolicyFormTemplate {
    pub layout: Layout,
    pub title: String,
    pub description: String,
    pub action: String,
    pub submit_label: &'static str,
    pub form: PolicyForm,
    pub errors: FormErrors,
    pub customers: Vec<OptionView>,
    pub vehicles: Vec<OptionView>,
    pub types: Vec<OptionView>,
}

/// Shown when the policy being edited does not exist.
#[derive(Template)]
#[template(path = "policies/not_found.html")]
pub struct PolicyNotFoundTemplate {
    pub layout: Layout,
    pub id: String,
}

/// Which form is being shown.
enum FormMode<'a> {
    Create,
    Edit(&'a str),
}

impl FormMode<'_> {
    fn action(&self) -> String {
        match self {
            Self::Create => "/policies/new".to_string(),
            Self::Edit(id) => format!("/policies/{id}/edit"),
        }
    }
}

async fn form_template(
    store: &Store,
    layout: Layout,
    mode: &FormMode<'_>,
    form: PolicyForm,
    errors: FormErrors,
) -> Result<PolicyFormTemplate, AppError> {
    let customers = store
        .users
        .list()
        .await?
        .into_iter()
        .filter(|u| u.role == Role::Customer)
        .map(|u| OptionView {
            selected: u.uid.as_str() == form.owner_uid,
            label: format!("{} ({})", u.name(), u.uid),
            value: u.uid.to_string(),
        })
        .collect();
    let vehicles = store
        .vehicles
        .list()
        .await?
        .into_iter()
        .filter(|v| !v.archived || v.id.as_str() == form.vehicle_id)
        .map(|v| OptionView {
            selected: v.id.as_str() == form.vehicle_id,
            label: format!("{} ({})", v.plate_number, v.id),
            value: v.id.to_string(),
        })
        .collect();
    let types = PolicyType::ALL
        .iter()
        .map(|t| OptionView {
            value: t.as_str().to_string(),
            label: t.label().to_string(),
            selected: t.as_str() == form.policy_type,
        })
        .collect();

    let (title, description, submit_label) = match mode {
        FormMode::Create => (
            "Create New Policy".to_string(),
            "Fill in the details for the new insurance policy.".to_string(),
            "Create Policy",
        ),
        FormMode::Edit(id) => (
            format!("Edit Policy {id}"),
            "Update the policy details below.".to_string(),
            "Save Changes",
        ),
    };

    Ok(PolicyFormTemplate {
        layout,
        title,
        description,
        action: mode.action(),
        submit_label,
        form,
        errors,
        customers,
        vehicles,
        types,
    })
}

/// Turn a policy write result into a response: redirect on success, the form
/// with inline errors (422) on validation failure.
async fn finish_write(
    state: &AppState,
    admin: &CurrentAdmin,
    session: &Session,
    mode: FormMode<'_>,
    form: PolicyForm,
    result: Result<crate::models::Policy, PolicyWriteError>,
) -> Result<Response, AppError> {
    match result {
        Ok(policy) => {
            let created = matches!(mode, FormMode::Create);
            notifications::flash(session, saved_toast(&policy, created)).await?;
            Ok(Redirect::to("/policies").into_response())
        }
        Err(PolicyWriteError::Invalid(errors)) => {
            tracing::debug!(fields = errors.len(), "Policy form rejected");
            let layout = Layout::load(admin, session, "/policies").await?;
            let template = form_template(state.store(), layout, &mode, form, errors).await?;
            Ok((StatusCode::UNPROCESSABLE_ENTITY, render(&template)).into_response())
        }
        Err(PolicyWriteError::Repository(e)) => Err(e.into()),
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// New policy form.
#[instrument(skip(admin, state, session))]
pub async fn new_form(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
) -> Result<Response, AppError> {
    let layout = Layout::load(&admin, &session, "/policies").await?;
    let template = form_template(
        state.store(),
        layout,
        &FormMode::Create,
        PolicyForm::blank(),
        FormErrors::new(),
    )
    .await?;
    Ok(render(&template).into_response())
}

/// Create a policy.
#[instrument(skip(admin, state, session, form), fields(admin = %admin.uid))]
pub async fn create(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<PolicyForm>,
) -> Result<Response, AppError> {
    let today = Utc::now().date_naive();
    let result = policies::create(state.store(), &form, today).await;
    finish_write(&state, &admin, &session, FormMode::Create, form, result).await
}

/// Edit form for an existing policy.
///
/// Resolves after the configured detail delay. An unknown id renders the
/// not-found state with a 404 status.
#[instrument(skip(admin, state, session))]
pub async fn edit_form(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let delay = state.config().detail_delay;
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let policy = state.store().policies.get(&id).await?;
    let layout = Layout::load(&admin, &session, "/policies").await?;

    match (ViewState::for_detail(policy.is_some()), policy) {
        (ViewState::Loaded, Some(policy)) => {
            let template = form_template(
                state.store(),
                layout,
                &FormMode::Edit(&id),
                PolicyForm::from_policy(&policy),
                FormErrors::new(),
            )
            .await?;
            Ok(render(&template).into_response())
        }
        _ => {
            tracing::info!(%id, "Policy not found");
            let template = PolicyNotFoundTemplate { layout, id };
            Ok((StatusCode::NOT_FOUND, render(&template)).into_response())
        }
    }
}

/// Update an existing policy.
#[instrument(skip(admin, state, session, form), fields(admin = %admin.uid))]
pub async fn update(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<PolicyForm>,
) -> Result<Response, AppError> {
    let today = Utc::now().date_naive();
    let result = policies::update(state.store(), &id, &form, today).await;
    finish_write(&state, &admin, &session, FormMode::Edit(&id), form, result).await
}

/// Download every policy matching the browser filters as JSON.
#[instrument(skip(_admin, state, params))]
pub async fn export(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, AppError> {
    let query = BrowserQuery::from_params(&params);
    let policies = matching_policies(state.store(), &query).await?;
    let body = serde_json::to_vec_pretty(&policies)
        .map_err(|e| AppError::Internal(format!("failed to encode policies: {e}")))?;
    tracing::info!(count = policies.len(), "Policies exported");

    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"policies.json\"".to_string(),
            ),
        ],
        body,
    )
        .into_response())
}
