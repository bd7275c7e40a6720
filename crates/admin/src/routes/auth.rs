//! Authentication route handlers for admin.
//!
//! Sign-in is simulated: any non-empty password is accepted for an email that
//! belongs to a staff or admin account.

use askama::Template;
use axum::{
    Form, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::db::Repository;
use crate::error::AppError;
use crate::filters;
use crate::middleware::{OptionalAdminAuth, clear_current_admin, set_current_admin};
use crate::models::{CurrentAdmin, Toast, User};
use crate::services::notifications;
use crate::state::AppState;

use super::render;

/// Where a successful sign-in lands.
pub const HOME_PATH: &str = "/dashboard";

/// An account that may sign in, listed under the form.
#[derive(Debug, Clone)]
pub struct AccountHint {
    pub email: String,
    pub role: String,
}

/// Login page template.
#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub email: String,
    pub error: Option<String>,
    pub accounts: Vec<AccountHint>,
}

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(login_page))
        .route("/login", post(login))
        .route("/logout", post(logout))
}

/// Login form body.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

async fn account_hints(state: &AppState) -> Result<Vec<AccountHint>, AppError> {
    Ok(state
        .store()
        .users
        .list()
        .await?
        .iter()
        .filter(|u| u.can_sign_in())
        .map(|u| AccountHint {
            email: u.email_str().to_string(),
            role: u.role.to_string(),
        })
        .collect())
}

/// Render the login page, or skip it if already signed in.
///
/// GET /
#[instrument(skip_all)]
pub async fn login_page(
    OptionalAdminAuth(admin): OptionalAdminAuth,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    if admin.is_some() {
        return Ok(Redirect::to(HOME_PATH).into_response());
    }
    let template = LoginTemplate {
        email: String::new(),
        error: None,
        accounts: account_hints(&state).await?,
    };
    Ok(render(&template).into_response())
}

/// Find the account `email` signs in as.
fn find_operator<'a>(users: &'a [User], email: &str) -> Option<&'a User> {
    let email = email.trim();
    users
        .iter()
        .find(|u| u.can_sign_in() && u.email_str().eq_ignore_ascii_case(email))
}

/// Simulated sign-in.
///
/// POST /login
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let users = state.store().users.list().await?;
    let operator = (!form.password.is_empty())
        .then(|| find_operator(&users, &form.email))
        .flatten()
        .and_then(CurrentAdmin::from_user);

    let Some(admin) = operator else {
        tracing::info!("Sign-in rejected");
        let template = LoginTemplate {
            email: form.email,
            error: Some("Invalid email or password.".to_string()),
            accounts: account_hints(&state).await?,
        };
        return Ok((StatusCode::UNAUTHORIZED, render(&template)).into_response());
    };

    set_current_admin(&session, &admin).await?;
    notifications::flash(
        &session,
        Toast::new("Login Successful", format!("Welcome back, {}!", admin.name)),
    )
    .await?;
    tracing::info!(uid = %admin.uid, role = %admin.role, "Operator signed in");

    Ok(Redirect::to(HOME_PATH).into_response())
}

/// Sign out and return to the login page.
///
/// POST /logout
pub async fn logout(session: Session) -> Redirect {
    if let Err(e) = clear_current_admin(&session).await {
        tracing::warn!(error = %e, "Failed to clear session on logout");
    }
    Redirect::to(crate::middleware::auth::LOGIN_PATH)
}
