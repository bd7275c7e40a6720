//! Policy and report PDF routes.
//!
//! "View" redirects the browser to the document URL. "Download" streams it
//! back as an attachment. A missing document or a failed fetch sends the
//! operator back to the list with a destructive toast.

use axum::{
    Router,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use tower_sessions::Session;
use tracing::instrument;

use mahardika_core::DocumentUrl;

use crate::components::Table;
use crate::db::{Repository, RepositoryError};
use crate::error::AppError;
use crate::middleware::RequireAdminAuth;
use crate::models::Policy;
use crate::services::actions::{ActionOutcome, policy_document};
use crate::services::documents::{policy_file_name, report_file_name};
use crate::services::notifications;
use crate::state::AppState;

/// Build the documents router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/policies/{id}/document", get(view_policy))
        .route("/policies/{id}/document/download", get(download_policy))
        .route("/reports/{id}/document", get(view_report))
        .route("/reports/{id}/document/download", get(download_report))
}

async fn find_policy(state: &AppState, id: &str) -> Result<Policy, AppError> {
    let policy = state.store().policies.get(id).await?;
    policy.ok_or_else(|| RepositoryError::not_found("Policy", id).into())
}

async fn report_document(state: &AppState, id: &str) -> Result<(DocumentUrl, String), AppError> {
    let report = state
        .store()
        .reports
        .get(id)
        .await?
        .ok_or_else(|| RepositoryError::not_found("Report", id))?;
    let name = report_file_name(&report);
    Ok((report.pdf_url, name))
}

/// Go back to `table`, announcing `outcome`.
async fn back_to_table(
    session: &Session,
    table: Table,
    outcome: &ActionOutcome,
) -> Result<Response, AppError> {
    if let Some(toast) = outcome.toast() {
        notifications::flash(session, toast.clone()).await?;
    }
    Ok(Redirect::to(&table.path()).into_response())
}

/// Stream `url`, or go back to `table` with a toast if the fetch fails.
async fn download(
    state: &AppState,
    session: &Session,
    table: Table,
    url: &DocumentUrl,
    file_name: &str,
) -> Result<Response, AppError> {
    match state.documents().download(url, file_name).await {
        Ok(response) => Ok(response),
        Err(e) => {
            tracing::warn!(error = %e, %url, "Document download failed");
            notifications::flash(session, e.toast()).await?;
            Ok(Redirect::to(&table.path()).into_response())
        }
    }
}

/// GET /policies/{id}/document
#[instrument(skip(_admin, state, session))]
pub async fn view_policy(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let policy = find_policy(&state, &id).await?;
    match policy_document(&policy) {
        Ok(url) => Ok(Redirect::to(url.as_str()).into_response()),
        Err(outcome) => back_to_table(&session, Table::Policies, &outcome).await,
    }
}

/// GET /policies/{id}/document/download
#[instrument(skip(_admin, state, session))]
pub async fn download_policy(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let policy = find_policy(&state, &id).await?;
    match policy_document(&policy) {
        Ok(url) => {
            let name = policy_file_name(&policy);
            download(&state, &session, Table::Policies, url, &name).await
        }
        Err(outcome) => back_to_table(&session, Table::Policies, &outcome).await,
    }
}

/// GET /reports/{id}/document
#[instrument(skip(_admin, state))]
pub async fn view_report(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    let (url, _) = report_document(&state, &id).await?;
    Ok(Redirect::to(url.as_str()))
}

/// GET /reports/{id}/document/download
#[instrument(skip(_admin, state, session))]
pub async fn download_report(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let (url, name) = report_document(&state, &id).await?;
    download(&state, &session, Table::Reports, &url, &name).await
}
