//! JSON API.
//!
//! `GET /api/{table}` accepts the same query string as the browser pages and
//! returns the page as JSON.

use std::collections::{BTreeMap, HashMap};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use serde::Serialize;
use tracing::instrument;

use crate::components::Table;
use crate::components::browser::{BrowserQuery, Cell, ViewState};
use crate::error::AppError;
use crate::middleware::RequireAdminAuth;
use crate::services::{Browsed, browse_table};
use crate::state::AppState;

/// Build the API router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/{table}", get(browse))
}

#[derive(Debug, Serialize)]
pub struct ApiRow {
    pub id: String,
    pub cells: BTreeMap<&'static str, Cell>,
}

#[derive(Debug, Serialize)]
pub struct ApiPage {
    pub table: Table,
    pub state: ViewState,
    pub page: usize,
    pub page_count: usize,
    pub total_matches: usize,
    pub total_scope: usize,
    pub filter_by: &'static str,
    pub rows: Vec<ApiRow>,
}

impl From<Browsed> for ApiPage {
    fn from(page: Browsed) -> Self {
        Self {
            table: page.table,
            state: page.state,
            page: page.page,
            page_count: page.page_count,
            total_matches: page.total_matches,
            total_scope: page.total_scope,
            filter_by: page.filter_by,
            rows: page
                .rows
                .into_iter()
                .map(|row| ApiRow {
                    id: row.id,
                    cells: row.cells.into_iter().collect(),
                })
                .collect(),
        }
    }
}

/// GET /api/{table}
#[instrument(skip(_admin, state, params))]
pub async fn browse(
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    Path(table): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ApiPage>, AppError> {
    let table: Table = table.parse().map_err(AppError::NotFound)?;
    let query = BrowserQuery::from_params(&params);
    let page = browse_table(state.store(), table, &query, state.config().page_size).await?;
    Ok(Json(ApiPage::from(page)))
}
