//! Record browser pages.
//!
//! Every [`Table`] gets the same three routes: the list itself, a selection
//! endpoint and a row action endpoint. The table is attached to each route as
//! an [`Extension`] so the handlers stay generic.

use std::collections::HashMap;

use askama::Template;
use axum::{
    Extension, Form, Router,
    extract::{Path, Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::components::browser::{BrowserQuery, Cell, Selection, SortDirection};
use crate::components::{DataTableConfig, Table};
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::models::{PendingConfirmation, session::keys};
use crate::services::{
    ActionOutcome, Browsed, RowAction, SelectionChange, browse_table, dispatch, notifications,
    selection,
};
use crate::state::AppState;

use super::{Layout, render};

/// Build the browser router for every table.
pub fn router() -> Router<AppState> {
    Table::ALL.into_iter().fold(Router::new(), |router, table| {
        let path = table.path();
        router
            .route(&path, get(index).layer(Extension(table)))
            .route(
                &format!("{path}/selection"),
                post(update_selection).layer(Extension(table)),
            )
            .route(
                &format!("{path}/{{id}}/actions"),
                post(run_action).layer(Extension(table)),
            )
    })
}

// =============================================================================
// View models
// =============================================================================

#[derive(Debug, Clone)]
pub struct HeaderView {
    pub label: &'static str,
    /// Link that toggles sorting on this column.
    pub sort_href: Option<String>,
    /// Arrow for the active sort column, empty otherwise.
    pub indicator: &'static str,
}

/// A cell flattened for the template.
#[derive(Debug, Clone)]
pub struct CellView {
    pub text: String,
    pub is_badge: bool,
    pub is_avatar: bool,
    /// Badge CSS class.
    pub class: &'static str,
    pub photo_url: String,
    pub initial: String,
}

impl From<&Cell> for CellView {
    fn from(cell: &Cell) -> Self {
        let text = cell.as_text().to_string();
        let initial = text
            .chars()
            .next()
            .map_or_else(|| "?".to_string(), |c| c.to_uppercase().collect());
        let mut view = Self {
            text,
            is_badge: false,
            is_avatar: false,
            class: "",
            photo_url: String::new(),
            initial,
        };
        match cell {
            Cell::Text { .. } => {}
            Cell::Badge { tone, .. } => {
                view.is_badge = true;
                view.class = tone.css_class();
            }
            Cell::Avatar { photo_url, .. } => {
                view.is_avatar = true;
                view.photo_url = photo_url.clone().unwrap_or_default();
            }
        }
        view
    }
}

#[derive(Debug, Clone)]
pub struct MenuItemView {
    pub action: &'static str,
    pub label: String,
    pub enabled: bool,
    pub destructive: bool,
}

#[derive(Debug, Clone)]
pub struct RowView {
    pub id: String,
    pub selected: bool,
    pub cells: Vec<CellView>,
    pub menu: Vec<MenuItemView>,
}

#[derive(Debug, Clone)]
pub struct OptionView {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

#[derive(Debug, Clone)]
pub struct LinkView {
    pub href: String,
    pub label: String,
}

#[derive(Debug, Clone)]
pub struct SelectView {
    pub key: String,
    pub label: String,
    pub options: Vec<OptionView>,
}

/// Everything the browser template renders.
#[derive(Debug, Clone)]
pub struct TableView {
    pub path: String,
    /// This page's URL, posted back by forms so redirects keep the query.
    pub return_to: String,
    pub headers: Vec<HeaderView>,
    pub rows: Vec<RowView>,
    pub is_empty: bool,
    pub no_results: bool,
    pub filter: String,
    pub filter_by: String,
    pub filter_by_options: Vec<OptionView>,
    pub selects: Vec<SelectView>,
    /// Active sort, carried through the filter form.
    pub sort_column: String,
    pub sort_dir: &'static str,
    pub clear_sort_href: Option<String>,
    pub create: Option<LinkView>,
    pub export: Option<LinkView>,
    pub page: usize,
    pub page_count: usize,
    pub total_matches: usize,
    pub total_scope: usize,
    pub prev_href: Option<String>,
    pub next_href: Option<String>,
    pub all_selected: bool,
    pub selected_count: usize,
    pub confirm: Option<PendingConfirmation>,
    /// Columns in the table, counting the checkbox and action columns.
    pub colspan: usize,
}

impl TableView {
    #[must_use]
    pub fn build(
        page: &Browsed,
        config: &DataTableConfig,
        selection: &Selection,
        confirm: Option<PendingConfirmation>,
    ) -> Self {
        let path = page.table.path();
        let query = &page.query;

        let headers = page
            .headers
            .iter()
            .map(|h| {
                let indicator = match &query.sort {
                    Some(sort) if sort.column == h.key => match sort.direction {
                        SortDirection::Asc => "↑",
                        SortDirection::Desc => "↓",
                    },
                    _ => "",
                };
                HeaderView {
                    label: h.label,
                    sort_href: h
                        .sortable
                        .then(|| query.with_sort_toggled(h.key).href(&path)),
                    indicator,
                }
            })
            .collect();

        let rows = page
            .rows
            .iter()
            .map(|row| RowView {
                id: row.id.clone(),
                selected: selection.is_selected(&row.id),
                cells: row.cells.iter().map(|(_, cell)| CellView::from(cell)).collect(),
                menu: row
                    .menu
                    .iter()
                    .map(|item| MenuItemView {
                        action: item.action.as_str(),
                        label: item.label.clone(),
                        enabled: item.enabled,
                        destructive: item.destructive,
                    })
                    .collect(),
            })
            .collect();

        let selects = config
            .filters
            .iter()
            .map(|filter| {
                let current = page
                    .facets
                    .iter()
                    .find(|f| f.key == filter.key)
                    .map(|f| f.value.as_str());
                SelectView {
                    key: filter.key.clone(),
                    label: filter.label.clone(),
                    options: filter
                        .options
                        .iter()
                        .map(|o| OptionView {
                            value: o.value.clone(),
                            label: o.label.clone(),
                            selected: current.is_some_and(|c| c.eq_ignore_ascii_case(&o.value)),
                        })
                        .collect(),
                }
            })
            .collect();

        let filter_by_options = page
            .filter_columns
            .iter()
            .map(|(key, label)| OptionView {
                value: (*key).to_string(),
                label: (*label).to_string(),
                selected: *key == page.filter_by,
            })
            .collect();

        let extra_columns = if config.selectable { 2 } else { 1 };

        Self {
            return_to: query.href(&path),
            headers,
            rows,
            is_empty: page.state == crate::components::ViewState::Empty,
            no_results: page.no_results(),
            filter: query.filter.clone(),
            filter_by: page.filter_by.to_string(),
            filter_by_options,
            selects,
            sort_column: query.sort.as_ref().map(|s| s.column.clone()).unwrap_or_default(),
            sort_dir: query.sort.as_ref().map_or("", |s| s.direction.as_str()),
            clear_sort_href: query.sort.as_ref().map(|_| query.without_sort().href(&path)),
            create: config.create.as_ref().map(|(href, label)| LinkView {
                href: href.clone(),
                label: label.clone(),
            }),
            export: (page.table == Table::Policies).then(|| LinkView {
                href: query.with_page(1).href("/policies/export"),
                label: "Export JSON".to_string(),
            }),
            page: page.page,
            page_count: page.page_count,
            total_matches: page.total_matches,
            total_scope: page.total_scope,
            prev_href: (page.page > 1).then(|| query.with_page(page.page - 1).href(&path)),
            next_href: (page.page < page.page_count)
                .then(|| query.with_page(page.page + 1).href(&path)),
            all_selected: !page.rows.is_empty() && selection.covers(page.page_ids()),
            selected_count: selection.len(),
            confirm,
            colspan: page.headers.len() + extra_columns,
            path,
        }
    }
}

/// Browser page template.
#[derive(Template)]
#[template(path = "browser.html")]
pub struct BrowserTemplate {
    pub layout: Layout,
    pub config: DataTableConfig,
    pub view: TableView,
    pub no_results_text: &'static str,
}

// =============================================================================
// Handlers
// =============================================================================

/// List page for one table.
#[instrument(skip(admin, state, session, params), fields(table = %table))]
pub async fn index(
    Extension(table): Extension<Table>,
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Html<String>, AppError> {
    let query = BrowserQuery::from_params(&params);
    let page = browse_table(state.store(), table, &query, state.config().page_size).await?;

    // Rendering a table makes its selection the current one; ids of records
    // that no longer exist are dropped.
    let mut current = selection::load(&session, table).await?;
    current.retain(|id| page.scope_ids.iter().any(|s| s == id));
    selection::save(&session, &current).await?;

    let confirm = session
        .remove::<PendingConfirmation>(keys::PENDING_CONFIRMATION)
        .await?
        .filter(|p| p.table == table.slug());

    let config = table.config();
    let view = TableView::build(&page, &config, &current, confirm);
    let template = BrowserTemplate {
        layout: Layout::load(&admin, &session, &table.path()).await?,
        config,
        view,
        no_results_text: crate::components::browser::NO_RESULTS,
    };

    Ok(render(&template))
}

/// Selection form body.
#[derive(Debug, Deserialize)]
pub struct SelectionForm {
    /// `toggle`, `toggle_all` or `clear`.
    pub op: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub return_to: String,
}

impl SelectionForm {
    fn selects_page(&self) -> bool {
        self.op == "toggle_all"
    }

    /// `page_ids` are the rows of the page being toggled, as rebuilt by the
    /// server.
    fn change(&self, page_ids: Vec<String>) -> Result<SelectionChange, AppError> {
        match self.op.as_str() {
            "toggle" if !self.id.is_empty() => Ok(SelectionChange::Toggle(self.id.clone())),
            "toggle_all" => Ok(SelectionChange::ToggleAll(page_ids)),
            "clear" => Ok(SelectionChange::Clear),
            other => Err(AppError::BadRequest(format!("invalid selection change: {other}"))),
        }
    }
}

/// Ids of the rows shown at `path`, a list page of `table`.
async fn rendered_page_ids(
    state: &AppState,
    table: Table,
    path: &str,
) -> Result<Vec<String>, AppError> {
    let query = path
        .split_once('?')
        .map_or_else(BrowserQuery::default, |(_, query)| BrowserQuery::parse(query));
    let page = browse_table(state.store(), table, &query, state.config().page_size).await?;
    Ok(page.page_ids().map(ToString::to_string).collect())
}

/// Toggle a row or the page, or clear the selection.
///
/// "Select all" covers the page the operator came from, rebuilt from
/// `return_to`.
#[instrument(skip(_admin, state, session, form), fields(table = %table, op = %form.op))]
pub async fn update_selection(
    Extension(table): Extension<Table>,
    RequireAdminAuth(_admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SelectionForm>,
) -> Result<Redirect, AppError> {
    if !table.config().selectable {
        return Err(AppError::BadRequest(format!("{table} rows cannot be selected")));
    }
    let back = return_path(table, &form.return_to);
    let page_ids = if form.selects_page() {
        rendered_page_ids(&state, table, &back).await?
    } else {
        Vec::new()
    };
    selection::apply(&session, table, form.change(page_ids)?).await?;
    Ok(Redirect::to(&back))
}

/// Row action form body.
#[derive(Debug, Deserialize)]
pub struct ActionForm {
    pub action: String,
    /// Present when the operator confirmed a destructive action.
    #[serde(default)]
    pub confirmed: Option<String>,
    #[serde(default)]
    pub return_to: String,
}

/// Dispatch a row action and redirect back to the list.
#[instrument(skip(admin, state, session, form), fields(table = %table, action = %form.action, admin = %admin.uid))]
pub async fn run_action(
    Extension(table): Extension<Table>,
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
    Form(form): Form<ActionForm>,
) -> Result<Response, AppError> {
    let action: RowAction = form.action.parse()?;
    let confirmed = form
        .confirmed
        .as_deref()
        .is_some_and(|v| matches!(v, "true" | "on" | "1"));

    let outcome = dispatch(state.store(), table, &id, action, confirmed).await?;
    if let Some(toast) = outcome.toast() {
        notifications::flash(&session, toast.clone()).await?;
    }

    let back = return_path(table, &form.return_to);
    let response = match outcome {
        ActionOutcome::ConfirmationRequired(pending) => {
            session.insert(keys::PENDING_CONFIRMATION, &pending).await?;
            Redirect::to(&back)
        }
        ActionOutcome::Navigate { url, .. } => Redirect::to(&url),
        _ => Redirect::to(&back),
    };
    Ok(response.into_response())
}

/// Where to send the operator after a form post: the submitted page if it
/// belongs to `table`, the table's first page otherwise.
fn return_path(table: Table, return_to: &str) -> String {
    let path = table.path();
    match return_to.strip_prefix(path.as_str()) {
        Some(rest) if rest.is_empty() || rest.starts_with('?') => return_to.to_string(),
        _ => path,
    }
}
