//! Browsing a table of the store.
//!
//! Snapshots the records a [`Table`] lists, projects them into rows, runs the
//! [`Browser`] and keeps the result in a presentation-neutral [`Browsed`] page.
//! The HTML pages, the JSON API and the CLI all render from it.

use serde::Serialize;
use tracing::instrument;

use crate::components::browser::{
    Browser, BrowserQuery, Cell, FACET_ALL, TableDescriptor, ViewState,
};
use crate::components::tables::{
    Table, customer_columns, member_columns, policy_columns, report_columns, vehicle_columns,
};
use crate::db::{Record, Repository, Store};
use crate::error::AppError;
use crate::models::{Policy, PolicyRow, User, VehicleRow};

use super::actions::{self, MenuItem};

/// A column header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Header {
    pub key: &'static str,
    pub label: &'static str,
    pub sortable: bool,
}

/// One browsed row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrowsedRow {
    pub id: String,
    /// Cells in column order, keyed by column.
    pub cells: Vec<(&'static str, Cell)>,
    #[serde(skip)]
    pub menu: Vec<MenuItem>,
}

/// A facet select and the value currently in effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveFacet {
    pub key: &'static str,
    pub value: String,
}

/// One page of a table, ready to render.
#[derive(Debug, Clone, Serialize)]
pub struct Browsed {
    pub table: Table,
    pub headers: Vec<Header>,
    /// Columns the text filter can target, as `(key, label)`.
    pub filter_columns: Vec<(&'static str, &'static str)>,
    pub facets: Vec<ActiveFacet>,
    pub rows: Vec<BrowsedRow>,
    /// Every id in the table's scope, for pruning selections.
    #[serde(skip)]
    pub scope_ids: Vec<String>,
    pub state: ViewState,
    pub page: usize,
    pub page_count: usize,
    pub total_matches: usize,
    pub total_scope: usize,
    pub filter_by: &'static str,
    #[serde(skip)]
    pub query: BrowserQuery,
}

impl Browsed {
    /// Ids of the rows on this page, in display order.
    pub fn page_ids(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|r| r.id.as_str())
    }

    /// The scope has records but the filters matched none.
    #[must_use]
    pub fn no_results(&self) -> bool {
        self.state == ViewState::Loaded && self.rows.is_empty()
    }
}

fn browse_records<R>(
    table: Table,
    descriptor: &TableDescriptor<R>,
    scope: &[R],
    query: &BrowserQuery,
    page_size: usize,
    id_of: impl Fn(&R) -> &str,
    menu: impl Fn(&R) -> Vec<MenuItem>,
) -> Result<Browsed, AppError> {
    let page = Browser::new(descriptor, page_size).browse(scope, query)?;

    let rows = page
        .rows
        .iter()
        .map(|record| BrowsedRow {
            id: id_of(record).to_string(),
            cells: descriptor
                .columns
                .iter()
                .map(|c| (c.key, c.render(record)))
                .collect(),
            menu: menu(record),
        })
        .collect();

    Ok(Browsed {
        table,
        headers: descriptor
            .columns
            .iter()
            .map(|c| Header {
                key: c.key,
                label: c.label,
                sortable: c.is_sortable(),
            })
            .collect(),
        filter_columns: descriptor
            .filterable_columns()
            .map(|c| (c.key, c.label))
            .collect(),
        facets: descriptor
            .facets
            .iter()
            .map(|f| ActiveFacet {
                key: f.key,
                value: query
                    .facet(f.key)
                    .or(f.default)
                    .unwrap_or(FACET_ALL)
                    .to_string(),
            })
            .collect(),
        rows,
        scope_ids: scope.iter().map(|r| id_of(r).to_string()).collect(),
        state: page.state,
        page: page.page,
        page_count: page.page_count,
        total_matches: page.total_matches,
        total_scope: page.total_scope,
        filter_by: page.filter_by,
        query: page.query,
    })
}

/// Browse `table` with `query`.
///
/// # Errors
///
/// Returns [`AppError::Browser`] for a query naming a column the table cannot
/// sort or filter by, or a repository error.
#[instrument(skip(store, query), fields(query = %query.to_query_string()))]
pub async fn browse_table(
    store: &Store,
    table: Table,
    query: &BrowserQuery,
    page_size: usize,
) -> Result<Browsed, AppError> {
    match table {
        Table::Customers | Table::Staff | Table::Admins => {
            let users: Vec<User> = store
                .users
                .list()
                .await?
                .into_iter()
                .filter(|u| table.user_scope().is_none_or(|role| u.role == role))
                .collect();
            let descriptor = if table == Table::Customers {
                customer_columns()
            } else {
                member_columns()
            };
            browse_records(table, &descriptor, &users, query, page_size, Record::id, |u| {
                actions::user_menu(table, u)
            })
        }
        Table::Vehicles => {
            let users = store.users.list().await?;
            let rows = VehicleRow::project(store.vehicles.list().await?, &users);
            browse_records(
                table,
                &vehicle_columns(),
                &rows,
                query,
                page_size,
                |r| r.vehicle.id(),
                |r| actions::vehicle_menu(&r.vehicle),
            )
        }
        Table::Policies => {
            let rows = policy_rows(store).await?;
            browse_records(
                table,
                &policy_columns(),
                &rows,
                query,
                page_size,
                |r| r.policy.id(),
                |r| actions::policy_menu(&r.policy),
            )
        }
        Table::Reports => {
            let reports = store.reports.list().await?;
            browse_records(
                table,
                &report_columns(),
                &reports,
                query,
                page_size,
                Record::id,
                actions::report_menu,
            )
        }
    }
}

async fn policy_rows(store: &Store) -> Result<Vec<PolicyRow>, AppError> {
    let users = store.users.list().await?;
    let vehicles = store.vehicles.list().await?;
    Ok(PolicyRow::project(store.policies.list().await?, &users, &vehicles))
}

/// Every policy matching `query`'s filters and sort, ignoring pagination.
///
/// # Errors
///
/// See [`browse_table`].
pub async fn matching_policies(store: &Store, query: &BrowserQuery) -> Result<Vec<Policy>, AppError> {
    let rows = policy_rows(store).await?;
    let descriptor = policy_columns();
    let page = Browser::new(&descriptor, usize::MAX).browse(&rows, &query.with_page(1))?;
    Ok(page.rows.into_iter().map(|r| r.policy.clone()).collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::Fixtures;
    use crate::services::actions::RowAction;

    fn store() -> Store {
        Store::from_fixtures(Fixtures::builtin().unwrap())
    }

    #[tokio::test]
    async fn test_admin_table_filtered_to_super_admin() {
        let store = store();
        let query = BrowserQuery::parse("role=admin&filter=super");
        let page = browse_table(&store, Table::Admins, &query, 10).await.unwrap();

        assert_eq!(page.page_ids().collect::<Vec<_>>(), ["ADMIN001"]);
        let change_role = page.rows[0]
            .menu
            .iter()
            .find(|m| m.action == RowAction::ChangeRole)
            .unwrap();
        assert!(!change_role.enabled);
    }

    #[tokio::test]
    async fn test_vehicles_hide_archived_by_default() {
        let store = store();
        let default = browse_table(&store, Table::Vehicles, &BrowserQuery::default(), 10)
            .await
            .unwrap();
        assert!(!default.page_ids().any(|id| id == "VEH003"));
        assert_eq!(default.facets[0].value, "active");

        let all = browse_table(&store, Table::Vehicles, &BrowserQuery::parse("status=all"), 10)
            .await
            .unwrap();
        assert!(all.page_ids().any(|id| id == "VEH003"));
        assert_eq!(all.total_matches, all.total_scope);
    }

    #[tokio::test]
    async fn test_unmatched_filter_is_loaded_with_no_results() {
        let store = store();
        let query = BrowserQuery::parse("filter=zzz");
        let page = browse_table(&store, Table::Policies, &query, 10).await.unwrap();
        assert_eq!(page.state, ViewState::Loaded);
        assert!(page.no_results());
    }

    #[tokio::test]
    async fn test_empty_scope_is_empty_state() {
        let store = Store::default();
        let page = browse_table(&store, Table::Reports, &BrowserQuery::default(), 10)
            .await
            .unwrap();
        assert_eq!(page.state, ViewState::Empty);
        assert!(!page.no_results());
    }

    #[tokio::test]
    async fn test_unsortable_column_is_rejected() {
        let store = store();
        let err = browse_table(&store, Table::Vehicles, &BrowserQuery::parse("sort=make"), 10)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Browser(_)));
    }

    #[tokio::test]
    async fn test_matching_policies_ignores_pagination() {
        let store = store();
        let all = matching_policies(&store, &BrowserQuery::parse("page=3")).await.unwrap();
        assert_eq!(all.len(), store.policies.len().await);

        let expired = matching_policies(&store, &BrowserQuery::parse("status=expired"))
            .await
            .unwrap();
        assert!(expired.iter().all(|p| p.status == mahardika_core::PolicyStatus::Expired));
    }
}
