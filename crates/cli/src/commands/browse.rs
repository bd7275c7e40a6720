//! Print one page of a table.
//!
//! Runs the same browse the portal's list pages run, so filters, facets,
//! sorting and paging behave identically.
//!
//! # Usage
//!
//! ```bash
//! np browse admins --role admin --filter super
//! np browse vehicles --status all --sort make
//! ```

use std::collections::HashMap;
use std::io::Write;

use mahardika_admin::components::browser::{BrowserQuery, ViewState};
use mahardika_admin::components::tables::Table;
use mahardika_admin::db::{FixtureError, Fixtures, Store};
use mahardika_admin::error::AppError;
use mahardika_admin::services::{Browsed, browse_table};
use thiserror::Error;

use crate::BrowseArgs;

/// Errors that can occur while browsing.
#[derive(Debug, Error)]
pub enum BrowseError {
    #[error("{0}")]
    UnknownTable(String),

    #[error(transparent)]
    Fixture(#[from] FixtureError),

    #[error(transparent)]
    Browse(#[from] AppError),

    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

/// Run `np browse`.
///
/// # Errors
///
/// Returns an error for an unknown table or column, an unreadable fixture
/// file, or a failed write to stdout.
pub async fn run(args: &BrowseArgs) -> Result<(), BrowseError> {
    let table: Table = args.table.parse().map_err(BrowseError::UnknownTable)?;

    let fixtures = match &args.fixtures {
        Some(path) => Fixtures::load(path)?,
        None => Fixtures::builtin()?,
    };
    let store = Store::from_fixtures(fixtures);

    let page = browse_table(&store, table, &query_from_args(args), args.page_size).await?;

    let mut out = std::io::stdout().lock();
    out.write_all(render_page(&page).as_bytes())?;
    Ok(())
}

/// Translate CLI flags into the query a list page would receive.
fn query_from_args(args: &BrowseArgs) -> BrowserQuery {
    let mut params = HashMap::new();
    let mut set = |key: &str, value: Option<&String>| {
        if let Some(value) = value {
            params.insert(key.to_string(), value.clone());
        }
    };

    set("filter", args.filter.as_ref());
    set("filter_by", args.filter_by.as_ref());
    set("sort", args.sort.as_ref());
    set("role", args.role.as_ref());
    set("tier", args.tier.as_ref());
    set("status", args.status.as_ref());
    set("type", args.policy_type.as_ref());

    if args.desc {
        params.insert("dir".to_string(), "desc".to_string());
    }
    params.insert("page".to_string(), args.page.to_string());

    BrowserQuery::from_params(&params)
}

/// Render a page as an aligned plain-text table with a summary line.
fn render_page(page: &Browsed) -> String {
    let mut out = String::new();

    match page.state {
        ViewState::Empty => {
            out.push_str(&format!("{} has no records.\n", page.table));
            return out;
        }
        _ if page.no_results() => {
            out.push_str("No results.\n");
            return out;
        }
        _ => {}
    }

    let mut grid: Vec<Vec<&str>> = Vec::with_capacity(page.rows.len() + 1);
    grid.push(page.headers.iter().map(|h| h.label).collect());
    for row in &page.rows {
        grid.push(row.cells.iter().map(|(_, cell)| cell.as_text()).collect());
    }

    let widths: Vec<usize> = (0..page.headers.len())
        .map(|col| {
            grid.iter()
                .filter_map(|line| line.get(col))
                .map(|text| text.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    for line in &grid {
        let padded: Vec<String> = line
            .iter()
            .zip(&widths)
            .map(|(text, width)| format!("{text:<width$}"))
            .collect();
        out.push_str(padded.join("  ").trim_end());
        out.push('\n');
    }

    out.push_str(&format!(
        "\nPage {} of {} ({} matching, {} total)\n",
        page.page, page.page_count, page.total_matches, page.total_scope
    ));
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn args(table: &str) -> BrowseArgs {
        BrowseArgs {
            table: table.to_string(),
            fixtures: None,
            filter: None,
            filter_by: None,
            sort: None,
            desc: false,
            page: 1,
            page_size: 10,
            role: None,
            tier: None,
            status: None,
            policy_type: None,
        }
    }

    async fn browse(args: &BrowseArgs) -> Browsed {
        let store = Store::from_fixtures(Fixtures::builtin().unwrap());
        let table: Table = args.table.parse().unwrap();
        browse_table(&store, table, &query_from_args(args), args.page_size)
            .await
            .unwrap()
    }

    #[test]
    fn test_query_from_args() {
        let mut a = args("policies");
        a.sort = Some("end_date".to_string());
        a.desc = true;
        a.policy_type = Some("Comprehensive".to_string());
        a.page = 2;

        let query = query_from_args(&a);
        assert_eq!(query.sort.as_ref().unwrap().column, "end_date");
        assert_eq!(query.sort.as_ref().unwrap().direction.as_str(), "desc");
        assert_eq!(query.facet("type"), Some("Comprehensive"));
        assert_eq!(query.page, 2);
    }

    #[tokio::test]
    async fn test_admin_search_renders_one_row() {
        let mut a = args("admins");
        a.role = Some("admin".to_string());
        a.filter = Some("super".to_string());

        let page = browse(&a).await;
        let text = render_page(&page);

        assert_eq!(page.rows.len(), 1);
        assert!(text.contains("Page 1 of 1 (1 matching"));
    }

    #[tokio::test]
    async fn test_no_results_message() {
        let mut a = args("vehicles");
        a.filter = Some("zzz-nothing".to_string());

        let page = browse(&a).await;
        assert_eq!(render_page(&page), "No results.\n");
    }

    #[tokio::test]
    async fn test_unknown_table_is_rejected() {
        let err = run(&args("invoices")).await.unwrap_err();
        assert!(matches!(err, BrowseError::UnknownTable(_)));
    }
}
