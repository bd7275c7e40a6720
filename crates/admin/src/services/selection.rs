//! Session-held row selection.
//!
//! The session keeps one [`Selection`]. Loading it for a different table than
//! the one it belongs to starts a fresh, empty selection, so rendering another
//! table clears the previous one.

use tower_sessions::Session;

use crate::components::{Selection, Table};
use crate::models::session::keys;

/// A posted selection change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionChange {
    /// Flip a single row.
    Toggle(String),
    /// Header checkbox over the ids shown on the current page.
    ToggleAll(Vec<String>),
    /// Drop everything.
    Clear,
}

/// Selection for `table`, empty if the session holds another table's.
///
/// # Errors
///
/// Returns an error if the session cannot be read.
pub async fn load(session: &Session, table: Table) -> Result<Selection, tower_sessions::session::Error> {
    let stored: Option<Selection> = session.get(keys::SELECTION).await?;
    Ok(stored
        .filter(|s| s.table == table.slug())
        .unwrap_or_else(|| Selection::for_table(table.slug())))
}

/// Persist `selection` as the session's only selection.
///
/// # Errors
///
/// Returns an error if the session cannot be written.
pub async fn save(session: &Session, selection: &Selection) -> Result<(), tower_sessions::session::Error> {
    session.insert(keys::SELECTION, selection).await
}

/// Apply `change` to the selection of `table` and store it.
///
/// # Errors
///
/// Returns an error if the session cannot be read or written.
pub async fn apply(
    session: &Session,
    table: Table,
    change: SelectionChange,
) -> Result<Selection, tower_sessions::session::Error> {
    let mut selection = load(session, table).await?;
    match change {
        SelectionChange::Toggle(id) => selection.toggle(&id),
        SelectionChange::ToggleAll(ids) => selection.toggle_all(ids.iter().map(String::as_str)),
        SelectionChange::Clear => selection.clear(),
    }
    save(session, &selection).await?;
    tracing::debug!(%table, selected = selection.len(), "Selection updated");
    Ok(selection)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use tower_sessions::MemoryStore;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn page(ids: &[&str]) -> SelectionChange {
        SelectionChange::ToggleAll(ids.iter().map(ToString::to_string).collect())
    }

    #[tokio::test]
    async fn test_select_all_twice_returns_to_empty() {
        let session = session();
        let selected = apply(&session, Table::Policies, page(&["POL001", "POL002"]))
            .await
            .unwrap();
        assert_eq!(selected.len(), 2);

        // a different page after re-sorting still clears
        let cleared = apply(&session, Table::Policies, page(&["POL005", "POL004"]))
            .await
            .unwrap();
        assert!(cleared.is_empty());
    }

    #[tokio::test]
    async fn test_other_table_starts_empty() {
        let session = session();
        apply(&session, Table::Vehicles, SelectionChange::Toggle("VEH001".into()))
            .await
            .unwrap();

        assert!(load(&session, Table::Policies).await.unwrap().is_empty());
        assert!(load(&session, Table::Vehicles).await.unwrap().is_selected("VEH001"));
    }

    #[tokio::test]
    async fn test_clear_drops_everything() {
        let session = session();
        apply(&session, Table::Customers, SelectionChange::Toggle("CUST001".into()))
            .await
            .unwrap();
        let cleared = apply(&session, Table::Customers, SelectionChange::Clear)
            .await
            .unwrap();
        assert!(cleared.is_empty());
    }
}
