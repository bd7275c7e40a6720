//! Flashed toast notifications.
//!
//! Handlers that redirect after a POST push a [`Toast`] into the session; the
//! next rendered page takes every pending toast and shows it once.

use tower_sessions::Session;

use crate::models::{Toast, session::keys};

/// Queue `toast` for the next rendered page.
///
/// # Errors
///
/// Returns an error if the session cannot be read or written.
pub async fn flash(session: &Session, toast: Toast) -> Result<(), tower_sessions::session::Error> {
    let mut pending: Vec<Toast> = session.get(keys::TOASTS).await?.unwrap_or_default();
    tracing::debug!(title = %toast.title, destructive = toast.is_destructive(), "Toast queued");
    pending.push(toast);
    session.insert(keys::TOASTS, pending).await
}

/// Remove and return every queued toast, oldest first.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn take(session: &Session) -> Result<Vec<Toast>, tower_sessions::session::Error> {
    Ok(session
        .remove::<Vec<Toast>>(keys::TOASTS)
        .await?
        .unwrap_or_default())
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

    #[tokio::test]
    async fn test_toasts_are_shown_once_in_order() {
        let session = session();
        flash(&session, Toast::new("First", "one")).await.unwrap();
        flash(&session, Toast::destructive("Second", "two")).await.unwrap();

        let toasts = take(&session).await.unwrap();
        assert_eq!(toasts.len(), 2);
        assert_eq!(toasts[0].title, "First");
        assert!(toasts[1].is_destructive());

        assert!(take(&session).await.unwrap().is_empty());
    }
}
