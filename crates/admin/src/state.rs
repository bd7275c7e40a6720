//! Application state shared across handlers.

use std::sync::Arc;

use thiserror::Error;

use crate::config::AdminConfig;
use crate::db::{FixtureError, Fixtures, Store, validate_fixtures};
use crate::services::documents::{DocumentError, DocumentFetcher};

/// Errors that can occur while building the application state.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to load fixtures: {0}")]
    Fixtures(#[from] FixtureError),

    #[error("failed to build document client: {0}")]
    Documents(#[from] DocumentError),
}

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    store: Store,
    documents: DocumentFetcher,
}

impl AppState {
    /// Build state around an already seeded store.
    ///
    /// # Errors
    ///
    /// Returns an error if the document HTTP client cannot be built.
    pub fn new(config: AdminConfig, store: Store) -> Result<Self, StateError> {
        let documents = DocumentFetcher::new(config.document_timeout)?;
        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                documents,
            }),
        })
    }

    /// Build state from configuration, seeding the store from the configured
    /// fixture file or the built-in sample set.
    ///
    /// Fixture problems are logged as warnings; the data is still loaded.
    ///
    /// # Errors
    ///
    /// Returns an error if the fixtures cannot be read or parsed.
    pub fn from_config(config: AdminConfig) -> Result<Self, StateError> {
        let fixtures = match &config.fixtures_path {
            Some(path) => {
                tracing::info!(path = %path.display(), "Loading fixtures from file");
                Fixtures::load(path)?
            }
            None => Fixtures::builtin()?,
        };

        for issue in validate_fixtures(&fixtures) {
            tracing::warn!(%issue, "Fixture problem");
        }
        tracing::info!(
            users = fixtures.users.len(),
            vehicles = fixtures.vehicles.len(),
            policies = fixtures.policies.len(),
            reports = fixtures.reports.len(),
            "Record store seeded"
        );

        Self::new(config, Store::from_fixtures(fixtures))
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn store(&self) -> &Store {
        &self.inner.store
    }

    #[must_use]
    pub fn documents(&self) -> &DocumentFetcher {
        &self.inner.documents
    }
}
