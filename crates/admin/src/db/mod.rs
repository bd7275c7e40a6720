//! In-memory record store.
//!
//! Each entity type lives in its own ordered collection behind the
//! [`Repository`] trait. Collection order is insertion order, which is the
//! "original order" tables fall back to when no sort is applied.
//!
//! The store is seeded from [`fixtures`] at start-up and discarded on restart.

pub mod fixtures;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::models::{Policy, Report, User, Vehicle};

pub use fixtures::{FixtureError, FixtureIssue, Fixtures, validate_fixtures};

/// Errors that can occur during repository operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// Requested record was not found.
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    /// A record with the same identifier already exists.
    #[error("{kind} {id} already exists")]
    Conflict { kind: &'static str, id: String },
}

impl RepositoryError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn conflict(kind: &'static str, id: impl Into<String>) -> Self {
        Self::Conflict {
            kind,
            id: id.into(),
        }
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// A record that can be kept in a [`Repository`].
pub trait Record: Clone + Send + Sync + 'static {
    /// Human-readable record kind used in errors and logs.
    const KIND: &'static str;

    /// Unique identifier within the collection.
    fn id(&self) -> &str;
}

impl Record for User {
    const KIND: &'static str = "User";

    fn id(&self) -> &str {
        self.uid.as_str()
    }
}

impl Record for Vehicle {
    const KIND: &'static str = "Vehicle";

    fn id(&self) -> &str {
        self.id.as_str()
    }
}

impl Record for Policy {
    const KIND: &'static str = "Policy";

    fn id(&self) -> &str {
        self.id.as_str()
    }
}

impl Record for Report {
    const KIND: &'static str = "Report";

    fn id(&self) -> &str {
        self.id.as_str()
    }
}

/// Result of an upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upserted {
    Inserted,
    Updated,
}

/// Storage operations for one entity type.
#[async_trait]
pub trait Repository<R: Record>: Send + Sync {
    /// Fetch a record by identifier.
    async fn get(&self, id: &str) -> RepositoryResult<Option<R>>;

    /// Snapshot every record in collection order.
    async fn list(&self) -> RepositoryResult<Vec<R>>;

    /// Append a new record, failing if the identifier is taken.
    async fn insert(&self, record: R) -> RepositoryResult<R>;

    /// Replace the record with the same identifier in place, or append it.
    async fn upsert(&self, record: R) -> RepositoryResult<Upserted>;

    /// Apply `change` to a record under the write lock and return the result.
    async fn update<F>(&self, id: &str, change: F) -> RepositoryResult<R>
    where
        F: FnOnce(&mut R) + Send;

    /// Remove a record and return it.
    async fn delete(&self, id: &str) -> RepositoryResult<R>;
}

/// Ordered in-memory collection.
#[derive(Debug)]
pub struct MemoryRepository<R> {
    records: RwLock<Vec<R>>,
}

impl<R> Default for MemoryRepository<R> {
    fn default() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }
}

impl<R: Record> MemoryRepository<R> {
    #[must_use]
    pub fn new(records: Vec<R>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }

    /// Number of records currently stored.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Whether a record with `id` exists.
    pub async fn contains(&self, id: &str) -> bool {
        self.records.read().await.iter().any(|r| r.id() == id)
    }
}

#[async_trait]
impl<R: Record> Repository<R> for MemoryRepository<R> {
    async fn get(&self, id: &str) -> RepositoryResult<Option<R>> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.id() == id).cloned())
    }

    async fn list(&self) -> RepositoryResult<Vec<R>> {
        Ok(self.records.read().await.clone())
    }

    async fn insert(&self, record: R) -> RepositoryResult<R> {
        let mut records = self.records.write().await;
        if records.iter().any(|r| r.id() == record.id()) {
            return Err(RepositoryError::conflict(R::KIND, record.id()));
        }
        records.push(record.clone());
        tracing::debug!(kind = R::KIND, id = record.id(), "Record inserted");
        Ok(record)
    }

    async fn upsert(&self, record: R) -> RepositoryResult<Upserted> {
        let mut records = self.records.write().await;
        if let Some(existing) = records.iter_mut().find(|r| r.id() == record.id()) {
            *existing = record;
            Ok(Upserted::Updated)
        } else {
            records.push(record);
            Ok(Upserted::Inserted)
        }
    }

    async fn update<F>(&self, id: &str, change: F) -> RepositoryResult<R>
    where
        F: FnOnce(&mut R) + Send,
    {
        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| RepositoryError::not_found(R::KIND, id))?;
        change(record);
        Ok(record.clone())
    }

    async fn delete(&self, id: &str) -> RepositoryResult<R> {
        let mut records = self.records.write().await;
        let index = records
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| RepositoryError::not_found(R::KIND, id))?;
        let removed = records.remove(index);
        tracing::debug!(kind = R::KIND, id, "Record deleted");
        Ok(removed)
    }
}

/// Every collection the portal works with.
#[derive(Debug, Default)]
pub struct Store {
    pub users: MemoryRepository<User>,
    pub vehicles: MemoryRepository<Vehicle>,
    pub policies: MemoryRepository<Policy>,
    pub reports: MemoryRepository<Report>,
}

impl Store {
    /// Seed a store from a fixture set.
    #[must_use]
    pub fn from_fixtures(fixtures: Fixtures) -> Self {
        Self {
            users: MemoryRepository::new(fixtures.users),
            vehicles: MemoryRepository::new(fixtures.vehicles),
            policies: MemoryRepository::new(fixtures.policies),
            reports: MemoryRepository::new(fixtures.reports),
        }
    }

    /// Snapshot the whole store as a fixture set.
    ///
    /// # Errors
    ///
    /// Propagates repository failures.
    pub async fn snapshot(&self) -> RepositoryResult<Fixtures> {
        Ok(Fixtures {
            users: self.users.list().await?,
            vehicles: self.vehicles.list().await?,
            policies: self.policies.list().await?,
            reports: self.reports.list().await?,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn store() -> Store {
        Store::from_fixtures(Fixtures::builtin().unwrap())
    }

    #[tokio::test]
    async fn test_list_keeps_insertion_order() {
        let store = store();
        let ids: Vec<String> = store
            .policies
            .list()
            .await
            .unwrap()
            .iter()
            .map(|p| p.id.to_string())
            .collect();
        assert_eq!(ids, ["POL001", "POL002", "POL003", "POL004", "POL005"]);
    }

    #[tokio::test]
    async fn test_delete_removes_exactly_one() {
        let store = store();
        let before = store.policies.len().await;
        let removed = store.policies.delete("POL003").await.unwrap();
        assert_eq!(removed.id.as_str(), "POL003");
        assert_eq!(store.policies.len().await, before - 1);
        assert!(!store.policies.contains("POL003").await);
        assert!(store.policies.contains("POL002").await);
        assert!(store.policies.contains("POL004").await);
    }

    #[tokio::test]
    async fn test_delete_unknown_is_not_found() {
        let store = store();
        let before = store.policies.len().await;
        let err = store.policies.delete("POL999").await.unwrap_err();
        assert_eq!(err, RepositoryError::not_found("Policy", "POL999"));
        assert_eq!(store.policies.len().await, before);
    }

    #[tokio::test]
    async fn test_upsert_replaces_in_place() {
        let store = store();
        let mut vehicle = store.vehicles.get("VEH002").await.unwrap().unwrap();
        vehicle.plate_number = "JJJ 999".to_string();
        assert_eq!(store.vehicles.upsert(vehicle).await.unwrap(), Upserted::Updated);

        let vehicles = store.vehicles.list().await.unwrap();
        assert_eq!(vehicles[1].plate_number, "JJJ 999");
    }

    #[tokio::test]
    async fn test_insert_conflict() {
        let store = store();
        let user = store.users.get("CUST001").await.unwrap().unwrap();
        let err = store.users.insert(user).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_default_store_is_empty() {
        let store = Store::default();
        assert!(store.users.is_empty().await);
        assert!(store.policies.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_unknown_is_not_found() {
        let store = store();
        let err = store
            .vehicles
            .update("VEH404", |v| v.archived = true)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound { .. }));
    }
}
