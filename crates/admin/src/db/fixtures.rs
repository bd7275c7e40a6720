//! Fixture sets: the records a store is seeded with.
//!
//! The built-in sample set is embedded from `fixtures/sample.yaml`. Operators
//! can point `ADMIN_FIXTURES_PATH` at their own file with the same layout.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Policy, Report, User, Vehicle};

const SAMPLE_YAML: &str = include_str!("../../fixtures/sample.yaml");

/// Errors that can occur while loading or writing fixtures.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid fixture YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// A problem found by [`validate_fixtures`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixtureIssue {
    DuplicateId {
        kind: &'static str,
        id: String,
    },
    DanglingReference {
        kind: &'static str,
        id: String,
        field: &'static str,
        target: String,
    },
    EndBeforeStart {
        id: String,
    },
}

impl fmt::Display for FixtureIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateId { kind, id } => write!(f, "duplicate {kind} id {id}"),
            Self::DanglingReference {
                kind,
                id,
                field,
                target,
            } => write!(f, "{kind} {id}: {field} refers to unknown record {target}"),
            Self::EndBeforeStart { id } => write!(f, "Policy {id}: end_date is before start_date"),
        }
    }
}

/// Every record collection, in store order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixtures {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub vehicles: Vec<Vehicle>,
    #[serde(default)]
    pub policies: Vec<Policy>,
    #[serde(default)]
    pub reports: Vec<Report>,
}

impl Fixtures {
    /// The built-in sample data.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::Yaml`] if the embedded file does not parse.
    pub fn builtin() -> Result<Self, FixtureError> {
        Self::from_yaml(SAMPLE_YAML)
    }

    /// Parse a fixture set from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::Yaml`] on malformed input, including values that
    /// fail type validation (bad emails, negative amounts, unknown enums).
    pub fn from_yaml(text: &str) -> Result<Self, FixtureError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Read a fixture file.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::Io`] if the file cannot be read and
    /// [`FixtureError::Yaml`] if it does not parse.
    pub fn load(path: &Path) -> Result<Self, FixtureError> {
        let text = std::fs::read_to_string(path).map_err(|source| FixtureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&text)
    }

    /// Serialize to YAML.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::Yaml`] if serialization fails.
    pub fn to_yaml(&self) -> Result<String, FixtureError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Check a fixture set for duplicate identifiers and broken references.
///
/// Returns an empty list when the set is consistent.
#[must_use]
pub fn validate_fixtures(fixtures: &Fixtures) -> Vec<FixtureIssue> {
    let mut issues = Vec::new();

    let user_ids = unique_ids(
        "User",
        fixtures.users.iter().map(|u| u.uid.as_str()),
        &mut issues,
    );
    let vehicle_ids = unique_ids(
        "Vehicle",
        fixtures.vehicles.iter().map(|v| v.id.as_str()),
        &mut issues,
    );
    unique_ids(
        "Policy",
        fixtures.policies.iter().map(|p| p.id.as_str()),
        &mut issues,
    );
    unique_ids(
        "Report",
        fixtures.reports.iter().map(|r| r.id.as_str()),
        &mut issues,
    );

    let mut check = |kind, id: &str, field, target: &str, known: &HashSet<&str>| {
        if !known.contains(target) {
            issues.push(FixtureIssue::DanglingReference {
                kind,
                id: id.to_string(),
                field,
                target: target.to_string(),
            });
        }
    };

    for user in &fixtures.users {
        if let Some(owner) = &user.linked_owner {
            check("User", user.uid.as_str(), "linked_owner", owner.as_str(), &user_ids);
        }
    }
    for vehicle in &fixtures.vehicles {
        check(
            "Vehicle",
            vehicle.id.as_str(),
            "owner_uid",
            vehicle.owner_uid.as_str(),
            &user_ids,
        );
    }
    for policy in &fixtures.policies {
        check(
            "Policy",
            policy.id.as_str(),
            "owner_uid",
            policy.owner_uid.as_str(),
            &user_ids,
        );
        check(
            "Policy",
            policy.id.as_str(),
            "vehicle_id",
            policy.vehicle_id.as_str(),
            &vehicle_ids,
        );
    }

    for policy in &fixtures.policies {
        if policy.end_date < policy.start_date {
            issues.push(FixtureIssue::EndBeforeStart {
                id: policy.id.to_string(),
            });
        }
    }

    issues
}

fn unique_ids<'a>(
    kind: &'static str,
    ids: impl Iterator<Item = &'a str>,
    issues: &mut Vec<FixtureIssue>,
) -> HashSet<&'a str> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            issues.push(FixtureIssue::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
    }
    seen
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use mahardika_core::{PolicyStatus, Role, UserUid, VehicleId};

    use super::*;

    #[test]
    fn test_builtin_parses() {
        let fixtures = Fixtures::builtin().unwrap();
        assert_eq!(fixtures.users.len(), 8);
        assert_eq!(fixtures.vehicles.len(), 6);
        assert_eq!(fixtures.policies.len(), 5);
        assert_eq!(fixtures.reports.len(), 3);

        let admin = fixtures.users.iter().find(|u| u.uid.as_str() == "ADMIN001").unwrap();
        assert_eq!(admin.role, Role::Admin);
        assert!(admin.is_super_admin());

        let pol3 = fixtures.policies.iter().find(|p| p.id.as_str() == "POL003").unwrap();
        assert_eq!(pol3.status, PolicyStatus::PendingRenewal);
        assert_eq!(pol3.total_price.to_string(), "RM 1,500.00");
        assert!(fixtures.policies.iter().find(|p| p.id.as_str() == "POL004").unwrap().pdf_url.is_none());
    }

    #[test]
    fn test_builtin_is_consistent() {
        let fixtures = Fixtures::builtin().unwrap();
        assert_eq!(validate_fixtures(&fixtures), Vec::new());
    }

    #[test]
    fn test_yaml_round_trip_preserves_records() {
        let fixtures = Fixtures::builtin().unwrap();
        let text = fixtures.to_yaml().unwrap();
        assert_eq!(Fixtures::from_yaml(&text).unwrap(), fixtures);
    }

    #[test]
    fn test_validate_reports_duplicates_and_dangling_references() {
        let mut fixtures = Fixtures::builtin().unwrap();
        let dup = fixtures.vehicles[0].clone();
        fixtures.vehicles.push(dup);
        fixtures.policies[0].vehicle_id = VehicleId::new("VEH999");
        fixtures.vehicles[1].owner_uid = UserUid::new("CUST999");

        let issues = validate_fixtures(&fixtures);
        assert!(issues.contains(&FixtureIssue::DuplicateId {
            kind: "Vehicle",
            id: "VEH001".to_string(),
        }));
        assert!(issues.contains(&FixtureIssue::DanglingReference {
            kind: "Policy",
            id: "POL001".to_string(),
            field: "vehicle_id",
            target: "VEH999".to_string(),
        }));
        assert!(issues.contains(&FixtureIssue::DanglingReference {
            kind: "Vehicle",
            id: "VEH002".to_string(),
            field: "owner_uid",
            target: "CUST999".to_string(),
        }));
        assert_eq!(issues.len(), 3);
    }

    #[test]
    fn test_validate_reports_inverted_dates() {
        let mut fixtures = Fixtures::builtin().unwrap();
        fixtures.policies[1].end_date = fixtures.policies[1].start_date.pred_opt().unwrap();
        assert_eq!(
            validate_fixtures(&fixtures),
            vec![FixtureIssue::EndBeforeStart {
                id: "POL002".to_string()
            }]
        );
    }

    #[test]
    fn test_rejects_invalid_values() {
        let yaml = "users:\n  - uid: X1\n    role: owner\n    loyalty_tier: Gold\n    points: 1\n";
        assert!(matches!(Fixtures::from_yaml(yaml), Err(FixtureError::Yaml(_))));

        let yaml = "reports:\n  - id: R1\n    month: \"2024-13\"\n    generated_date: \"2024-01-01\"\n    pdf_url: https://example.com/a.pdf\n    total_sales: \"1\"\n";
        assert!(Fixtures::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_empty_yaml_sections_default() {
        let fixtures = Fixtures::from_yaml("users: []\n").unwrap();
        assert!(fixtures.vehicles.is_empty());
    }
}
