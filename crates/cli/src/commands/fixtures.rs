//! Fixture file commands.
//!
//! # Usage
//!
//! ```bash
//! np fixtures export --output fixtures.yaml
//! np fixtures check fixtures.yaml
//! ```
//!
//! The admin portal loads a fixture file when `ADMIN_FIXTURES_PATH` is set.

use std::io::Write;
use std::path::Path;

use mahardika_admin::db::{FixtureError, Fixtures, validate_fixtures};
use thiserror::Error;

/// Errors that can occur during fixture commands.
#[derive(Debug, Error)]
pub enum FixturesError {
    /// Fixture file could not be read or parsed.
    #[error(transparent)]
    Fixture(#[from] FixtureError),

    /// Output could not be written.
    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),

    /// The file parsed but has integrity problems.
    #[error("{0} problem(s) found")]
    Invalid(usize),
}

/// Write the built-in sample data as YAML to `output`, or stdout.
///
/// # Errors
///
/// Returns an error if the YAML cannot be produced or written.
pub fn export(output: Option<&Path>) -> Result<(), FixturesError> {
    let yaml = Fixtures::builtin()?.to_yaml()?;

    match output {
        Some(path) => {
            std::fs::write(path, yaml)?;
            tracing::info!(path = %path.display(), "Sample fixtures written");
        }
        None => std::io::stdout().lock().write_all(yaml.as_bytes())?,
    }
    Ok(())
}

/// Validate the fixture file at `file`.
///
/// Every problem is logged; the command fails if there was at least one.
///
/// # Errors
///
/// Returns an error if the file cannot be loaded or has integrity problems.
pub fn check(file: &Path) -> Result<(), FixturesError> {
    let fixtures = Fixtures::load(file)?;
    let issues = validate_fixtures(&fixtures);

    for issue in &issues {
        tracing::warn!(%issue, "Fixture problem");
    }
    if !issues.is_empty() {
        return Err(FixturesError::Invalid(issues.len()));
    }

    tracing::info!(
        users = fixtures.users.len(),
        vehicles = fixtures.vehicles.len(),
        policies = fixtures.policies.len(),
        reports = fixtures.reports.len(),
        "Fixture file is valid"
    );
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_exported_sample_passes_check() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.yaml");

        export(Some(&path)).unwrap();
        check(&path).unwrap();
    }

    #[test]
    fn test_dangling_reference_fails_check() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.yaml");

        let mut fixtures = Fixtures::builtin().unwrap();
        fixtures.vehicles.clear();
        std::fs::write(&path, fixtures.to_yaml().unwrap()).unwrap();

        let err = check(&path).unwrap_err();
        assert!(matches!(err, FixturesError::Invalid(n) if n > 0));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = check(Path::new("/definitely/not/here.yaml")).unwrap_err();
        assert!(matches!(err, FixturesError::Fixture(_)));
    }
}
