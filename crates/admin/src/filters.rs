//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Avatar fallback: the uppercased first character of a name.
///
/// Usage in templates: `{{ name|initial }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn initial(name: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(initial_of(&name.to_string()))
}

fn initial_of(name: &str) -> String {
    name.trim()
        .chars()
        .next()
        .map_or_else(|| "?".to_string(), |c| c.to_uppercase().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_of() {
        assert_eq!(initial_of("siti nurhaliza"), "S");
        assert_eq!(initial_of("  ali"), "A");
        assert_eq!(initial_of(""), "?");
    }
}
