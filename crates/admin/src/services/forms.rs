//! Per-field form errors.
//!
//! Forms are checked with `validator` first; checks the derive cannot express
//! (parsing, cross-field rules, lookups in the store) add to the same
//! [`FormErrors`] so a rejected form re-renders with every message at once.

use std::collections::BTreeMap;

use validator::ValidationErrors;

/// Error messages keyed by form field name. Only the first message per field
/// is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(BTreeMap<String, String>);

impl FormErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `message` for `field` unless it already has one.
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Message for `field`, or an empty string (for templates).
    #[must_use]
    pub fn message(&self, field: &str) -> &str {
        self.get(field).unwrap_or_default()
    }

    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `Ok(value)` when no errors were recorded.
    ///
    /// # Errors
    ///
    /// Returns `self` if any field failed.
    pub fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl From<ValidationErrors> for FormErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut form = Self::new();
        form.merge(&errors);
        form
    }
}

impl FormErrors {
    /// Add the messages from a `validator` run.
    pub fn merge(&mut self, errors: &ValidationErrors) {
        for (field, failures) in errors.field_errors() {
            if let Some(failure) = failures.first() {
                let message = failure
                    .message
                    .as_ref()
                    .map_or_else(|| failure.code.to_string(), ToString::to_string);
                self.add(&field.to_string(), message);
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use validator::Validate;

    use super::*;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 2, message = "Too short."))]
        name: String,
        #[validate(email(message = "Invalid email."))]
        email: String,
    }

    #[test]
    fn test_validator_messages_are_kept_per_field() {
        let sample = Sample {
            name: "a".to_string(),
            email: "nope".to_string(),
        };
        let errors = FormErrors::from(sample.validate().unwrap_err());
        assert_eq!(errors.get("name"), Some("Too short."));
        assert_eq!(errors.get("email"), Some("Invalid email."));
        assert_eq!(errors.message("role"), "");
    }

    #[test]
    fn test_first_message_wins() {
        let mut errors = FormErrors::new();
        errors.add("end_date", "first");
        errors.add("end_date", "second");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("end_date"), Some("first"));
        assert!(errors.into_result(()).is_err());
        assert!(FormErrors::new().into_result(1).is_ok());
    }
}
