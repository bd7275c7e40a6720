//! Links to stored policy and report PDFs.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;

/// Errors that can occur when parsing a [`DocumentUrl`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentUrlError {
    #[error("invalid document url: {0}")]
    Parse(#[from] url::ParseError),
    #[error("document url must use http or https, got '{0}'")]
    Scheme(String),
}

/// An absolute `http`/`https` URL pointing at a document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DocumentUrl(Url);

impl DocumentUrl {
    /// Parse and validate a document URL.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentUrlError`] if the input is not an absolute URL or
    /// uses a scheme other than `http`/`https`.
    pub fn parse(input: &str) -> Result<Self, DocumentUrlError> {
        let url = Url::parse(input.trim())?;
        match url.scheme() {
            "http" | "https" => Ok(Self(url)),
            other => Err(DocumentUrlError::Scheme(other.to_owned())),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    #[must_use]
    pub const fn as_url(&self) -> &Url {
        &self.0
    }

    /// Last path segment, if any (`dummy.pdf`).
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.0
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|name| !name.is_empty())
    }
}

impl fmt::Display for DocumentUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl FromStr for DocumentUrl {
    type Err = DocumentUrlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for DocumentUrl {
    type Error = DocumentUrlError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DocumentUrl> for String {
    fn from(url: DocumentUrl) -> Self {
        url.0.into()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const DUMMY: &str = "https://www.w3.org/WAI/ER/tests/xhtml/testfiles/resources/pdf/dummy.pdf";

    #[test]
    fn test_parse_https() {
        let url = DocumentUrl::parse(DUMMY).unwrap();
        assert_eq!(url.as_str(), DUMMY);
        assert_eq!(url.file_name(), Some("dummy.pdf"));
    }

    #[test]
    fn test_rejects_other_schemes() {
        assert_eq!(
            DocumentUrl::parse("ftp://files.example.com/a.pdf"),
            Err(DocumentUrlError::Scheme("ftp".to_string()))
        );
        assert!(matches!(
            DocumentUrl::parse("not a url"),
            Err(DocumentUrlError::Parse(_))
        ));
    }

    #[test]
    fn test_file_name_missing() {
        let url = DocumentUrl::parse("https://example.com/").unwrap();
        assert_eq!(url.file_name(), None);
    }
}
