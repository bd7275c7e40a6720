//! Policy and report PDF documents.
//!
//! Documents live at external URLs. Viewing one is a redirect; downloading one
//! streams the upstream body back to the operator as an attachment.

use std::time::Duration;

use axum::{
    body::Body,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::instrument;

use mahardika_core::DocumentUrl;

use crate::models::{Policy, Report, Toast};

/// Content type used when the upstream server does not send one.
const DEFAULT_CONTENT_TYPE: &str = "application/pdf";

/// Errors that can occur while fetching a document.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The request could not be sent or timed out.
    #[error("document request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The document server answered with a non-success status.
    #[error("document server returned {0}")]
    Status(reqwest::StatusCode),
}

impl DocumentError {
    /// Toast shown when a download fails.
    #[must_use]
    pub fn toast(&self) -> Toast {
        Toast::destructive("Download Failed", "The document could not be retrieved.")
    }
}

/// HTTP client for document downloads.
#[derive(Debug, Clone)]
pub struct DocumentFetcher {
    http: reqwest::Client,
}

impl DocumentFetcher {
    /// Create a fetcher whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, DocumentError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("mahardika-admin/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http })
    }

    /// Start fetching `url`, failing on a non-success status.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError`] if the request fails or the server refuses.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch(&self, url: &DocumentUrl) -> Result<reqwest::Response, DocumentError> {
        let response = self.http.get(url.as_str()).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%status, "Document server refused download");
            return Err(DocumentError::Status(status));
        }
        Ok(response)
    }

    /// Fetch `url` and turn it into an attachment response named `file_name`.
    ///
    /// # Errors
    ///
    /// See [`DocumentFetcher::fetch`].
    pub async fn download(&self, url: &DocumentUrl, file_name: &str) -> Result<Response, DocumentError> {
        let upstream = self.fetch(url).await?;
        Ok(attachment_response(upstream, file_name))
    }
}

/// Stream `upstream` back as a download named `file_name`.
#[must_use]
pub fn attachment_response(upstream: reqwest::Response, file_name: &str) -> Response {
    let content_type = upstream
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(DEFAULT_CONTENT_TYPE)
        .to_string();
    let disposition = format!("attachment; filename=\"{}\"", sanitize_file_name(file_name));

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Body::from_stream(upstream.bytes_stream()),
    )
        .into_response()
}

/// Keep a file name safe for a quoted `Content-Disposition` parameter.
#[must_use]
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.trim_matches(['.', '_']).is_empty() {
        "document.pdf".to_string()
    } else {
        cleaned
    }
}

/// Download name for a policy document.
#[must_use]
pub fn policy_file_name(policy: &Policy) -> String {
    policy
        .pdf_url
        .as_ref()
        .and_then(DocumentUrl::file_name)
        .filter(|name| name.to_ascii_lowercase().ends_with(".pdf"))
        .map_or_else(|| format!("Policy-{}.pdf", policy.id), ToString::to_string)
}

/// Download name for a monthly report.
#[must_use]
pub fn report_file_name(report: &Report) -> String {
    report.file_name()
}
