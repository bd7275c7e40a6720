//! Integration tests for the Mahardika admin portal.
//!
//! Each test boots the real router on an ephemeral port with its own
//! in-memory store and talks to it over HTTP with a cookie-keeping client.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p mahardika-integration-tests
//! ```
//!
//! No database or external service is needed. Document downloads are served
//! by a local stub started with [`serve_stub`].

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::Router;
use mahardika_admin::config::AdminConfig;
use mahardika_admin::db::Fixtures;
use mahardika_admin::routes::build_router;
use mahardika_admin::state::AppState;
use reqwest::{Client, Response, StatusCode, header};

/// Sample operator who can sign in.
pub const ADMIN_EMAIL: &str = "superadmin@mahardika.co";

/// A running portal plus a client holding its session cookie.
pub struct TestServer {
    pub base_url: String,
    pub client: Client,
    // Keeps a custom fixture file alive for the life of the server.
    _fixtures_dir: Option<tempfile::TempDir>,
}

impl TestServer {
    /// Start a portal seeded with the built-in sample data.
    pub async fn start() -> Self {
        Self::boot(None, None).await
    }

    /// Start a portal seeded with `fixtures`.
    pub async fn with_fixtures(fixtures: &Fixtures) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixtures.yaml");
        std::fs::write(&path, fixtures.to_yaml().unwrap()).unwrap();

        Self::boot(Some(path), Some(dir)).await
    }

    async fn boot(fixtures_path: Option<PathBuf>, fixtures_dir: Option<tempfile::TempDir>) -> Self {
        let mut config = AdminConfig::from_lookup(|key| match key {
            "ADMIN_DETAIL_DELAY_MS" => Some("0".to_string()),
            "ADMIN_DOCUMENT_TIMEOUT_SECS" => Some("5".to_string()),
            _ => None,
        })
        .unwrap();
        config.fixtures_path = fixtures_path;

        let state = AppState::from_config(config).unwrap();
        let addr = serve(build_router(state)).await;

        let client = Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap();

        Self {
            base_url: format!("http://{addr}"),
            client,
            _fixtures_dir: fixtures_dir,
        }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn get(&self, path: &str) -> Response {
        self.client.get(self.url(path)).send().await.unwrap()
    }

    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .unwrap()
    }

    /// GET `path` and return the body, asserting a 200.
    pub async fn page(&self, path: &str) -> String {
        let resp = self.get(path).await;
        assert_eq!(resp.status(), StatusCode::OK, "GET {path}");
        resp.text().await.unwrap()
    }

    /// GET a JSON browse page from `/api/{table}`.
    pub async fn api(&self, path_and_query: &str) -> serde_json::Value {
        let resp = self.get(&format!("/api/{path_and_query}")).await;
        assert_eq!(resp.status(), StatusCode::OK, "GET /api/{path_and_query}");
        resp.json().await.unwrap()
    }

    /// Sign in as the sample super administrator.
    pub async fn login(&self) {
        let resp = self
            .post_form("/login", &[("email", ADMIN_EMAIL), ("password", "password")])
            .await;
        assert_eq!(location(&resp), "/dashboard");
    }

    /// Start a portal and sign in.
    pub async fn signed_in() -> Self {
        let server = Self::start().await;
        server.login().await;
        server
    }
}

/// Serve `app` on an ephemeral local port.
pub async fn serve(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Start a stub document server and return its base URL.
pub async fn serve_stub(app: Router) -> String {
    format!("http://{}", serve(app).await)
}

/// `Location` header of a redirect.
#[must_use]
pub fn location(resp: &Response) -> String {
    assert!(
        resp.status().is_redirection(),
        "expected a redirect, got {}",
        resp.status()
    );
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Ids of the rows in a JSON browse page.
#[must_use]
pub fn row_ids(page: &serde_json::Value) -> Vec<String> {
    page["rows"]
        .as_array()
        .map(|rows| {
            rows.iter()
                .filter_map(|r| r["id"].as_str().map(ToString::to_string))
                .collect()
        })
        .unwrap_or_default()
}
