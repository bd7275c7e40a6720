//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Health check
//!
//! # Auth (simulated sign-in)
//! GET  /                                - Login page
//! POST /login                           - Sign in as a staff or admin account
//! POST /logout                          - Sign out
//!
//! # Dashboard
//! GET  /dashboard                       - KPIs, expiring policies, leaderboard
//!
//! # Browsers (customers, staff, admins, vehicles, policies, reports)
//! GET  /{table}                         - Sortable, filterable, paginated list
//! POST /{table}/selection               - Toggle one row, the page, or clear
//! POST /{table}/{id}/actions            - Dispatch a row action
//!
//! # Policies
//! GET  /policies/export                 - Filtered policies as a JSON download
//! GET  /policies/new                    - Create form
//! POST /policies/new                    - Create
//! GET  /policies/{id}/edit              - Edit form
//! POST /policies/{id}/edit              - Update
//!
//! # Documents
//! GET  /policies/{id}/document          - Open the policy PDF
//! GET  /policies/{id}/document/download - Download the policy PDF
//! GET  /reports/{id}/document           - Open the report PDF
//! GET  /reports/{id}/document/download  - Download the report PDF
//!
//! # Users
//! GET  /users/new                       - Invite form
//! POST /users/new                       - Invite (simulated)
//!
//! # Settings
//! GET  /settings                        - Profile and notification preferences
//! POST /settings                        - Save preferences
//!
//! # API
//! GET  /api/{table}                     - Browser page as JSON
//! ```

pub mod api;
pub mod auth;
pub mod dashboard;
pub mod documents;
pub mod policies;
pub mod settings;
pub mod tables;
pub mod users;

use askama::Template;
use axum::{
    Router,
    response::Html,
    routing::get,
};
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tower_sessions::Session;
use tracing::Span;

use crate::error::AppError;
use crate::middleware::create_session_layer;
use crate::models::{CurrentAdmin, Toast};
use crate::services::notifications;
use crate::state::AppState;

/// Signed-in operator as shown in the page chrome.
#[derive(Debug, Clone)]
pub struct AdminUserView {
    pub name: String,
    pub email: String,
    pub role: String,
}

impl From<&CurrentAdmin> for AdminUserView {
    fn from(admin: &CurrentAdmin) -> Self {
        Self {
            name: admin.name.clone(),
            email: admin.email.to_string(),
            role: admin.role.to_string(),
        }
    }
}

/// What every signed-in page's layout needs.
#[derive(Debug, Clone)]
pub struct Layout {
    pub admin_user: AdminUserView,
    pub current_path: String,
    /// Toasts flashed since the last page, shown once.
    pub toasts: Vec<Toast>,
}

impl Layout {
    /// Build the layout, taking any flashed toasts out of the session.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be read.
    pub async fn load(admin: &CurrentAdmin, session: &Session, current_path: &str) -> Result<Self, AppError> {
        Ok(Self {
            admin_user: AdminUserView::from(admin),
            current_path: current_path.to_string(),
            toasts: notifications::take(session).await?,
        })
    }

    /// Whether the nav link for `prefix` is the current section.
    #[must_use]
    pub fn is_active(&self, prefix: &str) -> bool {
        self.current_path == prefix || self.current_path.starts_with(&format!("{prefix}/"))
    }
}

/// Render a template, logging failures instead of propagating them.
pub fn render(template: &impl Template) -> Html<String> {
    Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_string()
    }))
}

/// All page and API routes, without middleware.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(dashboard::router())
        .merge(policies::router())
        .merge(documents::router())
        .merge(tables::router())
        .merge(users::router())
        .merge(settings::router())
        .merge(api::router())
}

/// The complete application: routes, sessions, request tracing and static
/// assets.
///
/// Sentry layers are added by the binary on top of this.
pub fn build_router(state: AppState) -> Router {
    let session_layer = create_session_layer(state.config());

    Router::new()
        .route("/health", get(health))
        .merge(routes())
        .nest_service("/static", ServeDir::new("crates/admin/static"))
        .layer(session_layer)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running.
async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use mahardika_core::{Email, Role, UserUid};
    use tower::ServiceExt;

    use crate::config::AdminConfig;

    fn app() -> Router {
        build_router(AppState::from_config(AdminConfig::default()).unwrap())
    }

    fn admin() -> CurrentAdmin {
        CurrentAdmin {
            uid: UserUid::new("ADMIN002"),
            email: Email::parse("irfan@mahardika.co").unwrap(),
            name: "Irfan".to_string(),
            role: Role::Admin,
        }
    }

    #[test]
    fn test_layout_active_section() {
        let layout = Layout {
            admin_user: AdminUserView::from(&admin()),
            current_path: "/policies/POL001/edit".to_string(),
            toasts: vec![],
        };
        assert!(layout.is_active("/policies"));
        assert!(!layout.is_active("/policy"));
        assert!(!layout.is_active("/reports"));
        assert_eq!(layout.admin_user.role, "admin");
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_pages_redirect_anonymous_visitors() {
        let response = app()
            .oneshot(Request::get("/vehicles").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/");
    }
}
