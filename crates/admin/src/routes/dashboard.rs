//! Dashboard route handler.

use askama::Template;
use axum::{Router, extract::State, response::Html, routing::get};
use tower_sessions::Session;
use tracing::instrument;

use mahardika_core::group_thousands;

use crate::{
    error::AppError,
    filters,
    middleware::RequireAdminAuth,
    models::PolicyRow,
    services::DashboardSummary,
    services::dashboard::LeaderboardEntry,
    state::AppState,
};

use super::{Layout, render};

/// Headline numbers, formatted.
#[derive(Debug, Clone)]
pub struct KpiView {
    pub active_policies: String,
    pub customers: String,
    pub latest_revenue: String,
    pub renewal_rate: String,
}

/// Policy pending renewal.
#[derive(Debug, Clone)]
pub struct ExpiringView {
    pub id: String,
    pub customer: String,
    pub plate: String,
    pub end_date: String,
    pub renew_href: String,
}

impl From<&PolicyRow> for ExpiringView {
    fn from(row: &PolicyRow) -> Self {
        Self {
            id: row.policy.id.to_string(),
            customer: row.customer_display().to_string(),
            plate: row.plate_display().to_string(),
            end_date: row.policy.end_date.format("%Y-%m-%d").to_string(),
            renew_href: format!("/policies/{}/edit", row.policy.id),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LeaderView {
    pub rank: usize,
    pub name: String,
    pub photo_url: String,
    pub points: String,
    pub tier: String,
}

impl From<&LeaderboardEntry> for LeaderView {
    fn from(entry: &LeaderboardEntry) -> Self {
        Self {
            rank: entry.rank,
            name: entry.name.clone(),
            photo_url: entry.photo_url.clone().unwrap_or_default(),
            points: group_thousands(&entry.points.to_string()),
            tier: entry.tier.to_string(),
        }
    }
}

/// Dashboard template.
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub layout: Layout,
    pub kpis: KpiView,
    pub expiring: Vec<ExpiringView>,
    pub leaderboard: Vec<LeaderView>,
}

/// Build the dashboard router.
pub fn router() -> Router<AppState> {
    Router::new().route("/dashboard", get(index))
}

/// Dashboard page handler.
#[instrument(skip(admin, state, session))]
pub async fn index(
    RequireAdminAuth(admin): RequireAdminAuth,
    State(state): State<AppState>,
    session: Session,
) -> Result<Html<String>, AppError> {
    let summary = DashboardSummary::compute(state.store()).await?;

    let kpis = KpiView {
        active_policies: group_thousands(&summary.kpis.active_policies.to_string()),
        customers: group_thousands(&summary.kpis.customers.to_string()),
        latest_revenue: summary
            .kpis
            .latest_revenue
            .map_or_else(|| "-".to_string(), |m| m.to_string()),
        renewal_rate: summary
            .kpis
            .renewal_rate
            .map_or_else(|| "-".to_string(), |r| format!("{r}%")),
    };

    let template = DashboardTemplate {
        layout: Layout::load(&admin, &session, "/dashboard").await?,
        kpis,
        expiring: summary.expiring.iter().map(ExpiringView::from).collect(),
        leaderboard: summary.leaderboard.iter().map(LeaderView::from).collect(),
    };

    Ok(render(&template))
}
