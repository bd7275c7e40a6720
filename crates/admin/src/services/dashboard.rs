//! Dashboard figures computed from the store.

use serde::Serialize;

use mahardika_core::{LoyaltyTier, Money, PolicyStatus, Role};

use crate::db::{Repository, RepositoryResult, Store};
use crate::models::{PolicyRow, Report, User};

/// Number of customers on the loyalty leaderboard.
pub const LEADERBOARD_SIZE: usize = 4;

/// Headline numbers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Kpis {
    pub active_policies: usize,
    pub customers: usize,
    /// Sales of the most recent monthly report.
    pub latest_revenue: Option<Money>,
    /// Share of policies that have not expired, in whole percent.
    pub renewal_rate: Option<u8>,
}

/// A customer on the leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub name: String,
    pub photo_url: Option<String>,
    pub points: u32,
    pub tier: LoyaltyTier,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub kpis: Kpis,
    /// Policies pending renewal, soonest end date first.
    pub expiring: Vec<PolicyRow>,
    pub leaderboard: Vec<LeaderboardEntry>,
}

impl DashboardSummary {
    /// Compute the dashboard from a store snapshot.
    ///
    /// # Errors
    ///
    /// Propagates repository failures.
    pub async fn compute(store: &Store) -> RepositoryResult<Self> {
        let users = store.users.list().await?;
        let vehicles = store.vehicles.list().await?;
        let policies = store.policies.list().await?;
        let reports = store.reports.list().await?;

        let kpis = Kpis {
            active_policies: policies
                .iter()
                .filter(|p| p.status == PolicyStatus::Active)
                .count(),
            customers: users.iter().filter(|u| u.role == Role::Customer).count(),
            latest_revenue: latest_report(&reports).map(|r| r.total_sales),
            renewal_rate: percentage(
                policies
                    .iter()
                    .filter(|p| p.status != PolicyStatus::Expired)
                    .count(),
                policies.len(),
            ),
        };

        let mut expiring: Vec<PolicyRow> = PolicyRow::project(
            policies
                .into_iter()
                .filter(|p| p.status == PolicyStatus::PendingRenewal)
                .collect(),
            &users,
            &vehicles,
        );
        expiring.sort_by_key(|row| row.policy.end_date);

        Ok(Self {
            kpis,
            expiring,
            leaderboard: leaderboard(&users),
        })
    }
}

fn latest_report(reports: &[Report]) -> Option<&Report> {
    reports.iter().max_by_key(|r| r.month)
}

fn percentage(part: usize, whole: usize) -> Option<u8> {
    if whole == 0 {
        return None;
    }
    u8::try_from(part * 100 / whole).ok()
}

/// Top customers by points; ties keep store order.
fn leaderboard(users: &[User]) -> Vec<LeaderboardEntry> {
    let mut customers: Vec<&User> = users.iter().filter(|u| u.role == Role::Customer).collect();
    customers.sort_by(|a, b| b.points.cmp(&a.points));
    customers
        .into_iter()
        .take(LEADERBOARD_SIZE)
        .enumerate()
        .map(|(i, u)| LeaderboardEntry {
            rank: i + 1,
            name: u.name().to_string(),
            photo_url: u.photo_url.clone(),
            points: u.points,
            tier: u.loyalty_tier,
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::Fixtures;

    #[tokio::test]
    async fn test_summary_from_sample_data() {
        let fixtures = Fixtures::builtin().unwrap();
        let expected_customers = fixtures
            .users
            .iter()
            .filter(|u| u.role == Role::Customer)
            .count();
        let store = Store::from_fixtures(fixtures);

        let summary = DashboardSummary::compute(&store).await.unwrap();
        assert_eq!(summary.kpis.customers, expected_customers);
        assert!(summary.leaderboard.len() <= LEADERBOARD_SIZE);
        assert_eq!(summary.leaderboard[0].name, "Ali Baba");
        assert!(
            summary
                .leaderboard
                .windows(2)
                .all(|w| w[0].points >= w[1].points)
        );
        assert!(
            summary
                .expiring
                .iter()
                .all(|r| r.policy.status == PolicyStatus::PendingRenewal)
        );
        assert!(
            summary
                .expiring
                .windows(2)
                .all(|w| w[0].policy.end_date <= w[1].policy.end_date)
        );
    }

    #[tokio::test]
    async fn test_empty_store_has_no_rates() {
        let summary = DashboardSummary::compute(&Store::default()).await.unwrap();
        assert_eq!(summary.kpis.renewal_rate, None);
        assert_eq!(summary.kpis.latest_revenue, None);
        assert!(summary.leaderboard.is_empty());
    }

    #[test]
    fn test_percentage_rounds_down() {
        assert_eq!(percentage(2, 3), Some(66));
        assert_eq!(percentage(5, 5), Some(100));
    }
}
