//! Motor insurance policies and their table projection.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use mahardika_core::{DocumentUrl, Money, PolicyId, PolicyStatus, PolicyType, UserUid, VehicleId};

use super::{User, Vehicle};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Policy {
    pub id: PolicyId,
    pub owner_uid: UserUid,
    pub vehicle_id: VehicleId,
    pub policy_type: PolicyType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_url: Option<DocumentUrl>,
    pub total_price: Money,
    pub status: PolicyStatus,
}

impl Policy {
    #[must_use]
    pub const fn has_document(&self) -> bool {
        self.pdf_url.is_some()
    }
}

/// A policy joined with its customer's name and vehicle plate at render time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyRow {
    #[serde(flatten)]
    pub policy: Policy,
    pub customer_name: Option<String>,
    pub vehicle_plate: Option<String>,
}

impl PolicyRow {
    #[must_use]
    pub fn project(policies: Vec<Policy>, users: &[User], vehicles: &[Vehicle]) -> Vec<Self> {
        policies
            .into_iter()
            .map(|policy| {
                let customer_name = users
                    .iter()
                    .find(|u| u.uid == policy.owner_uid)
                    .map(|u| u.name().to_string());
                let vehicle_plate = vehicles
                    .iter()
                    .find(|v| v.id == policy.vehicle_id)
                    .map(|v| v.plate_number.clone());
                Self {
                    policy,
                    customer_name,
                    vehicle_plate,
                }
            })
            .collect()
    }

    #[must_use]
    pub fn customer_display(&self) -> &str {
        self.customer_name.as_deref().unwrap_or(super::NOT_AVAILABLE)
    }

    #[must_use]
    pub fn plate_display(&self) -> &str {
        self.vehicle_plate.as_deref().unwrap_or(super::NOT_AVAILABLE)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use mahardika_core::{LoyaltyTier, Role};

    use super::*;
    use crate::models::VehicleRow;

    fn sample_policy(owner: &str, vehicle: &str) -> Policy {
        Policy {
            id: PolicyId::new("POL900"),
            owner_uid: UserUid::new(owner),
            vehicle_id: VehicleId::new(vehicle),
            policy_type: PolicyType::Comprehensive,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            pdf_url: None,
            total_price: Money::from_sen(100_000),
            status: PolicyStatus::Active,
        }
    }

    fn owner() -> User {
        User {
            uid: UserUid::new("CUST001"),
            role: Role::Customer,
            loyalty_tier: LoyaltyTier::Gold,
            points: 10,
            email: None,
            display_name: Some("Ali Baba".to_string()),
            photo_url: None,
            linked_owner: None,
        }
    }

    fn car() -> Vehicle {
        Vehicle {
            id: VehicleId::new("VEH001"),
            owner_uid: UserUid::new("CUST001"),
            plate_number: "WWW 123".to_string(),
            make: "Toyota".to_string(),
            model: "Vios".to_string(),
            year: 2022,
            archived: false,
        }
    }

    #[test]
    fn test_projection_resolves_references() {
        let rows = PolicyRow::project(vec![sample_policy("CUST001", "VEH001")], &[owner()], &[car()]);
        assert_eq!(rows[0].customer_display(), "Ali Baba");
        assert_eq!(rows[0].plate_display(), "WWW 123");
    }

    #[test]
    fn test_projection_marks_dangling_references() {
        let rows = PolicyRow::project(vec![sample_policy("CUST404", "VEH404")], &[owner()], &[car()]);
        assert_eq!(rows[0].customer_display(), "N/A");
        assert_eq!(rows[0].plate_display(), "N/A");

        let mut orphan = car();
        orphan.owner_uid = UserUid::new("CUST404");
        let rows = VehicleRow::project(vec![orphan], &[owner()]);
        assert_eq!(rows[0].owner_display(), "N/A");
    }

    #[test]
    fn test_projection_reads_current_owner_name() {
        let mut renamed = owner();
        renamed.display_name = Some("Ali bin Baba".to_string());
        let rows = VehicleRow::project(vec![car()], &[renamed]);
        assert_eq!(rows[0].owner_display(), "Ali bin Baba");
    }
}
