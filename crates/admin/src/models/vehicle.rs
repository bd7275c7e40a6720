//! Vehicles and their table projection.

use serde::{Deserialize, Serialize};

use mahardika_core::{UserUid, VehicleId};

use super::User;

/// A customer's vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    pub owner_uid: UserUid,
    pub plate_number: String,
    pub make: String,
    pub model: String,
    pub year: u16,
    #[serde(default)]
    pub archived: bool,
}

impl Vehicle {
    #[must_use]
    pub const fn status_label(&self) -> &'static str {
        if self.archived { "Archived" } else { "Active" }
    }

    /// Facet value used by the status filter.
    #[must_use]
    pub const fn status_key(&self) -> &'static str {
        if self.archived { "archived" } else { "active" }
    }
}

/// A vehicle joined with its owner's name at render time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VehicleRow {
    #[serde(flatten)]
    pub vehicle: Vehicle,
    pub owner_name: Option<String>,
}

impl VehicleRow {
    /// Project every vehicle, resolving owners against `users`.
    #[must_use]
    pub fn project(vehicles: Vec<Vehicle>, users: &[User]) -> Vec<Self> {
        vehicles
            .into_iter()
            .map(|vehicle| {
                let owner_name = users
                    .iter()
                    .find(|u| u.uid == vehicle.owner_uid)
                    .map(|u| u.name().to_string());
                Self { vehicle, owner_name }
            })
            .collect()
    }

    #[must_use]
    pub fn owner_display(&self) -> &str {
        self.owner_name.as_deref().unwrap_or(super::NOT_AVAILABLE)
    }
}
