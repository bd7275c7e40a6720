//! The portal's browser tables.
//!
//! One [`Table`] per list page, each with its column descriptors and its
//! presentation settings.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use mahardika_core::{LoyaltyTier, PolicyStatus, PolicyType, Role};

use super::browser::{Cell, Column, Facet, SortKey, TableDescriptor, Tone};
use super::data_table::{DataTableConfig, FilterOption, TableFilter};
use crate::models::{PolicyRow, Report, User, VehicleRow};

/// A browsable table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Customers,
    Staff,
    Admins,
    Vehicles,
    Policies,
    Reports,
}

impl Table {
    pub const ALL: [Self; 6] = [
        Self::Customers,
        Self::Staff,
        Self::Admins,
        Self::Vehicles,
        Self::Policies,
        Self::Reports,
    ];

    /// URL segment (`/customers`).
    #[must_use]
    pub const fn slug(&self) -> &'static str {
        match self {
            Self::Customers => "customers",
            Self::Staff => "staff",
            Self::Admins => "admins",
            Self::Vehicles => "vehicles",
            Self::Policies => "policies",
            Self::Reports => "reports",
        }
    }

    #[must_use]
    pub fn path(&self) -> String {
        format!("/{}", self.slug())
    }

    /// Role a user table is limited to. `None` for the all-users table and
    /// for tables that do not list users.
    #[must_use]
    pub const fn user_scope(&self) -> Option<Role> {
        match self {
            Self::Staff => Some(Role::Staff),
            Self::Admins => Some(Role::Admin),
            _ => None,
        }
    }

    /// Presentation settings for the table's page.
    #[must_use]
    pub fn config(&self) -> DataTableConfig {
        match self {
            Self::Customers => DataTableConfig::new("customers", "Customers")
                .description("Every account on the portal with its role and loyalty standing.")
                .filter(role_filter())
                .filter(TableFilter::select(
                    "tier",
                    "Loyalty Tier",
                    std::iter::once(FilterOption::all())
                        .chain(
                            LoyaltyTier::ALL
                                .iter()
                                .map(|t| FilterOption::new(t.as_str(), t.as_str())),
                        )
                        .collect(),
                ))
                .search_placeholder("Filter by customer email...")
                .empty_state("No customers yet", Some("Invite a user to get started."))
                .create_button("/users/new", "Add User"),
            Self::Staff => DataTableConfig::new("staff", "Staff")
                .description("Agency staff who manage customer accounts.")
                .filter(role_filter())
                .search_placeholder("Filter by staff email or name...")
                .empty_state("No staff members", None)
                .create_button("/users/new", "Add Staff"),
            Self::Admins => DataTableConfig::new("admins", "Administrators")
                .description("Manage administrator accounts and their permissions.")
                .filter(role_filter())
                .search_placeholder("Filter by admin email or name...")
                .empty_state("No administrators", None)
                .create_button("/users/new", "Add Admin"),
            Self::Vehicles => DataTableConfig::new("vehicles", "Vehicles")
                .description("Registered vehicles. Archived vehicles are hidden unless filtered.")
                .filter(TableFilter::select(
                    "status",
                    "Status",
                    vec![
                        FilterOption::new("active", "Active"),
                        FilterOption::new("archived", "Archived"),
                        FilterOption::all(),
                    ],
                ))
                .search_placeholder("Filter by plate number, owner name...")
                .empty_state("No vehicles registered", None),
            Self::Policies => DataTableConfig::new("policies", "Policies")
                .description("Motor insurance policies and their documents.")
                .filter(TableFilter::select(
                    "status",
                    "Status",
                    std::iter::once(FilterOption::all())
                        .chain(
                            PolicyStatus::ALL
                                .iter()
                                .map(|s| FilterOption::new(s.as_str(), s.label())),
                        )
                        .collect(),
                ))
                .filter(TableFilter::select(
                    "type",
                    "Type",
                    std::iter::once(FilterOption::all())
                        .chain(
                            PolicyType::ALL
                                .iter()
                                .map(|t| FilterOption::new(t.as_str(), t.label())),
                        )
                        .collect(),
                ))
                .search_placeholder("Filter policies by ID...")
                .empty_state("No policies yet", Some("Create the first policy."))
                .create_button("/policies/new", "Create Policy"),
            Self::Reports => DataTableConfig::new("reports", "Monthly Reports")
                .description("Sales reports generated at the start of each month.")
                .search_placeholder("Filter by month, date or sales...")
                .empty_state("No reports generated", None)
                .without_selection(),
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for Table {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.slug() == s)
            .ok_or_else(|| format!("unknown table: {s}"))
    }
}

fn role_filter() -> TableFilter {
    TableFilter::select(
        "role",
        "Role",
        std::iter::once(FilterOption::all())
            .chain(Role::ALL.iter().map(|r| FilterOption::new(r.as_str(), r.as_str())))
            .collect(),
    )
}

// =============================================================================
// Badge tones
// =============================================================================

const fn role_tone(role: Role) -> Tone {
    match role {
        Role::Admin => Tone::Default,
        Role::Staff => Tone::Secondary,
        Role::Customer => Tone::Outline,
    }
}

const fn tier_tone(tier: LoyaltyTier) -> Tone {
    match tier {
        LoyaltyTier::Platinum => Tone::Default,
        LoyaltyTier::Gold => Tone::Warning,
        LoyaltyTier::Silver => Tone::Secondary,
        LoyaltyTier::Bronze => Tone::Outline,
    }
}

/// Badge tone for a policy status.
#[must_use]
pub const fn status_tone(status: PolicyStatus) -> Tone {
    match status {
        PolicyStatus::Active => Tone::Success,
        PolicyStatus::PendingRenewal => Tone::Warning,
        PolicyStatus::Expired => Tone::Destructive,
    }
}

// =============================================================================
// Descriptors
// =============================================================================

fn name_column() -> Column<User> {
    Column::new("name", "Name", |u: &User| {
        Cell::avatar(u.name(), u.photo_url.as_deref())
    })
}

fn email_column() -> Column<User> {
    Column::new("email", "Email", |u: &User| Cell::text(u.email_str()))
        .sortable(|u| SortKey::text(u.email_str()))
        .filterable(|u| u.email_str().to_string())
}

fn role_column() -> Column<User> {
    Column::new("role", "Role", |u: &User| {
        Cell::badge(u.role.as_str(), role_tone(u.role))
    })
}

fn role_facet() -> Facet<User> {
    Facet::new("role", |u: &User| u.role.as_str())
}

/// All users: name, email, role, loyalty tier, points.
#[must_use]
pub fn customer_columns() -> TableDescriptor<User> {
    TableDescriptor {
        columns: vec![
            name_column(),
            email_column(),
            role_column(),
            Column::new("tier", "Loyalty Tier", |u: &User| {
                Cell::badge(u.loyalty_tier.as_str(), tier_tone(u.loyalty_tier))
            })
            .sortable(|u| SortKey::Int(i64::from(u.loyalty_tier.rank()))),
            Column::new("points", "Points", |u: &User| Cell::number(u64::from(u.points)))
                .sortable(|u| SortKey::Int(i64::from(u.points))),
        ],
        facets: vec![
            role_facet(),
            Facet::new("tier", |u: &User| u.loyalty_tier.as_str()),
        ],
        default_filter_by: "email",
    }
}

/// Staff or administrators: name, email, role.
#[must_use]
pub fn member_columns() -> TableDescriptor<User> {
    TableDescriptor {
        columns: vec![
            name_column().filterable(|u| u.name().to_string()),
            email_column(),
            role_column(),
        ],
        facets: vec![role_facet()],
        default_filter_by: "email",
    }
}

#[must_use]
pub fn vehicle_columns() -> TableDescriptor<VehicleRow> {
    TableDescriptor {
        columns: vec![
            Column::new("plate", "Plate Number", |r: &VehicleRow| {
                Cell::text(&r.vehicle.plate_number)
            })
            .sortable(|r| SortKey::text(&r.vehicle.plate_number))
            .filterable(|r| r.vehicle.plate_number.clone()),
            Column::new("make", "Make", |r: &VehicleRow| Cell::text(&r.vehicle.make)),
            Column::new("model", "Model", |r: &VehicleRow| Cell::text(&r.vehicle.model)),
            Column::new("year", "Year", |r: &VehicleRow| {
                Cell::text(r.vehicle.year.to_string())
            })
            .sortable(|r| SortKey::Int(i64::from(r.vehicle.year))),
            Column::new("owner", "Owner", |r: &VehicleRow| Cell::text(r.owner_display()))
                .filterable(|r| r.owner_display().to_string()),
            Column::new("status", "Status", |r: &VehicleRow| {
                let tone = if r.vehicle.archived {
                    Tone::Secondary
                } else {
                    Tone::Success
                };
                Cell::badge(r.vehicle.status_label(), tone)
            }),
        ],
        facets: vec![Facet::new("status", |r: &VehicleRow| r.vehicle.status_key()).default_to("active")],
        default_filter_by: "plate",
    }
}

#[must_use]
pub fn policy_columns() -> TableDescriptor<PolicyRow> {
    TableDescriptor {
        columns: vec![
            Column::new("id", "Policy ID", |r: &PolicyRow| Cell::text(r.policy.id.as_str()))
                .sortable(|r| SortKey::text(r.policy.id.as_str()))
                .filterable(|r| r.policy.id.to_string()),
            Column::new("customer", "Customer", |r: &PolicyRow| {
                Cell::text(r.customer_display())
            })
            .filterable(|r| r.customer_display().to_string()),
            Column::new("plate", "Vehicle Plate", |r: &PolicyRow| Cell::text(r.plate_display()))
                .filterable(|r| r.plate_display().to_string()),
            Column::new("type", "Type", |r: &PolicyRow| Cell::text(r.policy.policy_type.label())),
            Column::new("start_date", "Start Date", |r: &PolicyRow| {
                Cell::date(r.policy.start_date)
            }),
            Column::new("end_date", "End Date", |r: &PolicyRow| Cell::date(r.policy.end_date))
                .sortable(|r| SortKey::Date(r.policy.end_date)),
            Column::new("total_price", "Total Price", |r: &PolicyRow| {
                Cell::money(r.policy.total_price)
            }),
            Column::new("status", "Status", |r: &PolicyRow| {
                Cell::badge(r.policy.status.label(), status_tone(r.policy.status))
            }),
        ],
        facets: vec![
            Facet::new("status", |r: &PolicyRow| r.policy.status.as_str()),
            Facet::new("type", |r: &PolicyRow| r.policy.policy_type.as_str()),
        ],
        default_filter_by: "id",
    }
}

#[must_use]
pub fn report_columns() -> TableDescriptor<Report> {
    TableDescriptor {
        columns: vec![
            Column::new("month", "Month", |r: &Report| Cell::text(r.month.to_string()))
                .sortable(|r| SortKey::text(&r.month.to_string()))
                .filterable(|r| r.month.to_string()),
            Column::new("generated_date", "Generated Date", |r: &Report| {
                Cell::date(r.generated_date)
            })
            .sortable(|r| SortKey::Date(r.generated_date))
            .filterable(|r| r.generated_date.to_string()),
            Column::new("total_sales", "Total Sales", |r: &Report| Cell::money(r.total_sales))
                .sortable(|r| SortKey::money(r.total_sales))
                .filterable(|r| r.total_sales.to_string()),
        ],
        facets: vec![],
        default_filter_by: "month",
    }
}
