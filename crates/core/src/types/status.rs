//! Enumerations shared by portal records.
//!
//! Serialized names match the values stored in fixture files (`admin`,
//! `Gold`, `ThirdParty`, `pendingRenewal`).

use core::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Error returned when parsing one of the enums in this module from text.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid {kind}: '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_owned(),
        }
    }
}

/// Portal role of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Staff,
    Customer,
}

impl Role {
    pub const ALL: [Self; 3] = [Self::Admin, Self::Staff, Self::Customer];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Staff => "staff",
            Self::Customer => "customer",
        }
    }

    /// Prefix used for sequential user identifiers of this role.
    #[must_use]
    pub const fn uid_prefix(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Staff => "STAFF",
            Self::Customer => "CUST",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "staff" => Ok(Self::Staff),
            "customer" => Ok(Self::Customer),
            _ => Err(UnknownVariant::new("role", s)),
        }
    }
}

/// Loyalty programme tier. Ordering follows rank, Bronze lowest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LoyaltyTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl LoyaltyTier {
    pub const ALL: [Self; 4] = [Self::Bronze, Self::Silver, Self::Gold, Self::Platinum];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Bronze => "Bronze",
            Self::Silver => "Silver",
            Self::Gold => "Gold",
            Self::Platinum => "Platinum",
        }
    }

    /// Numeric rank, 1 for Bronze through 4 for Platinum.
    #[must_use]
    pub const fn rank(&self) -> u8 {
        match self {
            Self::Bronze => 1,
            Self::Silver => 2,
            Self::Gold => 3,
            Self::Platinum => 4,
        }
    }
}

impl fmt::Display for LoyaltyTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoyaltyTier {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tier| tier.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownVariant::new("loyalty tier", s))
    }
}

/// Coverage type of a motor policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PolicyType {
    Comprehensive,
    ThirdParty,
}

impl PolicyType {
    pub const ALL: [Self; 2] = [Self::Comprehensive, Self::ThirdParty];

    /// Serialized name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Comprehensive => "Comprehensive",
            Self::ThirdParty => "ThirdParty",
        }
    }

    /// Human-readable name.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Comprehensive => "Comprehensive",
            Self::ThirdParty => "Third Party",
        }
    }
}

impl fmt::Display for PolicyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PolicyType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|ty| ty.as_str().eq_ignore_ascii_case(s) || ty.label().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownVariant::new("policy type", s))
    }
}

/// Lifecycle state of a policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PolicyStatus {
    Active,
    PendingRenewal,
    Expired,
}

impl PolicyStatus {
    pub const ALL: [Self; 3] = [Self::Active, Self::PendingRenewal, Self::Expired];

    /// Policies ending within this many days are due for renewal.
    pub const RENEWAL_WINDOW_DAYS: i64 = 60;

    /// Derive the status of a policy ending on `end` as of `today`.
    ///
    /// A policy whose end date has passed is expired. One that ends within
    /// [`Self::RENEWAL_WINDOW_DAYS`] is pending renewal. Anything else,
    /// including a policy that has not started yet, is active.
    #[must_use]
    pub fn from_end_date(end: NaiveDate, today: NaiveDate) -> Self {
        if end < today {
            Self::Expired
        } else if (end - today).num_days() <= Self::RENEWAL_WINDOW_DAYS {
            Self::PendingRenewal
        } else {
            Self::Active
        }
    }

    /// Serialized name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::PendingRenewal => "pendingRenewal",
            Self::Expired => "expired",
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::PendingRenewal => "Pending Renewal",
            Self::Expired => "Expired",
        }
    }
}

impl fmt::Display for PolicyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PolicyStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| {
                status.as_str().eq_ignore_ascii_case(s) || status.label().eq_ignore_ascii_case(s)
            })
            .ok_or_else(|| UnknownVariant::new("policy status", s))
    }
}
