//! Creating and editing policies.
//!
//! Portal writes are the only place referential integrity is enforced: the
//! owner must be an existing user and the vehicle an existing vehicle. The
//! stored status is recomputed from the dates on every write.

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;
use tracing::instrument;
use validator::Validate;

use mahardika_core::{
    DocumentUrl, Money, PolicyId, PolicyStatus, PolicyType, UserUid, VehicleId,
    next_sequential_id,
};

use crate::db::{Repository, RepositoryError, Store};
use crate::models::{Policy, Toast};

use super::forms::FormErrors;

/// Prefix of generated policy identifiers.
const POLICY_ID_PREFIX: &str = "POL";

/// Submitted policy form. Every field arrives as text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Validate)]
#[serde(default)]
pub struct PolicyForm {
    #[validate(length(min = 1, message = "Customer ID is required."))]
    pub owner_uid: String,

    #[validate(length(min = 1, message = "Vehicle ID is required."))]
    pub vehicle_id: String,

    #[validate(length(min = 1, message = "Policy type is required."))]
    pub policy_type: String,

    #[validate(length(min = 1, message = "Start date is required."))]
    pub start_date: String,

    #[validate(length(min = 1, message = "End date is required."))]
    pub end_date: String,

    #[validate(length(min = 1, message = "Total price is required."))]
    pub total_price: String,

    pub pdf_url: String,
}

impl PolicyForm {
    /// Empty form for a new policy.
    #[must_use]
    pub fn blank() -> Self {
        Self {
            total_price: "0".to_string(),
            ..Self::default()
        }
    }

    /// Form prefilled from an existing policy.
    #[must_use]
    pub fn from_policy(policy: &Policy) -> Self {
        Self {
            owner_uid: policy.owner_uid.to_string(),
            vehicle_id: policy.vehicle_id.to_string(),
            policy_type: policy.policy_type.as_str().to_string(),
            start_date: policy.start_date.to_string(),
            end_date: policy.end_date.to_string(),
            total_price: policy.total_price.amount().to_string(),
            pdf_url: policy
                .pdf_url
                .as_ref()
                .map(|u| u.as_str().to_string())
                .unwrap_or_default(),
        }
    }
}

/// A policy form that parsed cleanly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyDraft {
    pub owner_uid: UserUid,
    pub vehicle_id: VehicleId,
    pub policy_type: PolicyType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_price: Money,
    pub pdf_url: Option<DocumentUrl>,
}

impl PolicyDraft {
    /// Parse and check `form` without looking at the store.
    ///
    /// # Errors
    ///
    /// Returns the per-field messages if any field is invalid.
    pub fn from_form(form: &PolicyForm) -> Result<Self, FormErrors> {
        let mut errors = form.validate().err().map(FormErrors::from).unwrap_or_default();

        let policy_type = form.policy_type.parse::<PolicyType>().ok();
        if policy_type.is_none() {
            errors.add("policy_type", "Policy type is required.");
        }

        let start_date = parse_date(&form.start_date);
        if start_date.is_none() {
            errors.add("start_date", "Start date is required.");
        }
        let end_date = parse_date(&form.end_date);
        if end_date.is_none() {
            errors.add("end_date", "End date is required.");
        }
        if let (Some(start), Some(end)) = (start_date, end_date) {
            if end < start {
                errors.add("end_date", "End date cannot be before the start date.");
            }
        }

        let total_price = match Money::parse(&form.total_price) {
            Ok(price) => Some(price),
            Err(mahardika_core::MoneyError::Negative) => {
                errors.add("total_price", "Total price must be a positive number.");
                None
            }
            Err(_) => {
                errors.add("total_price", "Total price must be a number.");
                None
            }
        };

        let pdf_url = match form.pdf_url.trim() {
            "" => None,
            url => match DocumentUrl::parse(url) {
                Ok(url) => Some(url),
                Err(e) => {
                    errors.add("pdf_url", format!("Document link is invalid: {e}."));
                    None
                }
            },
        };

        match (policy_type, start_date, end_date, total_price) {
            (Some(policy_type), Some(start_date), Some(end_date), Some(total_price))
                if errors.is_empty() =>
            {
                Ok(Self {
                    owner_uid: UserUid::new(form.owner_uid.trim()),
                    vehicle_id: VehicleId::new(form.vehicle_id.trim()),
                    policy_type,
                    start_date,
                    end_date,
                    total_price,
                    pdf_url,
                })
            }
            _ => Err(errors),
        }
    }

    /// Build the stored record, computing the status as of `today`.
    #[must_use]
    pub fn into_policy(self, id: PolicyId, today: NaiveDate) -> Policy {
        Policy {
            status: PolicyStatus::from_end_date(self.end_date, today),
            id,
            owner_uid: self.owner_uid,
            vehicle_id: self.vehicle_id,
            policy_type: self.policy_type,
            start_date: self.start_date,
            end_date: self.end_date,
            pdf_url: self.pdf_url,
            total_price: self.total_price,
        }
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// Errors from a policy write.
#[derive(Debug, Error)]
pub enum PolicyWriteError {
    /// The form has per-field errors; re-render it.
    #[error("policy form has {} invalid field(s)", .0.len())]
    Invalid(FormErrors),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Parse `form` and check its references against the store.
///
/// # Errors
///
/// Returns [`PolicyWriteError::Invalid`] with every field message if the form
/// is invalid or names a missing customer or vehicle.
pub async fn validate(store: &Store, form: &PolicyForm) -> Result<PolicyDraft, PolicyWriteError> {
    let draft = PolicyDraft::from_form(form);

    let mut errors = draft.as_ref().err().cloned().unwrap_or_default();
    let owner = form.owner_uid.trim();
    if !owner.is_empty() && store.users.get(owner).await?.is_none() {
        errors.add("owner_uid", format!("Customer {owner} does not exist."));
    }
    let vehicle = form.vehicle_id.trim();
    if !vehicle.is_empty() && store.vehicles.get(vehicle).await?.is_none() {
        errors.add("vehicle_id", format!("Vehicle {vehicle} does not exist."));
    }

    match draft {
        Ok(draft) if errors.is_empty() => Ok(draft),
        _ => Err(PolicyWriteError::Invalid(errors)),
    }
}

/// Create a policy under the next free `POL###` identifier.
///
/// # Errors
///
/// See [`validate`].
#[instrument(skip(store, form))]
pub async fn create(
    store: &Store,
    form: &PolicyForm,
    today: NaiveDate,
) -> Result<Policy, PolicyWriteError> {
    let draft = validate(store, form).await?;
    let existing = store.policies.list().await?;
    let id = next_sequential_id(POLICY_ID_PREFIX, existing.iter().map(|p| p.id.as_str()));

    let policy = store
        .policies
        .insert(draft.into_policy(PolicyId::new(id), today))
        .await?;
    tracing::info!(id = %policy.id, status = %policy.status, "Policy created");
    Ok(policy)
}

/// Replace policy `id` with the submitted form.
///
/// # Errors
///
/// Returns [`RepositoryError::NotFound`] for an unknown policy, otherwise see
/// [`validate`].
#[instrument(skip(store, form))]
pub async fn update(
    store: &Store,
    id: &str,
    form: &PolicyForm,
    today: NaiveDate,
) -> Result<Policy, PolicyWriteError> {
    if store.policies.get(id).await?.is_none() {
        return Err(RepositoryError::not_found("Policy", id).into());
    }
    let draft = validate(store, form).await?;
    let replacement = draft.into_policy(PolicyId::new(id), today);

    let policy = store
        .policies
        .update(id, move |policy| *policy = replacement)
        .await?;
    tracing::info!(id = %policy.id, status = %policy.status, "Policy updated");
    Ok(policy)
}

/// Toast after a successful save.
#[must_use]
pub fn saved_toast(policy: &Policy, created: bool) -> Toast {
    if created {
        Toast::new(
            "Policy Created",
            format!("Policy {} has been successfully created.", policy.id),
        )
    } else {
        Toast::new(
            "Policy Updated",
            format!("Policy {} has been successfully updated.", policy.id),
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::Fixtures;

    fn store() -> Store {
        Store::from_fixtures(Fixtures::builtin().unwrap())
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
    }

    fn valid_form() -> PolicyForm {
        PolicyForm {
            owner_uid: "CUST002".to_string(),
            vehicle_id: "VEH002".to_string(),
            policy_type: "ThirdParty".to_string(),
            start_date: "2024-03-01".to_string(),
            end_date: "2025-02-28".to_string(),
            total_price: "RM 1,050.00".to_string(),
            pdf_url: String::new(),
        }
    }

    #[test]
    fn test_end_before_start_is_rejected() {
        let form = PolicyForm {
            end_date: "2024-01-01".to_string(),
            ..valid_form()
        };
        let errors = PolicyDraft::from_form(&form).unwrap_err();
        assert_eq!(
            errors.get("end_date"),
            Some("End date cannot be before the start date.")
        );
    }

    #[test]
    fn test_blank_form_lists_required_fields() {
        let errors = PolicyDraft::from_form(&PolicyForm::default()).unwrap_err();
        for field in ["owner_uid", "vehicle_id", "policy_type", "start_date", "end_date", "total_price"] {
            assert!(errors.has(field), "missing error for {field}");
        }
        assert!(!errors.has("pdf_url"));
    }

    #[test]
    fn test_negative_price_is_rejected() {
        let form = PolicyForm {
            total_price: "-5".to_string(),
            ..valid_form()
        };
        let errors = PolicyDraft::from_form(&form).unwrap_err();
        assert_eq!(errors.get("total_price"), Some("Total price must be a positive number."));
    }

    #[test]
    fn test_form_round_trips_existing_policy() {
        let policy = Fixtures::builtin().unwrap().policies[0].clone();
        let draft = PolicyDraft::from_form(&PolicyForm::from_policy(&policy)).unwrap();
        assert_eq!(draft.total_price, policy.total_price);
        assert_eq!(draft.pdf_url, policy.pdf_url);
        assert_eq!(draft.end_date, policy.end_date);
    }

    #[tokio::test]
    async fn test_unknown_references_are_rejected() {
        let store = store();
        let form = PolicyForm {
            owner_uid: "CUST999".to_string(),
            vehicle_id: "VEH999".to_string(),
            ..valid_form()
        };
        let Err(PolicyWriteError::Invalid(errors)) = validate(&store, &form).await else {
            panic!("expected invalid form");
        };
        assert_eq!(errors.get("owner_uid"), Some("Customer CUST999 does not exist."));
        assert_eq!(errors.get("vehicle_id"), Some("Vehicle VEH999 does not exist."));
    }

    #[tokio::test]
    async fn test_create_assigns_next_id_and_status() {
        let store = store();
        let policy = create(&store, &valid_form(), today()).await.unwrap();
        assert_eq!(policy.id.as_str(), "POL006");
        assert_eq!(policy.status, PolicyStatus::Active);
        assert_eq!(policy.total_price.to_string(), "RM 1,050.00");
        assert_eq!(store.policies.len().await, 6);
    }

    #[tokio::test]
    async fn test_update_recomputes_status() {
        let store = store();
        let form = PolicyForm {
            start_date: "2023-01-01".to_string(),
            end_date: "2024-04-01".to_string(),
            ..PolicyForm::from_policy(&store.policies.get("POL002").await.unwrap().unwrap())
        };
        let policy = update(&store, "POL002", &form, today()).await.unwrap();
        assert_eq!(policy.status, PolicyStatus::Expired);
        assert_eq!(
            store.policies.get("POL002").await.unwrap().unwrap().status,
            PolicyStatus::Expired
        );
    }

    #[tokio::test]
    async fn test_update_unknown_policy_is_not_found() {
        let store = store();
        let err = update(&store, "POL404", &valid_form(), today()).await.unwrap_err();
        assert!(matches!(
            err,
            PolicyWriteError::Repository(RepositoryError::NotFound { .. })
        ));
    }
}
