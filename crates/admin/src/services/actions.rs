//! Row action dispatcher.
//!
//! Every table row carries a menu of [`RowAction`]s. Posting one of them runs
//! [`dispatch`], which checks that the record offers the action, applies it to
//! the store and reports what happened as an [`ActionOutcome`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use mahardika_core::DocumentUrl;

use crate::components::tables::Table;
use crate::db::{Repository, Store};
use crate::error::AppError;
use crate::models::{PendingConfirmation, Policy, Report, Toast, User, Vehicle};

/// An operation offered in a row's action menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowAction {
    Edit,
    ChangeRole,
    ToggleArchive,
    Delete,
    ViewDocument,
    DownloadDocument,
}

impl RowAction {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Edit => "edit",
            Self::ChangeRole => "change_role",
            Self::ToggleArchive => "toggle_archive",
            Self::Delete => "delete",
            Self::ViewDocument => "view_document",
            Self::DownloadDocument => "download_document",
        }
    }
}

impl fmt::Display for RowAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RowAction {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            Self::Edit,
            Self::ChangeRole,
            Self::ToggleArchive,
            Self::Delete,
            Self::ViewDocument,
            Self::DownloadDocument,
        ]
        .into_iter()
        .find(|a| a.as_str() == s)
        .ok_or_else(|| AppError::BadRequest(format!("unknown action: {s}")))
    }
}

/// One entry of a row's action menu.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub action: RowAction,
    pub label: String,
    /// Disabled items are shown greyed out and cannot be dispatched.
    pub enabled: bool,
    pub destructive: bool,
}

impl MenuItem {
    fn new(action: RowAction, label: &str) -> Self {
        Self {
            action,
            label: label.to_string(),
            enabled: true,
            destructive: false,
        }
    }

    const fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    const fn destructive(mut self) -> Self {
        self.destructive = true;
        self
    }
}

/// What a dispatched action did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The record was changed in place.
    Updated(Toast),
    /// The record was removed.
    Deleted(Toast),
    /// The action needs an explicit confirmation before it runs.
    ConfirmationRequired(PendingConfirmation),
    /// Continue at another URL, optionally announcing it.
    Navigate { url: String, toast: Option<Toast> },
    /// The action exists but has no implementation.
    Unsupported(Toast),
    /// The action is disabled for this record; nothing changed.
    Disabled(Toast),
    /// The record has no document to open.
    MissingDocument(Toast),
}

impl ActionOutcome {
    /// Toast to flash for this outcome.
    #[must_use]
    pub const fn toast(&self) -> Option<&Toast> {
        match self {
            Self::Updated(t)
            | Self::Deleted(t)
            | Self::Unsupported(t)
            | Self::Disabled(t)
            | Self::MissingDocument(t) => Some(t),
            Self::Navigate { toast, .. } => toast.as_ref(),
            Self::ConfirmationRequired(_) => None,
        }
    }

    /// Whether the store was mutated.
    #[must_use]
    pub const fn is_mutation(&self) -> bool {
        matches!(self, Self::Updated(_) | Self::Deleted(_))
    }
}

/// Toast for a record without a PDF.
#[must_use]
pub fn missing_pdf_toast() -> Toast {
    Toast::destructive("No PDF", "PDF document is not available for this policy.")
}

/// Document behind a policy's View PDF and Download PDF items.
///
/// # Errors
///
/// Returns [`ActionOutcome::MissingDocument`] if the policy has no PDF.
pub fn policy_document(policy: &Policy) -> Result<&DocumentUrl, ActionOutcome> {
    policy
        .pdf_url
        .as_ref()
        .ok_or_else(|| ActionOutcome::MissingDocument(missing_pdf_toast()))
}

// =============================================================================
// Menus
// =============================================================================

/// Menu for a user row in `table`.
#[must_use]
pub fn user_menu(table: Table, user: &User) -> Vec<MenuItem> {
    let (edit, change_role) = match table {
        Table::Customers => ("Edit Customer", "Change Role/Tier"),
        Table::Staff => ("Edit Staff", "Change Role"),
        _ => ("Edit Admin", "Change Role"),
    };
    vec![
        MenuItem::new(RowAction::Edit, edit),
        MenuItem::new(RowAction::ChangeRole, change_role).enabled(!user.is_super_admin()),
    ]
}

#[must_use]
pub fn vehicle_menu(vehicle: &Vehicle) -> Vec<MenuItem> {
    let archive = if vehicle.archived { "Unarchive" } else { "Archive" };
    vec![
        MenuItem::new(RowAction::Edit, "Edit Vehicle"),
        MenuItem::new(RowAction::ToggleArchive, archive),
    ]
}

#[must_use]
pub fn policy_menu(policy: &Policy) -> Vec<MenuItem> {
    vec![
        MenuItem::new(RowAction::Edit, "Edit Policy"),
        MenuItem::new(RowAction::ViewDocument, "View PDF").enabled(policy.has_document()),
        MenuItem::new(RowAction::DownloadDocument, "Download PDF").enabled(policy.has_document()),
        MenuItem::new(RowAction::Delete, "Delete Policy").destructive(),
    ]
}

#[must_use]
pub fn report_menu(_report: &Report) -> Vec<MenuItem> {
    vec![
        MenuItem::new(RowAction::ViewDocument, "View Report"),
        MenuItem::new(RowAction::DownloadDocument, "Download"),
    ]
}

/// Look `action` up in `menu`.
///
/// # Errors
///
/// Returns [`AppError::BadRequest`] if the menu does not offer the action.
fn offered(menu: &[MenuItem], action: RowAction, table: Table) -> Result<MenuItem, AppError> {
    menu.iter()
        .find(|item| item.action == action)
        .cloned()
        .ok_or_else(|| AppError::BadRequest(format!("{table} rows do not offer {action}")))
}

// =============================================================================
// Dispatch
// =============================================================================

/// Run `action` on record `id` of `table`.
///
/// Deleting requires `confirmed`; without it the outcome asks for
/// confirmation and nothing changes.
///
/// # Errors
///
/// Returns [`AppError::NotFound`] for an unknown record (or one outside the
/// table's scope) and [`AppError::BadRequest`] for an action the record's
/// menu does not offer.
#[instrument(skip(store))]
pub async fn dispatch(
    store: &Store,
    table: Table,
    id: &str,
    action: RowAction,
    confirmed: bool,
) -> Result<ActionOutcome, AppError> {
    let outcome = match table {
        Table::Customers | Table::Staff | Table::Admins => {
            dispatch_user(store, table, id, action).await?
        }
        Table::Vehicles => dispatch_vehicle(store, id, action).await?,
        Table::Policies => dispatch_policy(store, id, action, confirmed).await?,
        Table::Reports => dispatch_report(store, id, action).await?,
    };

    if outcome.is_mutation() {
        tracing::info!(%table, id, %action, "Row action applied");
    }
    Ok(outcome)
}

async fn dispatch_user(
    store: &Store,
    table: Table,
    id: &str,
    action: RowAction,
) -> Result<ActionOutcome, AppError> {
    let user = store
        .users
        .get(id)
        .await?
        .filter(|u| table.user_scope().is_none_or(|role| u.role == role))
        .ok_or_else(|| AppError::NotFound(format!("User {id}")))?;

    let item = offered(&user_menu(table, &user), action, table)?;
    if !item.enabled {
        return Ok(ActionOutcome::Disabled(Toast::destructive(
            "Change Role",
            "The super administrator's role cannot be changed.",
        )));
    }

    let toast = match (table, action) {
        (Table::Customers, RowAction::Edit) => Toast::new(
            "Edit Customer",
            format!("Edit functionality for {id} not implemented."),
        ),
        (Table::Customers, _) => Toast::new(
            "Change Role/Tier",
            format!("Role/Tier change for {id} not implemented."),
        ),
        (Table::Staff, RowAction::Edit) => Toast::new(
            "Edit Staff Member",
            format!("Edit functionality for {id} not implemented."),
        ),
        (Table::Staff, _) => Toast::new(
            "Change Role",
            format!("Role change for staff {id} not implemented."),
        ),
        (_, RowAction::Edit) => Toast::new(
            "Edit Admin User",
            format!("Edit functionality for {id} not implemented."),
        ),
        _ => Toast::new(
            "Change Role",
            format!("Role change for admin {id} not implemented."),
        ),
    };
    Ok(ActionOutcome::Unsupported(toast))
}

async fn dispatch_vehicle(
    store: &Store,
    id: &str,
    action: RowAction,
) -> Result<ActionOutcome, AppError> {
    let vehicle = store
        .vehicles
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Vehicle {id}")))?;
    offered(&vehicle_menu(&vehicle), action, Table::Vehicles)?;

    match action {
        RowAction::ToggleArchive => {
            let updated = store
                .vehicles
                .update(id, |v| v.archived = !v.archived)
                .await?;
            let (title, verb) = if updated.archived {
                ("Vehicle Archived", "archived")
            } else {
                ("Vehicle Unarchived", "unarchived")
            };
            Ok(ActionOutcome::Updated(Toast::new(
                title,
                format!("Vehicle {id} has been {verb}."),
            )))
        }
        _ => Ok(ActionOutcome::Unsupported(Toast::new(
            "Edit Vehicle",
            format!("Edit functionality for {id} not implemented."),
        ))),
    }
}

async fn dispatch_policy(
    store: &Store,
    id: &str,
    action: RowAction,
    confirmed: bool,
) -> Result<ActionOutcome, AppError> {
    let policy = store
        .policies
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Policy {id}")))?;
    let item = offered(&policy_menu(&policy), action, Table::Policies)?;
    if !item.enabled {
        return Ok(ActionOutcome::Disabled(missing_pdf_toast()));
    }

    let outcome = match action {
        RowAction::Edit => ActionOutcome::Navigate {
            url: format!("/policies/{id}/edit"),
            toast: None,
        },
        RowAction::ViewDocument => ActionOutcome::Navigate {
            url: format!("/policies/{id}/document"),
            toast: None,
        },
        RowAction::DownloadDocument => ActionOutcome::Navigate {
            url: format!("/policies/{id}/document/download"),
            toast: None,
        },
        RowAction::Delete if !confirmed => ActionOutcome::ConfirmationRequired(PendingConfirmation {
            table: Table::Policies.slug().to_string(),
            id: id.to_string(),
            action,
            prompt: format!(
                "This action cannot be undone. This will permanently delete the policy {id}."
            ),
        }),
        RowAction::Delete => {
            store.policies.delete(id).await?;
            ActionOutcome::Deleted(Toast::new(
                "Policy Deleted",
                format!("Policy {id} has been (simulated) deleted."),
            ))
        }
        RowAction::ChangeRole | RowAction::ToggleArchive => {
            return Err(AppError::BadRequest(format!("policies do not offer {action}")));
        }
    };
    Ok(outcome)
}

async fn dispatch_report(
    store: &Store,
    id: &str,
    action: RowAction,
) -> Result<ActionOutcome, AppError> {
    let report = store
        .reports
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Report {id}")))?;
    offered(&report_menu(&report), action, Table::Reports)?;

    Ok(match action {
        RowAction::DownloadDocument => ActionOutcome::Navigate {
            url: format!("/reports/{id}/document/download"),
            toast: Some(Toast::new(
                "Download Started",
                format!("Report {} should be downloading.", report.file_name()),
            )),
        },
        _ => ActionOutcome::Navigate {
            url: format!("/reports/{id}/document"),
            toast: None,
        },
    })
}
