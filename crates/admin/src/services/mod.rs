//! Business logic services for admin.
//!
//! # Services
//!
//! - `actions` - Row action menus and dispatch
//! - `browse` - Table snapshots run through the record browser
//! - `dashboard` - KPI, renewal and leaderboard figures
//! - `documents` - Policy and report PDF downloads
//! - `forms` - Per-field form error collection
//! - `notifications` - Toasts flashed through the session
//! - `policies` - Policy create and edit with referential checks
//! - `selection` - Session-held row selection
//! - `users` - Simulated user invitations

pub mod actions;
pub mod browse;
pub mod dashboard;
pub mod documents;
pub mod forms;
pub mod notifications;
pub mod policies;
pub mod selection;
pub mod users;

pub use actions::{ActionOutcome, MenuItem, RowAction, dispatch};
pub use browse::{Browsed, browse_table};
pub use dashboard::DashboardSummary;
pub use documents::{DocumentError, DocumentFetcher};
pub use forms::FormErrors;
pub use policies::{PolicyForm, PolicyWriteError};
pub use selection::SelectionChange;
pub use users::{Invitation, NewUserForm};
