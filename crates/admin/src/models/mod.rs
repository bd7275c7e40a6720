//! Domain models for the portal.
//!
//! Records are stored normalized. Display-only joins (owner names, plates)
//! live on the `*Row` projections and are computed when a table renders.

pub mod policy;
pub mod report;
pub mod session;
pub mod toast;
pub mod user;
pub mod vehicle;

pub use policy::{Policy, PolicyRow};
pub use report::Report;
pub use session::{CurrentAdmin, PendingConfirmation, Preferences};
pub use toast::{Toast, ToastVariant};
pub use user::{SUPER_ADMIN_EMAIL, User};
pub use vehicle::{Vehicle, VehicleRow};

/// Placeholder rendered for a reference that does not resolve.
pub const NOT_AVAILABLE: &str = "N/A";
