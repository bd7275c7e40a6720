//! Core types for Mahardika.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod document;
pub mod email;
pub mod id;
pub mod money;
pub mod month;
pub mod status;

pub use document::{DocumentUrl, DocumentUrlError};
pub use email::{Email, EmailError};
pub use id::*;
pub use money::{Money, MoneyError, group_thousands};
pub use month::{YearMonth, YearMonthError};
pub use status::*;
