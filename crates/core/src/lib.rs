//! Mahardika Core - Shared types library.
//!
//! This crate provides the domain types used across the Mahardika components:
//! - `admin` - Insurance agency admin portal
//! - `cli` - Fixture and browsing tools
//!
//! # Architecture
//!
//! The core crate contains only types and traits - no I/O, no storage access,
//! no HTTP clients. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, money, emails, months, document
//!   links and the closed enums (roles, tiers, policy type and status)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
