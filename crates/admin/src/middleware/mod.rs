//! HTTP middleware for admin.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors, outermost)
//! 2. `TraceLayer` (request tracing with status and latency)
//! 3. Session layer (tower-sessions with an in-memory store)
//! 4. Auth extractors on protected handlers

pub mod auth;
pub mod session;

pub use auth::{
    OptionalAdminAuth, RequireAdminAuth, clear_current_admin, set_current_admin,
};
pub use session::{SESSION_COOKIE_NAME, create_session_layer};
