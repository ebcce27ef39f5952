//! Request-level session plumbing.
//!
//! - [`session::SessionCookie`] -- Extracts the session token from the configured cookie.
//! - [`admin::require_admin`] -- Middleware gating a route tree behind [`crate::auth::gate::AdminGate`].

pub mod admin;
pub mod session;
