//! Gatehouse API server library.
//!
//! Exposes the building blocks (config, state, session management, the admin
//! gate, routes, background jobs) so integration tests and the binary
//! entrypoint can both access them.

pub mod auth;
pub mod background;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod pages;
pub mod provision;
pub mod routes;
pub mod state;
