//! Authentication and authorization primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`session`] -- Session token issuance and validation.
//! - [`gate`] -- Admin-only authorization around arbitrary operations.

pub mod gate;
pub mod password;
pub mod session;
