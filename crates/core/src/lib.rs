//! Domain types shared by the store and HTTP layers.
//!
//! Nothing in this crate touches the network or the database.

pub mod clock;
pub mod duration;
pub mod error;
pub mod session;
pub mod types;
