//! Repository layer: one zero-sized struct per table with associated async fns.

mod session_repo;
mod user_repo;

pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
