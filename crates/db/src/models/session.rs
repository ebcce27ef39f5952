//! Session model and DTOs.

use gatehouse_core::types::{Timestamp, UserId};
use sqlx::FromRow;

/// A row from the `sessions` table.
///
/// `session_id` is the digest of the client's token, not the token itself.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub session_id: String,
    pub user_id: UserId,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
}

/// DTO for creating a session.
///
/// Expiry is computed by the store as `now + lifetime` using the store's own
/// clock.
#[derive(Debug, Clone)]
pub struct CreateSession {
    pub session_id: String,
    pub user_id: UserId,
    pub lifetime: chrono::Duration,
}
