//! The [`CredentialStore`] seam between session logic and persistence.
//!
//! Implementations only move data; they hold no authentication policy. All
//! expiry comparisons use the store's own notion of "now".

use async_trait::async_trait;
use gatehouse_core::session::Principal;

use crate::models::session::{CreateSession, Session};
use crate::models::user::{CreateUser, User};

/// Infrastructure failure while talking to the store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A uniqueness constraint rejected the write.
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence operations for users and sessions.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Cheap connectivity probe.
    async fn ping(&self) -> StoreResult<()>;

    async fn find_user(&self, user_id: &str) -> StoreResult<Option<User>>;

    /// Fails with [`StoreError::Conflict`] if the identifier is taken.
    async fn create_user(&self, input: &CreateUser) -> StoreResult<User>;

    /// Returns `false` if the user does not exist.
    async fn update_password(&self, user_id: &str, password_hash: &str) -> StoreResult<bool>;

    /// Returns `None` if the user does not exist.
    async fn set_admin(&self, user_id: &str, is_admin: bool) -> StoreResult<Option<User>>;

    async fn create_session(&self, input: &CreateSession) -> StoreResult<Session>;

    /// Returns the session only if it exists and has not expired.
    async fn find_active_session(&self, session_id: &str) -> StoreResult<Option<Session>>;

    /// Joined session -> user lookup for an unexpired session.
    async fn find_principal(&self, session_id: &str) -> StoreResult<Option<Principal>>;

    /// Physically remove expired sessions. Returns the number removed.
    async fn delete_expired_sessions(&self) -> StoreResult<u64>;
}
