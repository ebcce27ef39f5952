//! PostgreSQL-backed [`CredentialStore`].

use async_trait::async_trait;
use gatehouse_core::session::Principal;

use crate::models::session::{CreateSession, Session};
use crate::models::user::{CreateUser, User};
use crate::repositories::{SessionRepo, UserRepo};
use crate::store::{CredentialStore, StoreError, StoreResult};
use crate::DbPool;

/// PostgreSQL unique constraint violation.
const UNIQUE_VIOLATION: &str = "23505";
/// PostgreSQL foreign key violation, e.g. a session for a user that does not exist.
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// [`CredentialStore`] over a shared sqlx connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Turn constraint violations into [`StoreError::Conflict`]; pass everything else through.
fn classify(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().is_some_and(|code| is_conflict_code(&code)) {
            let constraint = db_err.constraint().unwrap_or("unknown").to_string();
            return StoreError::Conflict(format!("write violates {constraint}"));
        }
    }
    StoreError::Database(err)
}

fn is_conflict_code(code: &str) -> bool {
    matches!(code, UNIQUE_VIOLATION | FOREIGN_KEY_VIOLATION)
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        crate::health_check(&self.pool).await.map_err(classify)
    }

    async fn find_user(&self, user_id: &str) -> StoreResult<Option<User>> {
        UserRepo::find_by_id(&self.pool, user_id)
            .await
            .map_err(classify)
    }

    async fn create_user(&self, input: &CreateUser) -> StoreResult<User> {
        UserRepo::create(&self.pool, input).await.map_err(classify)
    }

    async fn update_password(&self, user_id: &str, password_hash: &str) -> StoreResult<bool> {
        UserRepo::update_password(&self.pool, user_id, password_hash)
            .await
            .map_err(classify)
    }

    async fn set_admin(&self, user_id: &str, is_admin: bool) -> StoreResult<Option<User>> {
        UserRepo::set_admin(&self.pool, user_id, is_admin)
            .await
            .map_err(classify)
    }

    async fn create_session(&self, input: &CreateSession) -> StoreResult<Session> {
        SessionRepo::create(&self.pool, input)
            .await
            .map_err(classify)
    }

    async fn find_active_session(&self, session_id: &str) -> StoreResult<Option<Session>> {
        SessionRepo::find_active(&self.pool, session_id)
            .await
            .map_err(classify)
    }

    async fn find_principal(&self, session_id: &str) -> StoreResult<Option<Principal>> {
        SessionRepo::find_principal(&self.pool, session_id)
            .await
            .map_err(classify)
    }

    async fn delete_expired_sessions(&self) -> StoreResult<u64> {
        SessionRepo::delete_expired(&self.pool)
            .await
            .map_err(classify)
    }
}
