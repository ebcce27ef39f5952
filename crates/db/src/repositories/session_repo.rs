//! Repository for the `sessions` table.
//!
//! Every expiry comparison uses the database's `NOW()` so the application
//! clock never participates in validity decisions.

use gatehouse_core::session::Principal;
use gatehouse_core::types::UserId;
use sqlx::{FromRow, PgPool};

use crate::models::session::{CreateSession, Session};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "session_id, user_id, expires_at, created_at";

#[derive(FromRow)]
struct PrincipalRow {
    user_id: UserId,
    is_admin: bool,
}

/// Provides create/lookup/cleanup operations for sessions.
pub struct SessionRepo;

impl SessionRepo {
    /// Insert a new session expiring `lifetime` after the database's current time.
    pub async fn create(pool: &PgPool, input: &CreateSession) -> Result<Session, sqlx::Error> {
        let query = format!(
            "INSERT INTO sessions (session_id, user_id, expires_at)
             VALUES ($1, $2, NOW() + make_interval(secs => $3))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(&input.session_id)
            .bind(&input.user_id)
            .bind(input.lifetime.num_seconds() as f64)
            .fetch_one(pool)
            .await
    }

    /// Find an unexpired session by id.
    pub async fn find_active(
        pool: &PgPool,
        session_id: &str,
    ) -> Result<Option<Session>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sessions
             WHERE session_id = $1
               AND expires_at > NOW()"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(session_id)
            .fetch_optional(pool)
            .await
    }

    /// Resolve the owning user and their admin flag for an unexpired session
    /// in a single joined query.
    pub async fn find_principal(
        pool: &PgPool,
        session_id: &str,
    ) -> Result<Option<Principal>, sqlx::Error> {
        let row = sqlx::query_as::<_, PrincipalRow>(
            "SELECT u.user_id, u.is_admin
             FROM users u
             JOIN sessions s ON u.user_id = s.user_id
             WHERE s.session_id = $1
               AND s.expires_at > NOW()",
        )
        .bind(session_id)
        .fetch_optional(pool)
        .await?;
        Ok(row.map(|r| Principal {
            user_id: r.user_id,
            is_admin: r.is_admin,
        }))
    }

    /// Delete expired sessions. Returns the count of deleted rows.
    pub async fn delete_expired(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= NOW()")
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
