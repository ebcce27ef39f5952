//! In-process [`CredentialStore`] used by tests and local experiments.
//!
//! Mirrors the PostgreSQL semantics: a session is active iff
//! `clock.now() < expires_at`, unique identifiers are enforced and sessions
//! must reference an existing user. Expiry is judged by the injected
//! [`Clock`], which plays the role of the database's `NOW()`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use gatehouse_core::clock::{Clock, SystemClock};
use gatehouse_core::session::Principal;
use tokio::sync::RwLock;

use crate::models::session::{CreateSession, Session};
use crate::models::user::{CreateUser, User};
use crate::store::{CredentialStore, StoreError, StoreResult};

#[derive(Default)]
struct Tables {
    users: HashMap<String, User>,
    sessions: HashMap<String, Session>,
}

/// Thread-safe in-memory store. Wrap in `Arc` to share.
pub struct MemoryStore {
    tables: RwLock<Tables>,
    clock: Arc<dyn Clock>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            clock,
            unavailable: AtomicBool::new(false),
        }
    }

    /// Simulate an unreachable backend: every operation fails with
    /// [`StoreError::Unavailable`] until switched back.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of session rows physically present, expired or not.
    pub async fn session_count(&self) -> usize {
        self.tables.read().await.sessions.len()
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("memory store marked unavailable".into()))
        } else {
            Ok(())
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        self.check_available()
    }

    async fn find_user(&self, user_id: &str) -> StoreResult<Option<User>> {
        self.check_available()?;
        Ok(self.tables.read().await.users.get(user_id).cloned())
    }

    async fn create_user(&self, input: &CreateUser) -> StoreResult<User> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        if tables.users.contains_key(&input.user_id) {
            return Err(StoreError::Conflict("duplicate value violates users_pkey".into()));
        }
        let now = self.clock.now();
        let user = User {
            user_id: input.user_id.clone(),
            password_hash: input.password_hash.clone(),
            is_admin: input.is_admin,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(user.user_id.clone(), user.clone());
        Ok(user)
    }

    async fn update_password(&self, user_id: &str, password_hash: &str) -> StoreResult<bool> {
        self.check_available()?;
        let now = self.clock.now();
        let mut tables = self.tables.write().await;
        Ok(match tables.users.get_mut(user_id) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                user.updated_at = now;
                true
            }
            None => false,
        })
    }

    async fn set_admin(&self, user_id: &str, is_admin: bool) -> StoreResult<Option<User>> {
        self.check_available()?;
        let now = self.clock.now();
        let mut tables = self.tables.write().await;
        Ok(tables.users.get_mut(user_id).map(|user| {
            user.is_admin = is_admin;
            user.updated_at = now;
            user.clone()
        }))
    }

    async fn create_session(&self, input: &CreateSession) -> StoreResult<Session> {
        self.check_available()?;
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&input.user_id) {
            return Err(StoreError::Conflict(format!(
                "session references unknown user {}",
                input.user_id
            )));
        }
        if tables.sessions.contains_key(&input.session_id) {
            return Err(StoreError::Conflict("duplicate value violates sessions_pkey".into()));
        }
        let now = self.clock.now();
        let session = Session {
            session_id: input.session_id.clone(),
            user_id: input.user_id.clone(),
            expires_at: now + input.lifetime,
            created_at: now,
        };
        tables
            .sessions
            .insert(session.session_id.clone(), session.clone());
        Ok(session)
    }

    async fn find_active_session(&self, session_id: &str) -> StoreResult<Option<Session>> {
        self.check_available()?;
        let now = self.clock.now();
        Ok(self
            .tables
            .read()
            .await
            .sessions
            .get(session_id)
            .filter(|s| now < s.expires_at)
            .cloned())
    }

    async fn find_principal(&self, session_id: &str) -> StoreResult<Option<Principal>> {
        self.check_available()?;
        let now = self.clock.now();
        let tables = self.tables.read().await;
        Ok(tables
            .sessions
            .get(session_id)
            .filter(|s| now < s.expires_at)
            .and_then(|s| tables.users.get(&s.user_id))
            .map(|u| Principal {
                user_id: u.user_id.clone(),
                is_admin: u.is_admin,
            }))
    }

    async fn delete_expired_sessions(&self) -> StoreResult<u64> {
        self.check_available()?;
        let now = self.clock.now();
        let mut tables = self.tables.write().await;
        let before = tables.sessions.len();
        tables.sessions.retain(|_, s| now < s.expires_at);
        Ok((before - tables.sessions.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{Duration, Utc};
    use gatehouse_core::clock::ManualClock;

    use super::*;

    fn user(id: &str, is_admin: bool) -> CreateUser {
        CreateUser {
            user_id: id.to_string(),
            password_hash: "$argon2id$placeholder".to_string(),
            is_admin,
        }
    }

    fn session(id: &str, user_id: &str, lifetime: Duration) -> CreateSession {
        CreateSession {
            session_id: id.to_string(),
            user_id: user_id.to_string(),
            lifetime,
        }
    }

    #[tokio::test]
    async fn duplicate_user_is_a_conflict() {
        let store = MemoryStore::default();
        store.create_user(&user("alice", false)).await.unwrap();
        let err = store.create_user(&user("alice", true)).await.unwrap_err();
        assert_matches!(err, StoreError::Conflict(_));
    }

    #[tokio::test]
    async fn session_requires_existing_user() {
        let store = MemoryStore::default();
        let err = store
            .create_session(&session("s1", "ghost", Duration::hours(1)))
            .await
            .unwrap_err();
        assert_matches!(err, StoreError::Conflict(_));
    }

    #[tokio::test]
    async fn expiry_is_judged_by_the_store_clock() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let store = MemoryStore::new(clock.clone());
        store.create_user(&user("root", true)).await.unwrap();
        store
            .create_session(&session("s1", "root", Duration::seconds(60)))
            .await
            .unwrap();

        clock.advance(Duration::seconds(59));
        assert!(store.find_active_session("s1").await.unwrap().is_some());
        assert_eq!(
            store.find_principal("s1").await.unwrap(),
            Some(Principal {
                user_id: "root".into(),
                is_admin: true
            })
        );

        // Exactly at expiry the session is no longer valid.
        clock.advance(Duration::seconds(1));
        assert!(store.find_active_session("s1").await.unwrap().is_none());
        assert!(store.find_principal("s1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_expired_keeps_live_sessions() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let store = MemoryStore::new(clock.clone());
        store.create_user(&user("alice", false)).await.unwrap();
        store
            .create_session(&session("short", "alice", Duration::minutes(1)))
            .await
            .unwrap();
        store
            .create_session(&session("long", "alice", Duration::hours(1)))
            .await
            .unwrap();

        clock.advance(Duration::minutes(5));
        assert_eq!(store.delete_expired_sessions().await.unwrap(), 1);
        assert_eq!(store.session_count().await, 1);
        assert!(store.find_active_session("long").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn unavailable_store_fails_every_call() {
        let store = MemoryStore::default();
        store.set_unavailable(true);
        assert_matches!(store.ping().await, Err(StoreError::Unavailable(_)));
        assert_matches!(store.find_user("alice").await, Err(StoreError::Unavailable(_)));
        store.set_unavailable(false);
        assert!(store.ping().await.is_ok());
    }
}
