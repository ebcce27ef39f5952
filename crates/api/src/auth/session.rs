//! Server-side session issuance and validation.
//!
//! Tokens are random alphanumeric strings handed to the client in a cookie.
//! Only the SHA-256 digest of a token is persisted, so a database leak does
//! not expose usable sessions. Every validation is one store round trip with
//! the expiry comparison done by the store; nothing is cached here.

use std::sync::Arc;

use gatehouse_core::session::{Principal, SessionStatus, SessionToken};
use gatehouse_core::types::{Timestamp, UserId};
use gatehouse_db::models::session::CreateSession;
use gatehouse_db::{CredentialStore, StoreResult};
use rand::distr::Alphanumeric;
use rand::Rng;
use sha2::{Digest, Sha256};

/// Length of generated tokens. 48 alphanumeric characters carry ~285 bits.
const TOKEN_LENGTH: usize = 48;

/// A freshly created session, returned once to the login handler.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: SessionToken,
    pub user_id: UserId,
    pub expires_at: Timestamp,
}

/// Generate a new unguessable session token from the thread-local CSPRNG.
pub fn generate_token() -> SessionToken {
    let raw: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LENGTH)
        .map(char::from)
        .collect();
    SessionToken::from_generated(raw)
}

/// Compute the storage key for a token: its SHA-256 hex digest.
pub fn session_digest(token: &SessionToken) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_str().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Creates and validates sessions against an injected [`CredentialStore`].
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn CredentialStore>,
    lifetime: chrono::Duration,
}

impl SessionManager {
    pub fn new(store: Arc<dyn CredentialStore>, lifetime: chrono::Duration) -> Self {
        Self { store, lifetime }
    }

    /// Issue a session for an already-verified user.
    pub async fn create_session(&self, user_id: &str) -> StoreResult<IssuedSession> {
        let token = generate_token();
        let session = self
            .store
            .create_session(&CreateSession {
                session_id: session_digest(&token),
                user_id: user_id.to_string(),
                lifetime: self.lifetime,
            })
            .await?;

        tracing::debug!(user_id = %session.user_id, expires_at = %session.expires_at, "Session created");

        Ok(IssuedSession {
            token,
            user_id: session.user_id,
            expires_at: session.expires_at,
        })
    }

    /// Map a presented token to its owner.
    ///
    /// Missing, unknown and expired tokens all yield [`SessionStatus::Invalid`].
    /// Only store failures produce `Err`.
    pub async fn validate_session(
        &self,
        token: Option<&SessionToken>,
    ) -> StoreResult<SessionStatus> {
        let Some(token) = token else {
            return Ok(SessionStatus::Invalid);
        };
        Ok(
            match self.store.find_active_session(&session_digest(token)).await? {
                Some(session) => SessionStatus::Valid(session.user_id),
                None => SessionStatus::Invalid,
            },
        )
    }

    /// Resolve the owner and their admin flag with one joined lookup.
    ///
    /// `None` means the token does not name a live session.
    pub async fn resolve_principal(&self, token: &SessionToken) -> StoreResult<Option<Principal>> {
        self.store.find_principal(&session_digest(token)).await
    }
}
