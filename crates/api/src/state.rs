use std::sync::Arc;

use gatehouse_db::CredentialStore;

use crate::auth::gate::AdminGate;
use crate::auth::session::SessionManager;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`). Nothing here is
/// mutable; per-request state lives in the request.
#[derive(Clone)]
pub struct AppState {
    /// Credential store (PostgreSQL in production, in-memory in tests).
    pub store: Arc<dyn CredentialStore>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Session issuance and validation.
    pub sessions: SessionManager,
    /// Admin-only authorization.
    pub gate: AdminGate,
}

impl AppState {
    /// Wire the session manager and gate to the given store and configuration.
    pub fn new(store: Arc<dyn CredentialStore>, config: ServerConfig) -> Self {
        let sessions = SessionManager::new(Arc::clone(&store), config.session.lifetime);
        let gate = AdminGate::new(sessions.clone());
        Self {
            store,
            config: Arc::new(config),
            sessions,
            gate,
        }
    }
}
