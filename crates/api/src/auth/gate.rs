//! Admin-only authorization.
//!
//! [`AdminGate`] decides whether a presented session token may run an
//! administrative operation. It is independent of HTTP: the axum middleware in
//! [`crate::middleware::admin`] and [`AdminGate::guard`] are two thin
//! adapters over [`AdminGate::check`].

use std::future::Future;

use gatehouse_core::session::{Principal, SessionToken};

use super::session::SessionManager;

/// Why the gate refused to run an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateRejection {
    /// No live session. The client should be sent to the login page.
    Unauthenticated,
    /// A live session whose user lacks the admin flag, or the privilege
    /// lookup itself failed.
    Forbidden,
}

/// Requires a live session belonging to an admin user.
#[derive(Clone)]
pub struct AdminGate {
    sessions: SessionManager,
}

impl AdminGate {
    pub fn new(sessions: SessionManager) -> Self {
        Self { sessions }
    }

    /// Resolve the token to an admin [`Principal`] using one joined lookup.
    pub async fn check(&self, token: Option<&SessionToken>) -> Result<Principal, GateRejection> {
        let Some(token) = token else {
            return Err(GateRejection::Unauthenticated);
        };

        match self.sessions.resolve_principal(token).await {
            Ok(Some(principal)) if principal.is_admin => Ok(principal),
            Ok(Some(principal)) => {
                tracing::info!(user_id = %principal.user_id, "Admin access denied: not an admin");
                Err(GateRejection::Forbidden)
            }
            Ok(None) => Err(GateRejection::Unauthenticated),
            Err(e) => {
                tracing::error!(error = %e, "Admin access denied: privilege lookup failed");
                Err(GateRejection::Forbidden)
            }
        }
    }

    /// Run `op` only if the token belongs to an admin, passing its output
    /// through untouched.
    pub async fn guard<F, Fut, T>(
        &self,
        token: Option<&SessionToken>,
        op: F,
    ) -> Result<T, GateRejection>
    where
        F: FnOnce(Principal) -> Fut,
        Fut: Future<Output = T>,
    {
        let principal = self.check(token).await?;
        Ok(op(principal).await)
    }
}
