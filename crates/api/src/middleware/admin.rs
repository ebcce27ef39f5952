//! Axum adapter for [`AdminGate`](crate::auth::gate::AdminGate).
//!
//! Layer it onto any router with
//! `axum::middleware::from_fn_with_state(state, require_admin)`. On success the
//! resolved [`Principal`](gatehouse_core::session::Principal) is placed in the
//! request extensions for handlers to read via `Extension<Principal>`.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};

use super::session::SessionCookie;
use crate::auth::gate::GateRejection;
use crate::error::AppError;
use crate::state::AppState;

/// Where unauthenticated clients are sent.
pub const LOGIN_PATH: &str = "/login";

/// Redirect anonymous clients to the login page (303), reject non-admins
/// (403), and pass admins through to the wrapped handler unchanged.
pub async fn require_admin(
    State(state): State<AppState>,
    SessionCookie(token): SessionCookie,
    mut request: Request,
    next: Next,
) -> Response {
    match state.gate.check(token.as_ref()).await {
        Ok(principal) => {
            request.extensions_mut().insert(principal);
            next.run(request).await
        }
        Err(GateRejection::Unauthenticated) => Redirect::to(LOGIN_PATH).into_response(),
        Err(GateRejection::Forbidden) => AppError::forbidden().into_response(),
    }
}
