//! Route definitions for login and session verification.

use axum::routing::get;
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Public authentication routes.
///
/// ```text
/// GET  /login        -> login_page
/// POST /login        -> login
/// GET  /api/verify   -> verify
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/api/verify", get(auth::verify))
}
