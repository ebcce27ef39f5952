//! Route definitions for the admin area. Everything here sits behind
//! [`require_admin`].

use axum::middleware::from_fn_with_state;
use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::admin;
use crate::middleware::admin::require_admin;
use crate::state::AppState;

/// Admin-only routes.
///
/// ```text
/// GET  /admin                                  -> admin_page
/// POST /api/admin/users                        -> create_user
/// POST /api/admin/users/{user_id}/password     -> reset_password
/// PUT  /api/admin/users/{user_id}/admin        -> set_admin
/// ```
pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/admin", get(admin::admin_page))
        .route("/api/admin/users", post(admin::create_user))
        .route(
            "/api/admin/users/{user_id}/password",
            post(admin::reset_password),
        )
        .route("/api/admin/users/{user_id}/admin", put(admin::set_admin))
        .route_layer(from_fn_with_state(state, require_admin))
}
