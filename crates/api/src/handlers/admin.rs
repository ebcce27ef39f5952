//! Handlers behind the admin gate: the admin page and user provisioning.
//!
//! Every route here is wrapped by [`require_admin`](crate::middleware::admin::require_admin),
//! so handlers receive the caller as `Extension<Principal>`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use gatehouse_core::error::CoreError;
use gatehouse_core::session::Principal;
use gatehouse_db::models::user::{CreateUser, UserResponse};
use serde::Deserialize;

use crate::auth::password::{hash_password_blocking, validate_password_strength};
use crate::error::{AppError, AppResult};
use crate::pages::{AdminPage, HtmlTemplate};
use crate::state::AppState;

/// Longest accepted user identifier.
const MAX_USER_ID_LENGTH: usize = 128;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /api/admin/users`.
#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub user_id: String,
    pub password: String,
    #[serde(default)]
    pub is_admin: bool,
}

/// Request body for `POST /api/admin/users/{user_id}/password`.
#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub new_password: String,
}

/// Request body for `PUT /api/admin/users/{user_id}/admin`.
#[derive(Debug, Deserialize)]
pub struct SetAdminRequest {
    pub is_admin: bool,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /admin
pub async fn admin_page(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> HtmlTemplate<AdminPage> {
    HtmlTemplate(AdminPage {
        title: state.config.app_title.clone(),
        theme: state.config.ui_theme,
        user_id: principal.user_id,
    })
}

/// POST /api/admin/users
///
/// Create a user. Validates the identifier and password strength, hashes the
/// password, and returns a [`UserResponse`] with 201 Created.
pub async fn create_user(
    State(state): State<AppState>,
    Extension(admin): Extension<Principal>,
    Json(input): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    validate_user_id(&input.user_id)?;
    validate_password_strength(&input.password, state.config.min_password_length)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let password_hash = hash_password_blocking(input.password)
        .await
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = state
        .store
        .create_user(&CreateUser {
            user_id: input.user_id,
            password_hash,
            is_admin: input.is_admin,
        })
        .await?;

    tracing::info!(
        created = %user.user_id,
        is_admin = user.is_admin,
        by = %admin.user_id,
        "User provisioned"
    );

    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}

/// POST /api/admin/users/{user_id}/password
///
/// Replace a user's password. Existing sessions are left alone.
pub async fn reset_password(
    State(state): State<AppState>,
    Extension(admin): Extension<Principal>,
    Path(user_id): Path<String>,
    Json(input): Json<ResetPasswordRequest>,
) -> AppResult<StatusCode> {
    validate_password_strength(&input.new_password, state.config.min_password_length)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let password_hash = hash_password_blocking(input.new_password)
        .await
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    if !state.store.update_password(&user_id, &password_hash).await? {
        return Err(not_found(user_id));
    }

    tracing::info!(user_id = %user_id, by = %admin.user_id, "Password reset");
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/admin/users/{user_id}/admin
///
/// Grant or revoke the admin flag.
pub async fn set_admin(
    State(state): State<AppState>,
    Extension(admin): Extension<Principal>,
    Path(user_id): Path<String>,
    Json(input): Json<SetAdminRequest>,
) -> AppResult<Json<UserResponse>> {
    let user = state
        .store
        .set_admin(&user_id, input.is_admin)
        .await?
        .ok_or_else(|| not_found(user_id.clone()))?;

    tracing::info!(
        user_id = %user.user_id,
        is_admin = user.is_admin,
        by = %admin.user_id,
        "Admin flag updated"
    );
    Ok(Json(UserResponse::from(&user)))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn not_found(user_id: String) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "User",
        id: user_id,
    })
}

fn validate_user_id(user_id: &str) -> AppResult<()> {
    if user_id.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "user_id must not be empty".into(),
        )));
    }
    if user_id.chars().count() > MAX_USER_ID_LENGTH {
        return Err(AppError::Core(CoreError::Validation(format!(
            "user_id must be at most {MAX_USER_ID_LENGTH} characters"
        ))));
    }
    if user_id.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(AppError::Core(CoreError::Validation(
            "user_id must not contain whitespace or control characters".into(),
        )));
    }
    Ok(())
}
