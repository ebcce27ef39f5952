//! Handlers for login and session verification.

use axum::extract::{FromRequest, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::{Form, Json};
use axum_extra::extract::CookieJar;
use gatehouse_core::session::SessionStatus;
use gatehouse_core::types::{Timestamp, UserId};
use serde::{Deserialize, Serialize};

use crate::auth::password::verify_password_blocking;
use crate::error::{AppError, AppResult};
use crate::middleware::session::{session_cookie, SessionCookie};
use crate::pages::{HtmlTemplate, LoginPage};
use crate::state::AppState;

/// How much of a rejected identifier is written to the debug log.
const LOGGED_USER_ID_CHARS: usize = 32;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Credentials for `POST /login`, as JSON or as a urlencoded form.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub user_id: String,
    pub password: String,
}

/// Successful login response. The token itself travels only in the cookie.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_id: UserId,
    pub is_admin: bool,
    pub expires_at: Timestamp,
}

/// A login body plus whether it came from an HTML form.
///
/// A body that cannot be read as either encoding is rejected with the same
/// generic 401 as a wrong password.
pub struct LoginSubmission {
    pub credentials: LoginRequest,
    pub from_form: bool,
}

impl<S> FromRequest<S> for LoginSubmission
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let from_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));

        let parsed = if from_form {
            Form::<LoginRequest>::from_request(req, state)
                .await
                .map(|Form(credentials)| credentials)
                .map_err(|rejection| rejection.body_text())
        } else {
            Json::<LoginRequest>::from_request(req, state)
                .await
                .map(|Json(credentials)| credentials)
                .map_err(|rejection| rejection.body_text())
        };

        match parsed {
            Ok(credentials) => Ok(LoginSubmission {
                credentials,
                from_form,
            }),
            Err(reason) => {
                tracing::debug!(%reason, "Login rejected: unreadable body");
                Err(AppError::unauthorized())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /login
///
/// The sign-in form unauthenticated admin requests are redirected to.
pub async fn login_page(State(state): State<AppState>) -> HtmlTemplate<LoginPage> {
    HtmlTemplate(LoginPage {
        title: state.config.app_title.clone(),
        theme: state.config.ui_theme,
    })
}

/// POST /login
///
/// Verify the credential and issue a session cookie. Every failure, whether
/// unknown user, wrong password or unreadable body, produces the same 401.
/// A form login is answered with a 303 to `LOGIN_REDIRECT_URL` when one is
/// configured; otherwise the response is the JSON [`LoginResponse`].
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    submission: LoginSubmission,
) -> AppResult<Response> {
    let LoginSubmission {
        credentials: input,
        from_form,
    } = submission;

    let user = if input.user_id.is_empty() {
        None
    } else {
        state.store.find_user(&input.user_id).await?
    };

    // Unknown users still pay for a verification against a dummy hash.
    let stored_hash = user.as_ref().map(|u| u.password_hash.clone());
    let verified = verify_password_blocking(input.password, stored_hash)
        .await
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    let user = match user {
        Some(user) if verified => user,
        _ => {
            tracing::debug!(
                user_id = %truncate_for_log(&input.user_id),
                "Login rejected"
            );
            return Err(AppError::unauthorized());
        }
    };

    let issued = state.sessions.create_session(&user.user_id).await?;
    tracing::info!(user_id = %user.user_id, "Login succeeded");

    let jar = jar.add(session_cookie(&state.config.session, issued.token));

    if from_form {
        if let Some(target) = &state.config.login_redirect_url {
            return Ok((jar, Redirect::to(target)).into_response());
        }
    }

    let response = LoginResponse {
        user_id: issued.user_id,
        is_admin: user.is_admin,
        expires_at: issued.expires_at,
    };
    Ok((jar, Json(response)).into_response())
}

/// GET /api/verify
///
/// 200 if the session cookie names a live session, 401 otherwise. Store
/// failures also answer 401 but are logged as infrastructure errors.
pub async fn verify(
    State(state): State<AppState>,
    SessionCookie(token): SessionCookie,
) -> StatusCode {
    match state.sessions.validate_session(token.as_ref()).await {
        Ok(SessionStatus::Valid(_)) => StatusCode::OK,
        Ok(SessionStatus::Invalid) => StatusCode::UNAUTHORIZED,
        Err(e) => {
            tracing::error!(error = %e, "Session verification failed: store error");
            StatusCode::UNAUTHORIZED
        }
    }
}

fn truncate_for_log(user_id: &str) -> String {
    if user_id.chars().count() <= LOGGED_USER_ID_CHARS {
        user_id.to_string()
    } else {
        let head: String = user_id.chars().take(LOGGED_USER_ID_CHARS).collect();
        format!("{head}...")
    }
}
