//! Server-rendered HTML pages (askama templates under `templates/`).
//!
//! Askama escapes every interpolated value, so user identifiers and the
//! configured title are safe to render as-is.

use askama::Template;
use axum::response::{Html, IntoResponse, Response};

use crate::config::UiTheme;
use crate::error::AppError;

/// The sign-in form served at `GET /login`.
#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage {
    pub title: String,
    pub theme: UiTheme,
}

/// The admin landing page served at `GET /admin`.
#[derive(Template)]
#[template(path = "admin.html")]
pub struct AdminPage {
    pub title: String,
    pub theme: UiTheme,
    pub user_id: String,
}

/// Renders any askama template as an HTML response.
pub struct HtmlTemplate<T>(pub T);

impl<T: Template> IntoResponse for HtmlTemplate<T> {
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => {
                AppError::InternalError(format!("Failed to render template: {err}")).into_response()
            }
        }
    }
}
