#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use chrono::Utc;
use gatehouse_api::auth::password::hash_password;
use gatehouse_api::config::{ServerConfig, SessionConfig, UiTheme};
use gatehouse_api::routes;
use gatehouse_api::state::AppState;
use gatehouse_core::clock::ManualClock;
use gatehouse_db::models::user::CreateUser;
use gatehouse_db::{CredentialStore, MemoryStore};
use http_body_util::BodyExt;
use tower::ServiceExt;

pub const COOKIE_NAME: &str = "gatehouse_session";

/// Build a test `ServerConfig` with safe defaults and a 24h session lifetime.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        database_url: "postgres://unused".to_string(),
        db_max_connections: 1,
        session: SessionConfig {
            cookie_name: COOKIE_NAME.to_string(),
            lifetime: chrono::Duration::hours(24),
            cookie_secure: true,
            reap_interval_secs: 3600,
        },
        min_password_length: 12,
        app_title: "Gatehouse Test".to_string(),
        ui_theme: UiTheme::Dark,
        login_redirect_url: None,
        bootstrap_admin: None,
    }
}

/// The application under test plus handles to its store and clock.
pub struct TestApp {
    pub app: Router,
    pub store: Arc<MemoryStore>,
    pub clock: Arc<ManualClock>,
}

/// Build the full router (same middleware stack as production) over an
/// in-memory store driven by a manual clock.
pub fn build_test_app() -> TestApp {
    build_test_app_with(test_config())
}

/// Create a user directly in the store.
pub async fn provision(store: &MemoryStore, user_id: &str, password: &str, is_admin: bool) {
    store
        .create_user(&CreateUser {
            user_id: user_id.to_string(),
            password_hash: hash_password(password).expect("hashing should succeed"),
            is_admin,
        })
        .await
        .expect("user creation should succeed");
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str, cookie: Option<&str>) -> Response {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(token) = cookie {
        builder = builder.header(COOKIE, format!("{COOKIE_NAME}={token}"));
    }
    send(app, builder.body(Body::empty()).unwrap()).await
}

pub async fn send_json(
    app: &Router,
    method: Method,
    uri: &str,
    body: serde_json::Value,
    cookie: Option<&str>,
) -> Response {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(token) = cookie {
        builder = builder.header(COOKIE, format!("{COOKIE_NAME}={token}"));
    }
    send(app, builder.body(Body::from(body.to_string())).unwrap()).await
}

pub async fn post_json(
    app: &Router,
    uri: &str,
    body: serde_json::Value,
    cookie: Option<&str>,
) -> Response {
    send_json(app, Method::POST, uri, body, cookie).await
}

/// POST a urlencoded body the way a browser form submission does.
pub async fn post_form(app: &Router, uri: &str, body: &str) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

/// Build an app from a customised config over a fresh in-memory store.
pub fn build_test_app_with(config: ServerConfig) -> TestApp {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let store = Arc::new(MemoryStore::new(clock.clone()));
    let state = AppState::new(store.clone(), config);
    TestApp {
        app: routes::build_app(state),
        store,
        clock,
    }
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// The raw `Set-Cookie` header for the session cookie, if any.
pub fn set_cookie_header(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(&format!("{COOKIE_NAME}=")))
        .map(str::to_string)
}

/// The session token value from a login response's `Set-Cookie` header.
pub fn session_token(response: &Response) -> Option<String> {
    let header = set_cookie_header(response)?;
    let pair = header.split(';').next()?;
    pair.strip_prefix(&format!("{COOKIE_NAME}="))
        .map(str::to_string)
}

/// Log in through the API and return the session token.
pub async fn login(app: &Router, user_id: &str, password: &str) -> String {
    let body = serde_json::json!({ "user_id": user_id, "password": password });
    let response = post_json(app, "/login", body, None).await;
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    session_token(&response).expect("login must set the session cookie")
}
