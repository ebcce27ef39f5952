//! HTTP-level tests for login, session verification and the admin gate.

mod common;

use axum::http::header::LOCATION;
use axum::http::StatusCode;
use common::{
    body_bytes, body_json, build_test_app, build_test_app_with, get, login, post_form, post_json,
    provision, test_config,
};

const ALICE_PW: &str = "alice-password-123";
const ROOT_PW: &str = "root-password-123";

async fn app_with_users() -> common::TestApp {
    let t = build_test_app();
    provision(&t.store, "alice", ALICE_PW, false).await;
    provision(&t.store, "root", ROOT_PW, true).await;
    t
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[tokio::test]
async fn login_sets_hardened_session_cookie() {
    let t = app_with_users().await;
    let body = serde_json::json!({ "user_id": "root", "password": ROOT_PW });
    let response = post_json(&t.app, "/login", body, None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = common::set_cookie_header(&response).expect("cookie must be set");
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Secure"));
    assert!(cookie.contains("SameSite=Lax"));
    assert!(cookie.contains("Path=/"));
    assert!(cookie.contains("Max-Age=86400"));

    let json = body_json(response).await;
    assert_eq!(json["user_id"], "root");
    assert_eq!(json["is_admin"], true);
    assert!(json["expires_at"].is_string());
    assert!(json.get("token").is_none(), "token must only travel in the cookie");
}

#[tokio::test]
async fn login_then_verify_succeeds() {
    let t = app_with_users().await;
    let token = login(&t.app, "alice", ALICE_PW).await;

    let response = get(&t.app, "/api/verify", Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn login_failures_are_indistinguishable() {
    let t = app_with_users().await;

    let wrong_password = post_json(
        &t.app,
        "/login",
        serde_json::json!({ "user_id": "alice", "password": "not-the-password" }),
        None,
    )
    .await;
    let unknown_user = post_json(
        &t.app,
        "/login",
        serde_json::json!({ "user_id": "mallory", "password": "not-the-password" }),
        None,
    )
    .await;
    let empty_user = post_json(
        &t.app,
        "/login",
        serde_json::json!({ "user_id": "", "password": "" }),
        None,
    )
    .await;

    for response in [&wrong_password, &unknown_user, &empty_user] {
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(common::set_cookie_header(response).is_none());
    }

    let a = body_bytes(wrong_password).await;
    let b = body_bytes(unknown_user).await;
    let c = body_bytes(empty_user).await;
    assert_eq!(a, b);
    assert_eq!(b, c);
}

#[tokio::test]
async fn each_login_issues_a_fresh_token() {
    let t = app_with_users().await;
    let first = login(&t.app, "alice", ALICE_PW).await;
    let second = login(&t.app, "alice", ALICE_PW).await;

    assert_ne!(first, second);
    assert_eq!(get(&t.app, "/api/verify", Some(&first)).await.status(), StatusCode::OK);
    assert_eq!(get(&t.app, "/api/verify", Some(&second)).await.status(), StatusCode::OK);
}

#[tokio::test]
async fn malformed_login_bodies_get_the_generic_401() {
    let t = app_with_users().await;
    let reference = post_json(
        &t.app,
        "/login",
        serde_json::json!({ "user_id": "alice", "password": "not-the-password" }),
        None,
    )
    .await;
    let reference = body_bytes(reference).await;

    let missing_password = post_json(
        &t.app,
        "/login",
        serde_json::json!({ "user_id": "root" }),
        None,
    )
    .await;
    let form_missing_password = post_form(&t.app, "/login", "user_id=root").await;

    for response in [missing_password, form_missing_password] {
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(common::set_cookie_header(&response).is_none());
        assert_eq!(body_bytes(response).await, reference);
    }
}

#[tokio::test]
async fn following_the_admin_redirect_reaches_the_login_form() {
    let t = app_with_users().await;

    let response = get(&t.app, "/admin", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = response.headers()[LOCATION].to_str().unwrap().to_string();

    let response = get(&t.app, &location, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(html.contains("<form"));
    assert!(html.contains(r#"action="/login""#));
    assert!(html.contains("Gatehouse Test"));
    assert!(html.contains(r#"data-theme="dark""#));
}

#[tokio::test]
async fn form_login_issues_a_session() {
    let t = app_with_users().await;
    let response = post_form(
        &t.app,
        "/login",
        &format!("user_id=root&password={ROOT_PW}"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let token = common::session_token(&response).expect("form login must set the cookie");
    assert_eq!(body_json(response).await["user_id"], "root");
    assert_eq!(get(&t.app, "/admin", Some(&token)).await.status(), StatusCode::OK);

    let rejected = post_form(&t.app, "/login", "user_id=root&password=wrong").await;
    assert_eq!(rejected.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn form_login_redirects_to_configured_target() {
    let mut config = test_config();
    config.login_redirect_url = Some("/admin".to_string());
    let t = build_test_app_with(config);
    provision(&t.store, "root", ROOT_PW, true).await;

    let response = post_form(
        &t.app,
        "/login",
        &format!("user_id=root&password={ROOT_PW}"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[LOCATION], "/admin");
    let token = common::session_token(&response).expect("redirect must still set the cookie");
    assert_eq!(get(&t.app, "/admin", Some(&token)).await.status(), StatusCode::OK);

    // JSON clients keep getting the login response body.
    let body = serde_json::json!({ "user_id": "root", "password": ROOT_PW });
    let response = post_json(&t.app, "/login", body, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["is_admin"], true);
}

#[tokio::test]
async fn login_with_store_down_is_a_server_error() {
    let t = app_with_users().await;
    t.store.set_unavailable(true);

    let response = post_json(
        &t.app,
        "/login",
        serde_json::json!({ "user_id": "alice", "password": ALICE_PW }),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["error"], "An internal error occurred");
}

// ---------------------------------------------------------------------------
// Verify
// ---------------------------------------------------------------------------

#[tokio::test]
async fn verify_rejects_missing_empty_and_unknown_cookies() {
    let t = app_with_users().await;
    assert_eq!(get(&t.app, "/api/verify", None).await.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(get(&t.app, "/api/verify", Some("")).await.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        get(&t.app, "/api/verify", Some("forged-token")).await.status(),
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn verify_respects_expiry_boundary() {
    let t = app_with_users().await;
    let token = login(&t.app, "alice", ALICE_PW).await;

    t.clock.advance(chrono::Duration::hours(24) - chrono::Duration::seconds(1));
    assert_eq!(get(&t.app, "/api/verify", Some(&token)).await.status(), StatusCode::OK);

    t.clock.advance(chrono::Duration::seconds(2));
    assert_eq!(
        get(&t.app, "/api/verify", Some(&token)).await.status(),
        StatusCode::UNAUTHORIZED
    );
}

#[tokio::test]
async fn verify_with_store_down_is_unauthorized() {
    let t = app_with_users().await;
    let token = login(&t.app, "alice", ALICE_PW).await;
    t.store.set_unavailable(true);

    assert_eq!(
        get(&t.app, "/api/verify", Some(&token)).await.status(),
        StatusCode::UNAUTHORIZED
    );
}

// ---------------------------------------------------------------------------
// Admin gate
// ---------------------------------------------------------------------------

/// root gets in, alice is forbidden, anonymous is redirected, expired is rejected.
#[tokio::test]
async fn admin_page_end_to_end_scenario() {
    let t = app_with_users().await;

    let s = login(&t.app, "root", ROOT_PW).await;
    let response = get(&t.app, "/admin", Some(&s)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(html.contains("Gatehouse Test"));
    assert!(html.contains("root"));

    let tok = login(&t.app, "alice", ALICE_PW).await;
    let response = get(&t.app, "/admin", Some(&tok)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get(&t.app, "/admin", None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[LOCATION], "/login");

    t.clock.advance(chrono::Duration::hours(25));
    assert_eq!(
        get(&t.app, "/api/verify", Some(&s)).await.status(),
        StatusCode::UNAUTHORIZED
    );
    let response = get(&t.app, "/admin", Some(&s)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn admin_page_with_unknown_token_redirects() {
    let t = app_with_users().await;
    let response = get(&t.app, "/admin", Some("forged-token")).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[LOCATION], "/login");
}

#[tokio::test]
async fn admin_page_with_store_down_is_forbidden() {
    let t = app_with_users().await;
    let s = login(&t.app, "root", ROOT_PW).await;
    t.store.set_unavailable(true);

    let response = get(&t.app, "/admin", Some(&s)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn health_reports_store_status() {
    let t = build_test_app();
    let response = get(&t.app, "/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["db_healthy"], true);

    t.store.set_unavailable(true);
    let json = body_json(get(&t.app, "/health", None).await).await;
    assert_eq!(json["db_healthy"], false);
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let t = build_test_app();
    let response = get(&t.app, "/this-route-does-not-exist", None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
