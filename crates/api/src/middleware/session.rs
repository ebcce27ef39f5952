//! Cookie-based session token extraction and issuance.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use gatehouse_core::session::SessionToken;

use crate::config::SessionConfig;
use crate::state::AppState;

/// The session token from the request's cookie, if one is present and non-empty.
///
/// Never rejects: a missing or empty cookie is `SessionCookie(None)`, which the
/// session manager treats as an invalid session.
#[derive(Debug, Clone)]
pub struct SessionCookie(pub Option<SessionToken>);

impl FromRequestParts<AppState> for SessionCookie {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = jar
            .get(&state.config.session.cookie_name)
            .and_then(|cookie| SessionToken::parse(cookie.value()));
        Ok(SessionCookie(token))
    }
}

/// Build the `Set-Cookie` value for a newly issued session.
pub fn session_cookie(config: &SessionConfig, token: SessionToken) -> Cookie<'static> {
    Cookie::build((config.cookie_name.clone(), token.into_inner()))
        .path("/")
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(config.lifetime.num_seconds()))
        .build()
}
