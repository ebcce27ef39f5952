//! Session vocabulary shared by the store and HTTP layers.

use std::fmt;

use serde::Serialize;

use crate::types::UserId;

/// An opaque bearer token as presented by a client cookie.
///
/// The `Debug` impl is redacted so the token cannot leak through
/// `tracing` fields or panic messages.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wrap a raw cookie value. Empty or whitespace-only values are not tokens.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            None
        } else {
            Some(Self(raw.to_string()))
        }
    }

    /// Wrap a token produced by a random generator, which never yields an
    /// empty string.
    pub fn from_generated(raw: String) -> Self {
        debug_assert!(!raw.is_empty());
        Self(raw)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(..)")
    }
}

/// Outcome of validating a session token.
///
/// Unknown, expired and malformed tokens are deliberately indistinguishable.
/// Infrastructure failures are reported separately by the caller's `Result`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    Valid(UserId),
    Invalid,
}

impl SessionStatus {
    pub fn is_valid(&self) -> bool {
        matches!(self, SessionStatus::Valid(_))
    }
}

/// The identity and privilege resolved from a valid session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub user_id: UserId,
    pub is_admin: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_cookie_values_are_not_tokens() {
        assert!(SessionToken::parse("").is_none());
        assert!(SessionToken::parse("   ").is_none());
        assert_eq!(SessionToken::parse(" abc ").unwrap().as_str(), "abc");
    }

    #[test]
    fn debug_output_is_redacted() {
        let token = SessionToken::parse("super-secret-value").unwrap();
        let rendered = format!("{token:?}");
        assert!(!rendered.contains("super-secret-value"));
    }
}
