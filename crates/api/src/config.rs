use std::fmt;
use std::str::FromStr;

use gatehouse_core::duration::{parse_duration, DurationParseError};

/// Errors raised while loading [`ServerConfig`]. All of them are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} has invalid value {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("SESSION_EXPIRY is invalid: {0}")]
    SessionExpiry(#[from] DurationParseError),

    #[error("BOOTSTRAP_ADMIN_ID and BOOTSTRAP_ADMIN_PASSWORD must be set together")]
    PartialBootstrapAdmin,
}

/// Session cookie and lifetime settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Name of the cookie carrying the session token.
    pub cookie_name: String,
    /// How long a freshly issued session stays valid.
    pub lifetime: chrono::Duration,
    /// Whether the cookie is marked `Secure` (HTTPS only).
    pub cookie_secure: bool,
    /// How often the reaper deletes expired session rows.
    pub reap_interval_secs: u64,
}

/// Colour scheme the login and admin pages are rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UiTheme {
    #[default]
    Light,
    Dark,
    /// Follow the browser's `prefers-color-scheme`.
    System,
}

impl UiTheme {
    pub fn as_str(self) -> &'static str {
        match self {
            UiTheme::Light => "light",
            UiTheme::Dark => "dark",
            UiTheme::System => "system",
        }
    }
}

impl fmt::Display for UiTheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UiTheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(UiTheme::Light),
            "dark" => Ok(UiTheme::Dark),
            "system" | "auto" => Ok(UiTheme::System),
            _ => Err("expected one of light, dark, system".into()),
        }
    }
}

/// Credentials for an admin account created at startup if it does not exist.
#[derive(Clone)]
pub struct BootstrapAdmin {
    pub user_id: String,
    pub password: String,
}

impl fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("user_id", &self.user_id)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Server configuration loaded from environment variables.
///
/// Everything except `DATABASE_URL` has a default suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// PostgreSQL connection string.
    pub database_url: String,
    /// Upper bound on pooled connections (default: `20`).
    pub db_max_connections: u32,
    pub session: SessionConfig,
    /// Minimum accepted password length for provisioning (default: `12`).
    pub min_password_length: usize,
    /// Title shown on the login and admin pages and in the startup log.
    pub app_title: String,
    /// Theme for the login and admin pages (default: `light`).
    pub ui_theme: UiTheme,
    /// Where a successful form login is sent with a 303. A local path or an
    /// absolute URL on one of the `CORS_ORIGINS`. Unset means form logins
    /// answer 200 like JSON logins.
    pub login_redirect_url: Option<String>,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                      | Default                    |
    /// |------------------------------|----------------------------|
    /// | `DATABASE_URL`               | required                   |
    /// | `DB_MAX_CONNECTIONS`         | `20`                       |
    /// | `HOST`                       | `0.0.0.0`                  |
    /// | `PORT`                       | `3000`                     |
    /// | `CORS_ORIGINS`               | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`       | `30`                       |
    /// | `SESSION_COOKIE_NAME`        | `gatehouse_session`        |
    /// | `SESSION_EXPIRY`             | `24h`                      |
    /// | `SESSION_COOKIE_SECURE`      | `true`                     |
    /// | `SESSION_REAP_INTERVAL_SECS` | `3600`                     |
    /// | `MIN_PASSWORD_LENGTH`        | `12`                       |
    /// | `APP_TITLE`                  | `Gatehouse Admin`          |
    /// | `UI_THEME`                   | `light`                    |
    /// | `LOGIN_REDIRECT_URL`         | unset                      |
    /// | `BOOTSTRAP_ADMIN_ID`         | unset                      |
    /// | `BOOTSTRAP_ADMIN_PASSWORD`   | unset                      |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let host = get("HOST", "0.0.0.0");
        let port = parse_var("PORT", &get("PORT", "3000"))?;
        let db_max_connections = parse_var("DB_MAX_CONNECTIONS", &get("DB_MAX_CONNECTIONS", "20"))?;

        let cors_origins: Vec<String> = get("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs =
            parse_var("REQUEST_TIMEOUT_SECS", &get("REQUEST_TIMEOUT_SECS", "30"))?;

        let cookie_name = get("SESSION_COOKIE_NAME", "gatehouse_session");
        if cookie_name.is_empty()
            || !cookie_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(ConfigError::Invalid {
                var: "SESSION_COOKIE_NAME",
                value: cookie_name,
                reason: "expected ASCII letters, digits, '_' or '-'".into(),
            });
        }

        let lifetime = parse_duration(&get("SESSION_EXPIRY", "24h"))?;
        let cookie_secure = parse_bool("SESSION_COOKIE_SECURE", &get("SESSION_COOKIE_SECURE", "true"))?;
        let reap_interval_secs: u64 = parse_var(
            "SESSION_REAP_INTERVAL_SECS",
            &get("SESSION_REAP_INTERVAL_SECS", "3600"),
        )?;
        if reap_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "SESSION_REAP_INTERVAL_SECS",
                value: "0".into(),
                reason: "must be greater than zero".into(),
            });
        }

        let min_password_length =
            parse_var("MIN_PASSWORD_LENGTH", &get("MIN_PASSWORD_LENGTH", "12"))?;
        let app_title = get("APP_TITLE", "Gatehouse Admin");
        let ui_theme = parse_var("UI_THEME", &get("UI_THEME", "light"))?;
        let login_redirect_url = match lookup("LOGIN_REDIRECT_URL").filter(|v| !v.trim().is_empty()) {
            Some(url) => Some(validate_redirect_url(url.trim(), &cors_origins)?),
            None => None,
        };

        let bootstrap_admin = match (
            lookup("BOOTSTRAP_ADMIN_ID").filter(|v| !v.is_empty()),
            lookup("BOOTSTRAP_ADMIN_PASSWORD").filter(|v| !v.is_empty()),
        ) {
            (Some(user_id), Some(password)) => Some(BootstrapAdmin { user_id, password }),
            (None, None) => None,
            _ => return Err(ConfigError::PartialBootstrapAdmin),
        };

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            database_url,
            db_max_connections,
            session: SessionConfig {
                cookie_name,
                lifetime,
                cookie_secure,
                reap_interval_secs,
            },
            min_password_length,
            app_title,
            ui_theme,
            login_redirect_url,
            bootstrap_admin,
        })
    }
}

fn parse_var<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Accept a local absolute path (`/dashboard`) or an `http(s)` URL whose
/// origin is one of the configured CORS origins. Anything else could turn the
/// login endpoint into an open redirect.
fn validate_redirect_url(url: &str, allowed_origins: &[String]) -> Result<String, ConfigError> {
    let invalid = |reason: &str| ConfigError::Invalid {
        var: "LOGIN_REDIRECT_URL",
        value: url.to_string(),
        reason: reason.to_string(),
    };

    if url.chars().any(|c| c.is_whitespace() || c.is_control() || c == '\\') {
        return Err(invalid("must not contain whitespace, control characters or backslashes"));
    }

    if url.starts_with('/') {
        if url.starts_with("//") {
            return Err(invalid("protocol-relative URLs are not allowed"));
        }
        return Ok(url.to_string());
    }

    let Some((scheme, rest)) = url.split_once("://") else {
        return Err(invalid("expected a path starting with '/' or an absolute URL"));
    };
    if scheme != "http" && scheme != "https" {
        return Err(invalid("only http and https URLs are allowed"));
    }
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    if authority.is_empty() || authority.contains('@') {
        return Err(invalid("URL must name a host without credentials"));
    }
    let origin = format!("{scheme}://{authority}");
    if !allowed_origins.iter().any(|allowed| allowed.eq_ignore_ascii_case(&origin)) {
        return Err(invalid("origin is not listed in CORS_ORIGINS"));
    }
    Ok(url.to_string())
}

fn parse_bool(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            var,
            value: value.to_string(),
            reason: "expected a boolean".into(),
        }),
    }
}
