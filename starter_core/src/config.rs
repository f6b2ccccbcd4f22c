//! Environment driven configuration for the starter
//!
//! Everything the server needs is read once at startup into [`AppConfig`] and
//! passed down explicitly; nothing in this crate reads the environment while
//! serving requests.

use std::env;
use std::path::PathBuf;

/// Origins allowed when `CORS_ALLOWED_ORIGINS` is unset or empty.
pub const DEFAULT_CORS_ALLOWED_ORIGINS: [&str; 2] = ["https://*", "http://*"];

/// Load `.env` from the working directory into the process environment.
///
/// A missing or unreadable file is not an error: the variables already present
/// in the process environment are used as-is. Returns the path that was
/// loaded, if any. Variables already set in the process take precedence.
pub fn load_env() -> Option<PathBuf> {
    dotenvy::dotenv().ok()
}

/// Settings consumed by the auth initializer.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
    pub cookie_store_key: String,
    pub google_client_id: String,
    pub google_client_secret: String,
    /// Port the server listens on, used to template provider callback URLs.
    pub port: u16,
    pub auth_url: Option<String>,
    pub token_url: Option<String>,
    pub userinfo_url: Option<String>,
}

impl AuthConfig {
    pub fn callback_url(&self, provider: &str) -> String {
        format!("http://localhost:{}/auth/{}/callback", self.port, provider)
    }
}

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
    /// Where the browser is sent after a successful login.
    pub app_uri: String,
    /// Where the browser is sent after logout.
    pub post_logout_redirect_url: String,
    pub auth: AuthConfig,
}

impl AppConfig {
    /// Build the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = parse_port(lookup("PORT").as_deref());
        let string = |key: &str| lookup(key).unwrap_or_default();
        let optional = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            port,
            cors_allowed_origins: parse_cors_origins(lookup("CORS_ALLOWED_ORIGINS").as_deref()),
            app_uri: string("APP_URI"),
            post_logout_redirect_url: string("POST_LOGOUT_REDIRECT_URL"),
            auth: AuthConfig {
                cookie_store_key: string("COOKIE_STORE_KEY"),
                google_client_id: string("GOOGLE_CLIENT_ID"),
                google_client_secret: string("GOOGLE_CLIENT_SECRET"),
                port,
                auth_url: optional("OAUTH2_AUTH_URL"),
                token_url: optional("OAUTH2_TOKEN_URL"),
                userinfo_url: optional("OAUTH2_USERINFO_URL"),
            },
        }
    }
}

/// Parse `PORT`; absent or non-numeric values fall back to 0 (OS assigned).
///
/// Values outside the TCP port range (above 65535 or negative) are treated as
/// invalid and also fall back to 0.
pub fn parse_port(value: Option<&str>) -> u16 {
    match value.map(str::trim) {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid PORT {raw:?}, falling back to 0");
            0
        }),
        None => 0,
    }
}

/// Split a comma separated origin list, trimming entries and dropping empties.
pub fn parse_cors_origins(value: Option<&str>) -> Vec<String> {
    let origins: Vec<String> = value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect();

    if origins.is_empty() {
        DEFAULT_CORS_ALLOWED_ORIGINS
            .iter()
            .map(|o| o.to_string())
            .collect()
    } else {
        origins
    }
}
