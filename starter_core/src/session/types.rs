use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::config::{IS_PROD, MAX_AGE, SESSION_COOKIE_NAME};
use crate::oauth2::AuthUser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => f.write_str("Strict"),
            Self::Lax => f.write_str("Lax"),
            Self::None => f.write_str("None"),
        }
    }
}

/// Attributes attached to every session cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookiePolicy {
    pub name: String,
    pub max_age: u64,
    pub path: String,
    pub http_only: bool,
    pub secure: bool,
    pub same_site: SameSite,
}

impl Default for CookiePolicy {
    fn default() -> Self {
        Self {
            name: SESSION_COOKIE_NAME.to_string(),
            max_age: MAX_AGE,
            path: "/".to_string(),
            http_only: true,
            secure: IS_PROD,
            // Lax lets the cookie ride along on the provider's top-level redirect back
            same_site: SameSite::Lax,
        }
    }
}

/// Payload carried in the signed session cookie.
///
/// Between `begin_auth` and the callback it holds the pending `state` and PKCE
/// verifier; after a successful callback it holds the authenticated user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionData {
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pkce_verifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<AuthUser>,
    pub issued_at: DateTime<Utc>,
}

impl SessionData {
    pub fn pending(provider: &str, state: String, pkce_verifier: String) -> Self {
        Self {
            provider: provider.to_string(),
            state: Some(state),
            pkce_verifier: Some(pkce_verifier),
            user: None,
            issued_at: Utc::now(),
        }
    }

    pub fn authenticated(provider: &str, user: AuthUser) -> Self {
        Self {
            provider: provider.to_string(),
            state: None,
            pkce_verifier: None,
            user: Some(user),
            issued_at: Utc::now(),
        }
    }
}
