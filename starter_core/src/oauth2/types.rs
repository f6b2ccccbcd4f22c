use serde::{Deserialize, Serialize};

/// Query parameters the provider appends to the callback URL.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthResponse {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Identity returned by a completed login.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthUser {
    pub provider: String,
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub picture: Option<String>,
    /// Provider access token. Never written into the session cookie, so a
    /// user loaded from a session carries an empty token.
    #[serde(skip)]
    pub access_token: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct TokenResponse {
    pub(super) access_token: String,
    #[allow(dead_code)]
    pub(super) token_type: Option<String>,
    #[allow(dead_code)]
    pub(super) expires_in: Option<u64>,
}

// Google's v2 userinfo uses `id`, the OIDC userinfo endpoint uses `sub`
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct UserInfo {
    #[serde(alias = "sub")]
    pub(super) id: String,
    #[serde(default)]
    pub(super) name: String,
    #[serde(default)]
    pub(super) email: String,
    pub(super) picture: Option<String>,
}

impl UserInfo {
    pub(crate) fn into_auth_user(self, provider: &str, access_token: String) -> AuthUser {
        AuthUser {
            provider: provider.to_string(),
            user_id: self.id,
            name: self.name,
            email: self.email,
            picture: self.picture,
            access_token,
        }
    }
}
