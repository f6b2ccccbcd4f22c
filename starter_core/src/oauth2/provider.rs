use std::collections::HashMap;
use url::Url;

use crate::config::AuthConfig;
use crate::oauth2::errors::OAuth2Error;

pub const GOOGLE_PROVIDER: &str = "google";

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";
const GOOGLE_SCOPES: [&str; 3] = ["openid", "email", "profile"];

/// Client registration and endpoints of one OAuth2 provider.
#[derive(Clone)]
pub struct OAuth2Provider {
    pub name: String,
    pub client_id: String,
    pub client_secret: String,
    pub callback_url: String,
    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
    pub scopes: Vec<String>,
}

impl std::fmt::Debug for OAuth2Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuth2Provider")
            .field("name", &self.name)
            .field("client_id", &self.client_id)
            .field("callback_url", &self.callback_url)
            .field("auth_url", &self.auth_url)
            .field("token_url", &self.token_url)
            .field("userinfo_url", &self.userinfo_url)
            .field("scopes", &self.scopes)
            .finish_non_exhaustive()
    }
}

impl OAuth2Provider {
    pub fn google(client_id: &str, client_secret: &str, callback_url: &str) -> Self {
        Self {
            name: GOOGLE_PROVIDER.to_string(),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            callback_url: callback_url.to_string(),
            auth_url: GOOGLE_AUTH_URL.to_string(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
            userinfo_url: GOOGLE_USERINFO_URL.to_string(),
            scopes: GOOGLE_SCOPES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Google provider built from the auth settings, honouring endpoint overrides.
    pub fn google_from_config(config: &AuthConfig) -> Self {
        let mut provider = Self::google(
            &config.google_client_id,
            &config.google_client_secret,
            &config.callback_url(GOOGLE_PROVIDER),
        );
        if let Some(url) = &config.auth_url {
            tracing::debug!("Using OAUTH2_AUTH_URL from environment: {}", url);
            provider.auth_url = url.clone();
        }
        if let Some(url) = &config.token_url {
            tracing::debug!("Using OAUTH2_TOKEN_URL from environment: {}", url);
            provider.token_url = url.clone();
        }
        if let Some(url) = &config.userinfo_url {
            tracing::debug!("Using OAUTH2_USERINFO_URL from environment: {}", url);
            provider.userinfo_url = url.clone();
        }
        provider
    }

    /// Consent screen URL for an authorization code request with PKCE.
    pub fn authorization_url(
        &self,
        state: &str,
        pkce_challenge: &str,
    ) -> Result<String, OAuth2Error> {
        let mut url = Url::parse(&self.auth_url)
            .map_err(|e| OAuth2Error::Internal(format!("Invalid auth URL: {e}")))?;

        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.callback_url)
            .append_pair("response_type", "code")
            .append_pair("scope", &self.scopes.join(" "))
            .append_pair("state", state)
            .append_pair("code_challenge", pkce_challenge)
            .append_pair("code_challenge_method", "S256")
            .append_pair("access_type", "online");

        Ok(url.into())
    }
}

/// Providers keyed by name. Filled once at startup and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<String, OAuth2Provider>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, provider: OAuth2Provider) {
        if self.providers.contains_key(&provider.name) {
            tracing::warn!("Replacing already registered provider {}", provider.name);
        }
        self.providers.insert(provider.name.clone(), provider);
    }

    pub fn get(&self, name: &str) -> Result<&OAuth2Provider, OAuth2Error> {
        self.providers
            .get(name)
            .ok_or_else(|| OAuth2Error::ProviderNotFound(name.to_string()))
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
