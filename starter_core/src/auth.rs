//! Auth initializer and the login/logout entry points
//!
//! [`Auth`] bundles the provider registry, the cookie session store and the
//! HTTP client. It is built once from [`AuthConfig`] and shared read-only by
//! every request.

use http::header::HeaderMap;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use thiserror::Error;

use crate::config::AuthConfig;
use crate::oauth2::{
    AuthResponse, AuthUser, OAuth2Error, OAuth2Provider, ProviderRegistry,
    exchange_code_for_token, fetch_user_info, get_client,
};
use crate::session::{CookiePolicy, SessionData, SessionStore};
use crate::utils::{UtilError, base64url_encode, gen_random_bytes, gen_random_string};

#[derive(Debug, Error)]
pub enum AuthInitError {
    #[error("OAuth2 error: {0}")]
    OAuth2(#[from] OAuth2Error),

    #[error("Utils error: {0}")]
    Utils(#[from] UtilError),
}

#[derive(Debug, Clone)]
pub struct Auth {
    providers: ProviderRegistry,
    sessions: SessionStore,
    client: reqwest::Client,
}

impl Auth {
    /// Build the session store and register the configured providers.
    ///
    /// An empty `cookie_store_key` is replaced by a random per-process key, so
    /// sessions are lost on restart.
    pub fn new(config: &AuthConfig) -> Result<Self, AuthInitError> {
        let key = if config.cookie_store_key.is_empty() {
            tracing::warn!("COOKIE_STORE_KEY is not set, using a random key for this process");
            gen_random_bytes(32)?
        } else {
            config.cookie_store_key.as_bytes().to_vec()
        };
        let sessions = SessionStore::new(key, CookiePolicy::default());

        let mut providers = ProviderRegistry::new();
        if config.google_client_id.is_empty() {
            tracing::warn!("GOOGLE_CLIENT_ID is not set, Google login will be rejected by Google");
        }
        providers.register(OAuth2Provider::google_from_config(config));

        tracing::info!("Registered OAuth2 providers: {:?}", providers.names());
        Self::with_parts(providers, sessions)
    }

    pub fn with_parts(
        providers: ProviderRegistry,
        sessions: SessionStore,
    ) -> Result<Self, AuthInitError> {
        Ok(Self {
            providers,
            sessions,
            client: get_client()?,
        })
    }

    pub fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }

    pub fn session_store(&self) -> &SessionStore {
        &self.sessions
    }

    /// Start a login with `provider`.
    ///
    /// Returns the consent screen URL to redirect to and the headers carrying
    /// the pending session cookie.
    pub fn begin_auth(&self, provider: &str) -> Result<(String, HeaderMap), OAuth2Error> {
        let provider = self.providers.get(provider)?;

        let state = gen_random_string(32)?;
        let pkce_verifier = gen_random_string(32)?;
        let pkce_challenge = base64url_encode(Sha256::digest(pkce_verifier.as_bytes()));

        let auth_url = provider.authorization_url(&state, &pkce_challenge)?;
        tracing::debug!("Auth URL: {:#?}", auth_url);

        let session = SessionData::pending(&provider.name, state, pkce_verifier);
        let headers = self.sessions.set_cookie_headers(&session)?;

        Ok((auth_url, headers))
    }

    /// Finish a login from the provider's callback.
    ///
    /// A session that already holds a user for `provider` is returned as-is
    /// when the callback carries no authorization code.
    pub async fn complete_auth(
        &self,
        provider: &str,
        response: &AuthResponse,
        headers: &HeaderMap,
    ) -> Result<(AuthUser, HeaderMap), OAuth2Error> {
        let provider = self.providers.get(provider)?;

        if let Some(error) = &response.error {
            let detail = match &response.error_description {
                Some(description) => format!("{error}: {description}"),
                None => error.clone(),
            };
            return Err(OAuth2Error::ProviderDenied(detail));
        }

        let session = self
            .sessions
            .load(headers)?
            .ok_or(OAuth2Error::SessionNotFound)?;

        if session.provider != provider.name {
            return Err(OAuth2Error::ProviderMismatch {
                expected: session.provider,
                actual: provider.name.clone(),
            });
        }

        if response.code.is_none() {
            if let Some(user) = session.user {
                tracing::debug!("Reusing authenticated session for {}", user.email);
                return Ok((user, HeaderMap::new()));
            }
        }

        let expected_state = session.state.as_deref().ok_or(OAuth2Error::SessionNotFound)?;
        let received_state = response.state.as_deref().unwrap_or_default();
        if !bool::from(expected_state.as_bytes().ct_eq(received_state.as_bytes())) {
            tracing::error!("State in callback does not match the session");
            return Err(OAuth2Error::StateMismatch);
        }

        let code = response.code.as_deref().ok_or(OAuth2Error::MissingCode)?;
        let pkce_verifier = session.pkce_verifier.as_deref().unwrap_or_default();

        let access_token =
            exchange_code_for_token(&self.client, provider, code, pkce_verifier).await?;
        let user_info = fetch_user_info(&self.client, provider, &access_token).await?;
        let user = user_info.into_auth_user(&provider.name, access_token);

        let headers = self
            .sessions
            .set_cookie_headers(&SessionData::authenticated(&provider.name, user.clone()))?;

        Ok((user, headers))
    }

    /// Headers that drop the session cookie.
    pub fn logout(&self, provider: &str, headers: &HeaderMap) -> Result<HeaderMap, OAuth2Error> {
        match self.sessions.load(headers) {
            Ok(Some(session)) => tracing::debug!(
                "Logging out of {} session (requested for {})",
                session.provider,
                provider
            ),
            Ok(None) => tracing::debug!("Logout for {} without a session", provider),
            Err(e) => tracing::debug!("Logout for {} with unreadable session: {}", provider, e),
        }

        Ok(self.sessions.clear_cookie_headers()?)
    }
}
