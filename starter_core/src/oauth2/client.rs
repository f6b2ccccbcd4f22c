use std::time::Duration;

use crate::oauth2::errors::OAuth2Error;
use crate::oauth2::provider::OAuth2Provider;
use crate::oauth2::types::{TokenResponse, UserInfo};

/// HTTP client shared by all OAuth2 calls.
///
/// The 30 second timeout keeps a stalled provider from pinning a request
/// handler; idle pooled connections are dropped after 90 seconds.
pub(crate) fn get_client() -> Result<reqwest::Client, OAuth2Error> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .pool_idle_timeout(Duration::from_secs(90))
        .pool_max_idle_per_host(32)
        .build()
        .map_err(|e| OAuth2Error::Internal(format!("Failed to create HTTP client: {e}")))
}

pub(crate) async fn exchange_code_for_token(
    client: &reqwest::Client,
    provider: &OAuth2Provider,
    code: &str,
    code_verifier: &str,
) -> Result<String, OAuth2Error> {
    let response = client
        .post(provider.token_url.as_str())
        .form(&[
            ("code", code),
            ("client_id", provider.client_id.as_str()),
            ("client_secret", provider.client_secret.as_str()),
            ("redirect_uri", provider.callback_url.as_str()),
            ("grant_type", "authorization_code"),
            ("code_verifier", code_verifier),
        ])
        .send()
        .await
        .map_err(|e| OAuth2Error::TokenExchange(e.to_string()))?;

    let status = response.status();
    if status != reqwest::StatusCode::OK {
        tracing::debug!("Token Exchange Response: {:#?}", response);
        return Err(OAuth2Error::TokenExchange(status.to_string()));
    }

    let response_body = response
        .text()
        .await
        .map_err(|e| OAuth2Error::TokenExchange(e.to_string()))?;
    let token: TokenResponse = serde_json::from_str(&response_body)
        .map_err(|e| OAuth2Error::TokenExchange(e.to_string()))?;

    Ok(token.access_token)
}

pub(crate) async fn fetch_user_info(
    client: &reqwest::Client,
    provider: &OAuth2Provider,
    access_token: &str,
) -> Result<UserInfo, OAuth2Error> {
    let response = client
        .get(provider.userinfo_url.as_str())
        .bearer_auth(access_token)
        .send()
        .await
        .map_err(|e| OAuth2Error::FetchUserInfo(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        return Err(OAuth2Error::FetchUserInfo(status.to_string()));
    }

    let response_body = response
        .text()
        .await
        .map_err(|e| OAuth2Error::FetchUserInfo(e.to_string()))?;

    tracing::debug!("Response Body: {:#?}", response_body);
    let user_info: UserInfo = serde_json::from_str(&response_body)
        .map_err(|e| OAuth2Error::Serde(format!("Failed to deserialize response body: {e}")))?;

    Ok(user_info)
}
