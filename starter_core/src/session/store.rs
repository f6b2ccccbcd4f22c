use chrono::{Duration, Utc};
use headers::HeaderMapExt;
use hmac::{Hmac, Mac};
use http::header::{HeaderMap, HeaderValue, SET_COOKIE};
use sha2::Sha256;
use std::fmt;

use crate::session::errors::SessionError;
use crate::session::types::{CookiePolicy, SessionData};
use crate::utils::{base64url_decode, base64url_encode};

type HmacSha256 = Hmac<Sha256>;

/// Stateless session store: the whole session lives in a cookie.
///
/// Token format: `base64url(json payload).base64url(hmac_sha256(payload))`.
#[derive(Clone)]
pub struct SessionStore {
    key: Vec<u8>,
    policy: CookiePolicy,
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("key", &"<redacted>")
            .field("policy", &self.policy)
            .finish()
    }
}

impl SessionStore {
    pub fn new(key: impl Into<Vec<u8>>, policy: CookiePolicy) -> Self {
        Self {
            key: key.into(),
            policy,
        }
    }

    pub fn policy(&self) -> &CookiePolicy {
        &self.policy
    }

    pub fn encode(&self, data: &SessionData) -> Result<String, SessionError> {
        let payload = serde_json::to_vec(data).map_err(|e| SessionError::Serde(e.to_string()))?;
        let payload_b64 = base64url_encode(payload);

        let mut mac = self.mac()?;
        mac.update(payload_b64.as_bytes());
        let signature = mac.finalize().into_bytes();

        Ok(format!("{}.{}", payload_b64, base64url_encode(signature)))
    }

    pub fn decode(&self, token: &str) -> Result<SessionData, SessionError> {
        let (payload_b64, signature_b64) = token
            .split_once('.')
            .ok_or_else(|| SessionError::Malformed("missing signature".to_string()))?;

        let signature =
            base64url_decode(signature_b64).map_err(|_| SessionError::InvalidSignature)?;
        let mut mac = self.mac()?;
        mac.update(payload_b64.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| SessionError::InvalidSignature)?;

        let payload = base64url_decode(payload_b64)?;
        let data: SessionData =
            serde_json::from_slice(&payload).map_err(|e| SessionError::Serde(e.to_string()))?;

        let expires_at = data.issued_at + Duration::seconds(self.policy.max_age as i64);
        if Utc::now() > expires_at {
            tracing::debug!("Session issued at {} expired at {}", data.issued_at, expires_at);
            return Err(SessionError::Expired);
        }

        Ok(data)
    }

    /// Read and verify the session cookie from request headers.
    ///
    /// Returns `Ok(None)` when the request carries no session cookie.
    pub fn load(&self, headers: &HeaderMap) -> Result<Option<SessionData>, SessionError> {
        let Some(cookies) = headers.typed_get::<headers::Cookie>() else {
            return Ok(None);
        };

        match cookies.get(&self.policy.name) {
            Some(token) => self.decode(token).map(Some),
            None => Ok(None),
        }
    }

    /// Headers carrying a `Set-Cookie` that stores `data`.
    pub fn set_cookie_headers(&self, data: &SessionData) -> Result<HeaderMap, SessionError> {
        let token = self.encode(data)?;
        let mut headers = HeaderMap::new();
        append_set_cookie(&mut headers, self.cookie_string(&token, self.policy.max_age as i64))?;
        Ok(headers)
    }

    /// Headers carrying a `Set-Cookie` that removes the session cookie.
    pub fn clear_cookie_headers(&self) -> Result<HeaderMap, SessionError> {
        let mut headers = HeaderMap::new();
        let cookie = format!(
            "{}; Expires=Thu, 01 Jan 1970 00:00:00 GMT",
            self.cookie_string("", 0)
        );
        append_set_cookie(&mut headers, cookie)?;
        Ok(headers)
    }

    fn cookie_string(&self, value: &str, max_age: i64) -> String {
        let policy = &self.policy;
        let mut cookie = format!(
            "{}={}; Path={}; Max-Age={}; SameSite={}",
            policy.name, value, policy.path, max_age, policy.same_site
        );
        if policy.http_only {
            cookie.push_str("; HttpOnly");
        }
        if policy.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }

    fn mac(&self) -> Result<HmacSha256, SessionError> {
        HmacSha256::new_from_slice(&self.key).map_err(|e| SessionError::Crypto(e.to_string()))
    }
}

fn append_set_cookie(headers: &mut HeaderMap, cookie: String) -> Result<(), SessionError> {
    let value = HeaderValue::from_str(&cookie)
        .map_err(|_| SessionError::Cookie("Failed to parse cookie".to_string()))?;
    headers.append(SET_COOKIE, value);
    Ok(())
}
