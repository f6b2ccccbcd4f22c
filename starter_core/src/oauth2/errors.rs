use thiserror::Error;

use crate::session::SessionError;
use crate::utils::UtilError;

#[derive(Debug, Error, Clone)]
pub enum OAuth2Error {
    #[error("no provider for {0} exists")]
    ProviderNotFound(String),

    #[error("session was started for provider {expected}, not {actual}")]
    ProviderMismatch { expected: String, actual: String },

    #[error("could not find a matching session for this request")]
    SessionNotFound,

    #[error("state token mismatch")]
    StateMismatch,

    #[error("authorization code missing from callback")]
    MissingCode,

    #[error("provider returned error: {0}")]
    ProviderDenied(String),

    #[error("Token exchange error: {0}")]
    TokenExchange(String),

    #[error("Fetch user info error: {0}")]
    FetchUserInfo(String),

    #[error("Serde error: {0}")]
    Serde(String),

    #[error("Internal error: {0}")]
    Internal(String),

    /// Error from utils operations
    #[error("Utils error: {0}")]
    Utils(#[from] UtilError),

    /// Error from session operations
    #[error("Session error: {0}")]
    Session(#[from] SessionError),
}
