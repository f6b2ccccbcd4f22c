//! starter-core - configuration and authentication for the backend starter
//!
//! This crate is framework agnostic: it reads the environment into an
//! explicit [`AppConfig`], signs session cookies, keeps the registry of OAuth2
//! providers and runs the authorization code flow. HTTP wiring lives in
//! `starter-axum`.

mod auth;
mod config;
mod database;
mod oauth2;
mod session;
mod utils;

pub use auth::{Auth, AuthInitError};
pub use config::{
    AppConfig, AuthConfig, DEFAULT_CORS_ALLOWED_ORIGINS, load_env, parse_cors_origins,
    parse_port,
};
pub use database::{
    Database, DatabaseError, HEALTH_STATUS_DOWN, HEALTH_STATUS_UP, StubDatabase, is_down,
};
pub use oauth2::{
    AuthResponse, AuthUser, GOOGLE_PROVIDER, OAuth2Error, OAuth2Provider, ProviderRegistry,
};
pub use session::{
    CookiePolicy, IS_PROD, MAX_AGE, SESSION_COOKIE_NAME, SameSite, SessionData, SessionError,
    SessionStore,
};
pub use utils::{UtilError, gen_random_string};
