/// Session lifetime in seconds (30 days).
pub const MAX_AGE: u64 = 86400 * 30;

/// Marks session cookies `Secure`. Flip for deployments served over HTTPS.
pub const IS_PROD: bool = false;

pub const SESSION_COOKIE_NAME: &str = "_starter_session";
