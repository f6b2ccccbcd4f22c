mod config;
mod errors;
mod store;
mod types;

pub use config::{IS_PROD, MAX_AGE, SESSION_COOKIE_NAME};
pub use errors::SessionError;
pub use store::SessionStore;
pub use types::{CookiePolicy, SameSite, SessionData};
