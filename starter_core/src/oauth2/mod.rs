mod client;
mod errors;
mod provider;
mod types;

pub use errors::OAuth2Error;
pub use provider::{GOOGLE_PROVIDER, OAuth2Provider, ProviderRegistry};
pub use types::{AuthResponse, AuthUser};

pub(crate) use client::{exchange_code_for_token, fetch_user_info, get_client};
