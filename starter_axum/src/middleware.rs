use axum::http::{
    HeaderValue, Method,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    request::Parts,
};
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};

/// How long browsers may cache a preflight response.
pub(crate) const CORS_MAX_AGE: Duration = Duration::from_secs(300);

/// One entry of the allowed origin list.
///
/// At most one `*` is honoured and it matches any run of characters, so
/// `https://*` admits every https origin and `https://*.example.com` admits
/// its subdomains. Matching is case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum OriginPattern {
    Exact(String),
    Wildcard { prefix: String, suffix: String },
}

impl OriginPattern {
    pub(crate) fn new(pattern: &str) -> Self {
        let pattern = pattern.trim().to_ascii_lowercase();
        match pattern.split_once('*') {
            Some((prefix, suffix)) => Self::Wildcard {
                prefix: prefix.to_string(),
                suffix: suffix.to_string(),
            },
            None => Self::Exact(pattern),
        }
    }

    pub(crate) fn matches(&self, origin: &str) -> bool {
        let origin = origin.to_ascii_lowercase();
        match self {
            Self::Exact(allowed) => *allowed == origin,
            Self::Wildcard { prefix, suffix } => {
                origin.len() >= prefix.len() + suffix.len()
                    && origin.starts_with(prefix.as_str())
                    && origin.ends_with(suffix.as_str())
            }
        }
    }
}

/// CORS policy for the given origin patterns.
///
/// Matching origins are echoed back together with
/// `Access-Control-Allow-Credentials: true`; others get no CORS headers.
pub(crate) fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let patterns: Vec<OriginPattern> = allowed_origins
        .iter()
        .map(|o| OriginPattern::new(o))
        .collect();
    tracing::debug!("CORS allowed origins: {:?}", allowed_origins);

    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts: &Parts| {
                origin
                    .to_str()
                    .map(|o| patterns.iter().any(|p| p.matches(o)))
                    .unwrap_or(false)
            },
        ))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
            Method::PATCH,
        ])
        .allow_headers([ACCEPT, AUTHORIZATION, CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(CORS_MAX_AGE)
}
