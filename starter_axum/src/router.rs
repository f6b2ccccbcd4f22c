//! Application router: the five public routes behind CORS and request tracing

use axum::{
    Router,
    http::header::{AUTHORIZATION, COOKIE},
    routing::get,
};
use tower_http::LatencyUnit;
use tower_http::sensitive_headers::SetSensitiveRequestHeadersLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::handlers::{auth_callback, begin_auth, health, hello_world, logout};
use crate::middleware::cors_layer;
use crate::state::AppState;

/// Build the application router.
///
/// Routes:
/// - `GET /` hello world
/// - `GET /health` database health report
/// - `GET /auth/{provider}` start a login
/// - `GET /auth/{provider}/callback` finish a login
/// - `GET /logout/{provider}` drop the session
///
/// Anything else is answered with an empty 404. `Cookie` and `Authorization`
/// are marked sensitive before tracing, so request spans never log them.
pub fn app_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_allowed_origins);

    Router::new()
        .route("/", get(hello_world))
        .route("/health", get(health))
        .route("/auth/{provider}", get(begin_auth))
        .route("/auth/{provider}/callback", get(auth_callback))
        .route("/logout/{provider}", get(logout))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(true),
                )
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .latency_unit(LatencyUnit::Millis),
                ),
        )
        .layer(SetSensitiveRequestHeadersLayer::new([COOKIE, AUTHORIZATION]))
        .with_state(state)
}
