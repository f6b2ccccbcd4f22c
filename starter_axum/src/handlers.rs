use axum::{
    extract::{Path, Query, State, rejection::QueryRejection},
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{CONTENT_TYPE, LOCATION},
    },
    response::{IntoResponse, Redirect, Response},
};
use serde::Serialize;
use std::collections::HashMap;

use starter_core::{AuthResponse, is_down};

use crate::error::IntoResponseError;
use crate::state::AppState;

const INTERNAL_ERROR_BODY: &str = r#"{"error":"internal server error"}"#;

pub(crate) async fn hello_world() -> Response {
    let body = HashMap::from([("message", "Hello World")]);
    json_response(StatusCode::OK, &body)
}

pub(crate) async fn health(State(state): State<AppState>) -> Response {
    let report = state.db.health().await;
    let status = if is_down(&report) {
        tracing::warn!("Database reported down: {:?}", report);
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };
    json_response(status, &report)
}

/// Redirect to the provider's consent screen with a fresh pending session.
pub(crate) async fn begin_auth(
    State(state): State<AppState>,
    Path(provider): Path<String>,
) -> Result<(HeaderMap, Redirect), (StatusCode, String)> {
    let (auth_url, headers) = state.auth.begin_auth(&provider).into_response_error()?;
    Ok((headers, Redirect::temporary(&auth_url)))
}

pub(crate) async fn auth_callback(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    query: Result<Query<AuthResponse>, QueryRejection>,
    headers: HeaderMap,
) -> Result<(StatusCode, HeaderMap), (StatusCode, String)> {
    let Query(response) = query.map_err(|e| {
        tracing::error!("Unreadable callback query for {}: {}", provider, e);
        (
            StatusCode::UNAUTHORIZED,
            format!("Authentication failed: {}", e.body_text()),
        )
    })?;

    let (user, mut response_headers) = state
        .auth
        .complete_auth(&provider, &response, &headers)
        .await
        .map_err(|e| {
            tracing::error!("Authentication with {} failed: {}", provider, e);
            (
                StatusCode::UNAUTHORIZED,
                format!("Authentication failed: {e}"),
            )
        })?;

    tracing::info!("User authenticated: {} ({})", user.name, user.email);

    response_headers.insert(LOCATION, location(&state.config.app_uri)?);
    Ok((StatusCode::FOUND, response_headers))
}

pub(crate) async fn logout(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    headers: HeaderMap,
) -> Result<(StatusCode, HeaderMap), (StatusCode, String)> {
    let mut response_headers = state.auth.logout(&provider, &headers).into_response_error()?;

    response_headers.insert(LOCATION, location(&state.config.post_logout_redirect_url)?);
    Ok((StatusCode::TEMPORARY_REDIRECT, response_headers))
}

fn location(target: &str) -> Result<HeaderValue, (StatusCode, String)> {
    HeaderValue::from_str(target).map_err(|e| {
        tracing::error!("Invalid redirect target {:?}: {}", target, e);
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })
}

/// Serialize `body` as JSON; encoding failures become a generic 500.
fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    match serde_json::to_vec(body) {
        Ok(bytes) => (status, [(CONTENT_TYPE, "application/json")], bytes).into_response(),
        Err(e) => {
            tracing::error!("error handling JSON marshal: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(CONTENT_TYPE, "application/json")],
                INTERNAL_ERROR_BODY,
            )
                .into_response()
        }
    }
}
