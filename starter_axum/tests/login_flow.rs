//! Login flow against a mock OAuth2 provider running on a random local port

use axum::{
    Json, Router,
    body::{Body, to_bytes},
    extract::{Form, State},
    http::{
        HeaderMap, Request, StatusCode,
        header::{AUTHORIZATION, COOKIE, LOCATION, SET_COOKIE},
    },
    response::Response,
    routing::{get, post},
};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use serde_json::{Value, json};
use sha2::{Digest, Sha256};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};
use tokio::net::TcpListener;
use tower::ServiceExt;
use url::Url;

use starter_axum::{AppState, Server, app_router};
use starter_core::{AppConfig, Auth, StubDatabase};

const CLIENT_ID: &str = "test-client-id";
const ACCESS_TOKEN: &str = "mock-access-token";
const APP_URI: &str = "http://localhost:3000/dashboard";
const LOGOUT_URL: &str = "http://localhost:3000/";

/// Authorization codes issued by the mock, mapped to their PKCE challenge.
#[derive(Clone, Default)]
struct MockProvider {
    base_url: String,
    codes: Arc<Mutex<HashMap<String, String>>>,
}

impl MockProvider {
    async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let mock = MockProvider {
            base_url: format!("http://{}", listener.local_addr().unwrap()),
            ..Default::default()
        };

        let app = Router::new()
            .route("/token", post(token))
            .route("/userinfo", get(userinfo))
            .with_state(mock.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        mock
    }

    /// Stand-in for the user approving the consent screen.
    fn approve(&self, code: &str, code_challenge: &str) {
        self.codes
            .lock()
            .unwrap()
            .insert(code.to_string(), code_challenge.to_string());
    }

    fn config(&self) -> AppConfig {
        let base_url = self.base_url.clone();
        AppConfig::from_lookup(move |key| {
            let value = match key {
                "PORT" => "8888".to_string(),
                "CORS_ALLOWED_ORIGINS" => "http://localhost:3000".to_string(),
                "GOOGLE_CLIENT_ID" => CLIENT_ID.to_string(),
                "GOOGLE_CLIENT_SECRET" => "test-client-secret".to_string(),
                "APP_URI" => APP_URI.to_string(),
                "POST_LOGOUT_REDIRECT_URL" => LOGOUT_URL.to_string(),
                "COOKIE_STORE_KEY" => "integration-test-key".to_string(),
                "OAUTH2_AUTH_URL" => format!("{base_url}/authorize"),
                "OAUTH2_TOKEN_URL" => format!("{base_url}/token"),
                "OAUTH2_USERINFO_URL" => format!("{base_url}/userinfo"),
                _ => return None,
            };
            Some(value)
        })
    }
}

async fn token(
    State(mock): State<MockProvider>,
    Form(form): Form<HashMap<String, String>>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    let invalid_grant = || {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "invalid_grant"})),
        )
    };

    if form.get("grant_type").map(String::as_str) != Some("authorization_code")
        || form.get("client_id").map(String::as_str) != Some(CLIENT_ID)
    {
        return Err(invalid_grant());
    }

    let code = form.get("code").ok_or_else(invalid_grant)?;
    let challenge = mock
        .codes
        .lock()
        .unwrap()
        .remove(code)
        .ok_or_else(invalid_grant)?;

    let verifier = form.get("code_verifier").ok_or_else(invalid_grant)?;
    if URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes())) != challenge {
        return Err(invalid_grant());
    }

    Ok(Json(json!({
        "access_token": ACCESS_TOKEN,
        "token_type": "Bearer",
        "expires_in": 3599,
    })))
}

async fn userinfo(headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
    let authorized = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {ACCESS_TOKEN}"));
    if !authorized {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(Json(json!({
        "id": "1234567890",
        "name": "Test User",
        "email": "test.user@example.com",
        "picture": "https://example.com/avatar.png",
    })))
}

fn app(config: AppConfig) -> Router {
    let auth = Auth::new(&config.auth).unwrap();
    app_router(AppState::new(config, auth, Arc::new(StubDatabase)))
}

async fn send(app: &Router, uri: &str, cookie: Option<&str>) -> Response {
    let mut request = Request::get(uri);
    if let Some(cookie) = cookie {
        request = request.header(COOKIE, cookie);
    }
    app.clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_string(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// `name=value` part of the response's `Set-Cookie`.
fn session_cookie(response: &Response) -> String {
    let set_cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

struct PendingLogin {
    cookie: String,
    state: String,
    code_challenge: String,
}

async fn begin_login(app: &Router, mock: &MockProvider) -> PendingLogin {
    let response = send(app, "/auth/google", None).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);

    let location = response.headers().get(LOCATION).unwrap().to_str().unwrap();
    assert!(location.starts_with(&format!("{}/authorize?", mock.base_url)));

    let params: HashMap<String, String> = Url::parse(location)
        .unwrap()
        .query_pairs()
        .into_owned()
        .collect();
    assert_eq!(params["client_id"], CLIENT_ID);
    assert_eq!(
        params["redirect_uri"],
        "http://localhost:8888/auth/google/callback"
    );

    PendingLogin {
        cookie: session_cookie(&response),
        state: params["state"].clone(),
        code_challenge: params["code_challenge"].clone(),
    }
}

#[tokio::test]
async fn test_full_login_flow() {
    let mock = MockProvider::start().await;
    let app = app(mock.config());

    let pending = begin_login(&app, &mock).await;
    mock.approve("valid-code", &pending.code_challenge);

    let callback = format!(
        "/auth/google/callback?code=valid-code&state={}&scope=openid",
        pending.state
    );
    let response = send(&app, &callback, Some(&pending.cookie)).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers().get(LOCATION).unwrap(), APP_URI);
    let user_cookie = session_cookie(&response);
    assert_ne!(user_cookie, pending.cookie);

    // Returning to the callback with an authenticated session and no code
    let response = send(&app, "/auth/google/callback", Some(&user_cookie)).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers().get(LOCATION).unwrap(), APP_URI);

    let response = send(&app, "/logout/google", Some(&user_cookie)).await;
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.headers().get(LOCATION).unwrap(), LOGOUT_URL);
    assert!(session_cookie(&response).ends_with('='));
}

#[tokio::test]
async fn test_callback_with_wrong_state() {
    let mock = MockProvider::start().await;
    let app = app(mock.config());

    let pending = begin_login(&app, &mock).await;
    mock.approve("valid-code", &pending.code_challenge);

    let response = send(
        &app,
        "/auth/google/callback?code=valid-code&state=forged",
        Some(&pending.cookie),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_string(response).await,
        "Authentication failed: state token mismatch"
    );
}

#[tokio::test]
async fn test_callback_without_cookie() {
    let mock = MockProvider::start().await;
    let app = app(mock.config());

    let pending = begin_login(&app, &mock).await;
    let callback = format!("/auth/google/callback?code=valid-code&state={}", pending.state);

    let response = send(&app, &callback, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(body_string(response).await.starts_with("Authentication failed:"));
}

#[tokio::test]
async fn test_callback_with_tampered_cookie() {
    let mock = MockProvider::start().await;
    let app = app(mock.config());

    let pending = begin_login(&app, &mock).await;
    mock.approve("valid-code", &pending.code_challenge);

    // Flip the first payload character after `name=`
    let (name, value) = pending.cookie.split_once('=').unwrap();
    let mut chars: Vec<char> = value.chars().collect();
    chars[0] = if chars[0] == 'A' { 'B' } else { 'A' };
    let tampered = format!("{name}={}", chars.into_iter().collect::<String>());

    let callback = format!("/auth/google/callback?code=valid-code&state={}", pending.state);
    let response = send(&app, &callback, Some(&tampered)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_code_bound_to_other_login_is_rejected() {
    let mock = MockProvider::start().await;
    let app = app(mock.config());

    let first = begin_login(&app, &mock).await;
    let second = begin_login(&app, &mock).await;
    mock.approve("valid-code", &first.code_challenge);

    // The code was issued for the first login's PKCE challenge
    let callback = format!("/auth/google/callback?code=valid-code&state={}", second.state);
    let response = send(&app, &callback, Some(&second.cookie)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(body_string(response).await.contains("Token exchange error"));
}

#[tokio::test]
async fn test_provider_denied_consent() {
    let mock = MockProvider::start().await;
    let app = app(mock.config());

    let pending = begin_login(&app, &mock).await;
    let callback = format!(
        "/auth/google/callback?error=access_denied&state={}",
        pending.state
    );

    let response = send(&app, &callback, Some(&pending.cookie)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_string(response).await,
        "Authentication failed: provider returned error: access_denied"
    );
}

#[tokio::test]
async fn test_server_over_tcp() {
    let mock = MockProvider::start().await;
    let config = mock.config();
    let server = Server::from_config(&config, app(config.clone()));
    assert_eq!(server.addr(), ":8888");

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    let service = server.into_app();
    tokio::spawn(async move {
        axum::serve(listener, service).await.unwrap();
    });

    let client = reqwest::Client::new();

    let response = client
        .get(format!("{base_url}/health"))
        .header("Origin", "http://localhost:3000")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .unwrap(),
        "http://localhost:3000"
    );
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({"status": "up", "message": "It's healthy"}));

    let response = client
        .get(format!("{base_url}/nope"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
}
