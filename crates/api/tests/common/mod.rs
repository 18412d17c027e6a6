#![allow(dead_code)]

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use rankforge_api::auth::jwt::JwtConfig;
use rankforge_api::config::{
    IntegrationEndpoints, PaymentConfig, PlatformKeys, ServerConfig,
};
use rankforge_api::router::build_app_router;
use rankforge_api::state::AppState;

pub const TEST_PASSWORD: &str = "correct-horse-battery";
pub const CRON_SECRET: &str = "cron-test-secret";
pub const WEBHOOK_SECRET: &str = "whsec_test_secret";

/// Build a test `ServerConfig` with safe defaults.
///
/// No platform keys are set, so integrations resolve only from workspace
/// configs, and the rate limiter is off. Audits may fetch local hosts so the
/// stub servers on 127.0.0.1 are reachable.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        outbound_timeout_secs: 5,
        jwt: JwtConfig {
            secret: "test-jwt-secret".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
        credentials_secret: "test-credentials-secret-0123456789abcdef".to_string(),
        cron_secret: Some(CRON_SECRET.to_string()),
        app_url: "http://localhost:5173".to_string(),
        payments: PaymentConfig {
            webhook_secret: Some(WEBHOOK_SECRET.to_string()),
            price_pro: Some("price_pro".to_string()),
            price_agency: Some("price_agency".to_string()),
            ..PaymentConfig::default()
        },
        platform_keys: PlatformKeys::default(),
        endpoints: IntegrationEndpoints::default(),
        rate_limit_enabled: false,
        trust_proxy_headers: false,
        allow_private_fetch: true,
    }
}

/// Build the full application router with the default test config.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, test_config())
}

/// Build the production router around `config`.
pub fn build_test_app_with(pool: PgPool, config: ServerConfig) -> Router {
    build_app_router(AppState::new(pool, config).unwrap())
}

/// Serve `router` on an ephemeral local port and return its base URL.
///
/// Stands in for third-party APIs; point the matching
/// [`IntegrationEndpoints`] field at the returned URL.
pub async fn spawn_stub(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<serde_json::Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn send(app: Router, request: Request<Body>) -> Response {
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, request(Method::GET, uri, None, None)).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, request(Method::GET, uri, Some(token), None)).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, request(Method::POST, uri, None, Some(body))).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: serde_json::Value, token: &str) -> Response {
    send(app, request(Method::POST, uri, Some(token), Some(body))).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, request(Method::POST, uri, Some(token), None)).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: serde_json::Value, token: &str) -> Response {
    send(app, request(Method::PUT, uri, Some(token), Some(body))).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response {
    send(app, request(Method::DELETE, uri, Some(token), None)).await
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A registered user: access token, user id and personal workspace id.
pub struct TestUser {
    pub token: String,
    pub user_id: i64,
    pub workspace_id: i64,
}

/// Register a user through the API.
pub async fn register_user(app: Router, email: &str) -> TestUser {
    let body = serde_json::json!({
        "email": email,
        "name": "Test User",
        "password": TEST_PASSWORD,
    });
    let response = post_json(app, "/api/v1/auth/register", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    TestUser {
        token: json["access_token"].as_str().unwrap().to_string(),
        user_id: json["user"]["id"].as_i64().unwrap(),
        workspace_id: json["workspace"]["id"].as_i64().unwrap(),
    }
}

/// Create a project in the user's workspace and return its id.
pub async fn create_project(app: Router, user: &TestUser, body: serde_json::Value) -> i64 {
    let uri = format!("/api/v1/workspaces/{}/projects", user.workspace_id);
    let response = post_json_auth(app, &uri, body, &user.token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_i64().unwrap()
}
