//! Request throttling on the credential endpoints.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use common::{body_json, post_json, send};
use serde_json::{json, Value};
use sqlx::PgPool;

async fn login_from(app: Router, forwarded_for: &str, body: &Value) -> StatusCode {
    let request = Request::post("/api/v1/auth/login")
        .header("content-type", "application/json")
        .header("x-forwarded-for", forwarded_for)
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await.status()
}

#[sqlx::test(migrations = "../db/migrations")]
async fn login_is_throttled_after_ten_attempts(pool: PgPool) {
    let mut config = common::test_config();
    config.rate_limit_enabled = true;
    let app = common::build_test_app_with(pool, config);
    let body = json!({ "email": "nobody@example.com", "password": "whatever-it-is" });

    for _ in 0..10 {
        let response = post_json(app.clone(), "/api/v1/auth/login", body.clone()).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let response = post_json(app, "/api/v1/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key("retry-after"));
    assert_eq!(response.headers()["x-ratelimit-remaining"], "0");
    assert_eq!(body_json(response).await["code"], "RATE_LIMITED");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn throttling_is_off_when_disabled(pool: PgPool) {
    let app = common::build_test_app(pool);
    let body = json!({ "email": "nobody@example.com", "password": "whatever-it-is" });

    for _ in 0..12 {
        let response = post_json(app.clone(), "/api/v1/auth/login", body.clone()).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

#[sqlx::test(migrations = "../db/migrations")]
async fn rotating_forwarded_for_does_not_reset_the_bucket(pool: PgPool) {
    let mut config = common::test_config();
    config.rate_limit_enabled = true;
    let app = common::build_test_app_with(pool, config);
    let body = json!({ "email": "nobody@example.com", "password": "whatever-it-is" });

    let mut statuses = Vec::new();
    for i in 0..12 {
        statuses.push(login_from(app.clone(), &format!("198.51.100.{i}"), &body).await);
    }

    assert!(statuses[..10].iter().all(|s| *s == StatusCode::UNAUTHORIZED));
    assert_eq!(statuses[10], StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(statuses[11], StatusCode::TOO_MANY_REQUESTS);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn trusted_proxy_buckets_by_forwarded_client(pool: PgPool) {
    let mut config = common::test_config();
    config.rate_limit_enabled = true;
    config.trust_proxy_headers = true;
    let app = common::build_test_app_with(pool, config);
    let body = json!({ "email": "nobody@example.com", "password": "whatever-it-is" });

    for _ in 0..10 {
        assert_eq!(login_from(app.clone(), "203.0.113.7", &body).await, StatusCode::UNAUTHORIZED);
    }
    assert_eq!(
        login_from(app.clone(), "203.0.113.7", &body).await,
        StatusCode::TOO_MANY_REQUESTS
    );
    assert_eq!(login_from(app, "203.0.113.8", &body).await, StatusCode::UNAUTHORIZED);
}
