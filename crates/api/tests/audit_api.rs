//! Audit runs against a local HTML stub.

mod common;

use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use common::{body_json, create_project, get_auth, post_json_auth, register_user, spawn_stub};
use serde_json::json;
use sqlx::PgPool;

const BARE_PAGE: &str = "<html><head></head><body><p>Hello</p><img src=\"a.png\"></body></html>";

async fn bare_page() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/html; charset=utf-8")], BARE_PAGE)
}

async fn redirect_to_file() -> impl IntoResponse {
    (StatusCode::FOUND, [(header::LOCATION, "file:///etc/passwd")])
}

#[sqlx::test(migrations = "../db/migrations")]
async fn audit_of_reachable_page_completes_with_issues(pool: PgPool) {
    let app = common::build_test_app(pool);
    let user = register_user(app.clone(), "auditor@example.com").await;
    let project_id = create_project(app.clone(), &user, json!({ "name": "Site" })).await;
    let base = spawn_stub(Router::new().route("/page", get(bare_page))).await;

    let uri = format!(
        "/api/v1/workspaces/{}/projects/{project_id}/audits",
        user.workspace_id
    );
    let response = post_json_auth(
        app.clone(),
        &uri,
        json!({ "url": format!("{base}/page") }),
        &user.token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let audit = body_json(response).await;
    assert_eq!(audit["status"], "completed");
    assert!(audit["performance_score"].is_null());

    let score = audit["score"].as_i64().unwrap();
    assert!((0..100).contains(&score));
    let codes: Vec<&str> = audit["issues"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|i| i["code"].as_str())
        .collect();
    assert!(codes.contains(&"missing_title"));
    assert!(codes.contains(&"missing_h1"));
    assert_eq!(audit["metrics"]["images_missing_alt"], 1);

    let list = body_json(get_auth(app, &uri, &user.token).await).await;
    assert_eq!(list["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unreachable_page_records_a_failed_audit(pool: PgPool) {
    let app = common::build_test_app(pool);
    let user = register_user(app.clone(), "offline@example.com").await;
    let project_id = create_project(app.clone(), &user, json!({ "name": "Down" })).await;

    let uri = format!(
        "/api/v1/workspaces/{}/projects/{project_id}/audits",
        user.workspace_id
    );
    let response = post_json_auth(
        app,
        &uri,
        json!({ "url": "http://127.0.0.1:9/nothing-here" }),
        &user.token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let audit = body_json(response).await;
    assert_eq!(audit["status"], "failed");
    assert!(audit["score"].is_null());
    assert!(audit["error_message"].is_string());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn audit_needs_a_url_or_domain(pool: PgPool) {
    let app = common::build_test_app(pool);
    let user = register_user(app.clone(), "nodomain@example.com").await;
    let project_id = create_project(app.clone(), &user, json!({ "name": "Blank" })).await;

    let uri = format!(
        "/api/v1/workspaces/{}/projects/{project_id}/audits",
        user.workspace_id
    );
    let response = post_json_auth(app, &uri, json!({}), &user.token).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn internal_destinations_are_refused(pool: PgPool) {
    let mut config = common::test_config();
    config.allow_private_fetch = false;
    let app = common::build_test_app_with(pool, config);
    let user = register_user(app.clone(), "ssrf@example.com").await;
    let project_id = create_project(app.clone(), &user, json!({ "name": "Site" })).await;
    let base = spawn_stub(Router::new().route("/page", get(bare_page))).await;

    let uri = format!(
        "/api/v1/workspaces/{}/projects/{project_id}/audits",
        user.workspace_id
    );
    for url in [
        "http://169.254.169.254/latest/meta-data/".to_string(),
        "http://10.0.0.8/admin".to_string(),
        format!("{base}/page"),
        "file:///etc/passwd".to_string(),
    ] {
        let response = post_json_auth(app.clone(), &uri, json!({ "url": url }), &user.token).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{url}");
        assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    }

    let audits = body_json(get_auth(app, &uri, &user.token).await).await;
    assert_eq!(audits["data"], json!([]));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn redirect_to_disallowed_scheme_fails_the_audit(pool: PgPool) {
    let app = common::build_test_app(pool);
    let user = register_user(app.clone(), "hops@example.com").await;
    let project_id = create_project(app.clone(), &user, json!({ "name": "Site" })).await;
    let base = spawn_stub(Router::new().route("/hop", get(redirect_to_file))).await;

    let uri = format!(
        "/api/v1/workspaces/{}/projects/{project_id}/audits",
        user.workspace_id
    );
    let response =
        post_json_auth(app, &uri, json!({ "url": format!("{base}/hop") }), &user.token).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let audit = body_json(response).await;
    assert_eq!(audit["status"], "failed");
    assert!(audit["error_message"]
        .as_str()
        .unwrap()
        .starts_with("Refused destination"));
}
