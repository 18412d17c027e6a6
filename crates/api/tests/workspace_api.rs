//! Tenant isolation, workspace roles and plan limits over HTTP.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_project, delete_auth, get_auth, post_json_auth, put_json_auth,
    register_user,
};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../db/migrations")]
async fn project_without_domain_is_stored_as_null(pool: PgPool) {
    let app = common::build_test_app(pool);
    let user = register_user(app.clone(), "owner@example.com").await;

    let uri = format!("/api/v1/workspaces/{}/projects", user.workspace_id);
    let response = post_json_auth(app, &uri, json!({ "name": "Blog" }), &user.token).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["name"], "Blog");
    assert!(json["domain"].is_null());
    assert_eq!(json["keyword_count"], 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn project_domain_is_normalized(pool: PgPool) {
    let app = common::build_test_app(pool);
    let user = register_user(app.clone(), "norm@example.com").await;

    let uri = format!("/api/v1/workspaces/{}/projects", user.workspace_id);
    let body = json!({ "name": "Shop", "domain": "https://WWW.Example.com/path" });
    let json = body_json(post_json_auth(app, &uri, body, &user.token).await).await;

    assert_eq!(json["domain"], "example.com");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn outsiders_cannot_reach_another_workspace(pool: PgPool) {
    let app = common::build_test_app(pool);
    let alice = register_user(app.clone(), "alice@example.com").await;
    let bob = register_user(app.clone(), "bob@example.com").await;
    let project_id = create_project(app.clone(), &alice, json!({ "name": "Private" })).await;

    let uri = format!("/api/v1/workspaces/{}/projects", alice.workspace_id);
    let response = get_auth(app.clone(), &uri, &bob.token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Addressing Alice's project through Bob's own workspace finds nothing.
    let uri = format!(
        "/api/v1/workspaces/{}/projects/{project_id}",
        bob.workspace_id
    );
    let response = get_auth(app, &uri, &bob.token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn viewer_can_read_but_not_write(pool: PgPool) {
    let app = common::build_test_app(pool);
    let owner = register_user(app.clone(), "lead@example.com").await;
    let viewer = register_user(app.clone(), "watcher@example.com").await;

    let members = format!("/api/v1/workspaces/{}/members", owner.workspace_id);
    let response = post_json_auth(
        app.clone(),
        &members,
        json!({ "email": "watcher@example.com", "role": "viewer" }),
        &owner.token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let projects = format!("/api/v1/workspaces/{}/projects", owner.workspace_id);
    let read = get_auth(app.clone(), &projects, &viewer.token).await;
    assert_eq!(read.status(), StatusCode::OK);

    let write = post_json_auth(app, &projects, json!({ "name": "Nope" }), &viewer.token).await;
    assert_eq!(write.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn free_plan_caps_projects(pool: PgPool) {
    let app = common::build_test_app(pool);
    let user = register_user(app.clone(), "capped@example.com").await;

    for i in 0..3 {
        create_project(app.clone(), &user, json!({ "name": format!("Site {i}") })).await;
    }

    let uri = format!("/api/v1/workspaces/{}/projects", user.workspace_id);
    let response = post_json_auth(app, &uri, json!({ "name": "One too many" }), &user.token).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "PLAN_LIMIT");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn members_can_be_managed_but_owner_is_fixed(pool: PgPool) {
    let app = common::build_test_app(pool);
    let owner = register_user(app.clone(), "boss@example.com").await;
    let writer = register_user(app.clone(), "writer@example.com").await;
    let base = format!("/api/v1/workspaces/{}/members", owner.workspace_id);

    let added = post_json_auth(
        app.clone(),
        &base,
        json!({ "email": "writer@example.com", "role": "member" }),
        &owner.token,
    )
    .await;
    assert_eq!(added.status(), StatusCode::CREATED);

    let promoted = put_json_auth(
        app.clone(),
        &format!("{base}/{}", writer.user_id),
        json!({ "role": "admin" }),
        &owner.token,
    )
    .await;
    assert_eq!(promoted.status(), StatusCode::OK);
    assert_eq!(body_json(promoted).await["role"], "admin");

    // Admins still cannot touch the owner.
    let kick_owner = delete_auth(
        app.clone(),
        &format!("{base}/{}", owner.user_id),
        &writer.token,
    )
    .await;
    assert_eq!(kick_owner.status(), StatusCode::FORBIDDEN);

    let removed = delete_auth(
        app.clone(),
        &format!("{base}/{}", writer.user_id),
        &owner.token,
    )
    .await;
    assert_eq!(removed.status(), StatusCode::NO_CONTENT);

    let list = body_json(get_auth(app, &base, &owner.token).await).await;
    assert_eq!(list["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn owner_role_cannot_be_assigned(pool: PgPool) {
    let app = common::build_test_app(pool);
    let owner = register_user(app.clone(), "solo@example.com").await;
    register_user(app.clone(), "hopeful@example.com").await;

    let uri = format!("/api/v1/workspaces/{}/members", owner.workspace_id);
    let response = post_json_auth(
        app,
        &uri,
        json!({ "email": "hopeful@example.com", "role": "owner" }),
        &owner.token,
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
