//! Route definitions for the `/workspaces` resource and everything scoped
//! to a workspace.

use axum::routing::{get, post, put};
use axum::Router;

use super::project;
use crate::handlers::{audit_log, billing, client, document, integration, usage, workspace};
use crate::state::AppState;

/// Routes mounted at `/workspaces`.
///
/// ```text
/// GET    /                                        -> list
/// POST   /                                        -> create
/// GET    /{workspace_id}                          -> get_by_id (viewer+)
/// PUT    /{workspace_id}                          -> update (admin+)
/// DELETE /{workspace_id}                          -> delete (owner)
///
/// GET    /{workspace_id}/members                  -> list_members
/// POST   /{workspace_id}/members                  -> add_member
/// PUT    /{workspace_id}/members/{user_id}        -> update_member_role
/// DELETE /{workspace_id}/members/{user_id}        -> remove_member
///
/// GET    /{workspace_id}/clients                  -> list
/// POST   /{workspace_id}/clients                  -> create
/// GET    /{workspace_id}/clients/{id}             -> get_by_id
/// PUT    /{workspace_id}/clients/{id}             -> update
/// DELETE /{workspace_id}/clients/{id}             -> delete
///
/// ...    /{workspace_id}/projects/...             -> see `project::router`
///
/// GET    /{workspace_id}/documents                -> list
/// POST   /{workspace_id}/documents                -> create
/// GET    /{workspace_id}/documents/{id}           -> get_by_id
/// PUT    /{workspace_id}/documents/{id}           -> update
/// DELETE /{workspace_id}/documents/{id}           -> delete
///
/// GET    /{workspace_id}/integrations             -> list
/// PUT    /{workspace_id}/integrations/{provider}  -> upsert (admin+)
/// DELETE /{workspace_id}/integrations/{provider}  -> delete (admin+)
///
/// GET    /{workspace_id}/usage                    -> list_snapshots
/// GET    /{workspace_id}/audit-log                -> list (admin+)
/// GET    /{workspace_id}/subscription             -> get_subscription
/// POST   /{workspace_id}/billing/checkout         -> checkout (owner)
/// ```
pub fn router() -> Router<AppState> {
    let member_routes = Router::new()
        .route("/", get(workspace::list_members).post(workspace::add_member))
        .route(
            "/{user_id}",
            put(workspace::update_member_role).delete(workspace::remove_member),
        );

    let client_routes = Router::new()
        .route("/", get(client::list).post(client::create))
        .route(
            "/{id}",
            get(client::get_by_id)
                .put(client::update)
                .delete(client::delete),
        );

    let document_routes = Router::new()
        .route("/", get(document::list).post(document::create))
        .route(
            "/{id}",
            get(document::get_by_id)
                .put(document::update)
                .delete(document::delete),
        );

    let integration_routes = Router::new()
        .route("/", get(integration::list))
        .route(
            "/{provider}",
            put(integration::upsert).delete(integration::delete),
        );

    Router::new()
        .route("/", get(workspace::list).post(workspace::create))
        .route(
            "/{workspace_id}",
            get(workspace::get_by_id)
                .put(workspace::update)
                .delete(workspace::delete),
        )
        .nest("/{workspace_id}/members", member_routes)
        .nest("/{workspace_id}/clients", client_routes)
        .nest("/{workspace_id}/projects", project::router())
        .nest("/{workspace_id}/documents", document_routes)
        .nest("/{workspace_id}/integrations", integration_routes)
        .route("/{workspace_id}/usage", get(usage::list_snapshots))
        .route("/{workspace_id}/audit-log", get(audit_log::list))
        .route("/{workspace_id}/subscription", get(billing::get_subscription))
        .route("/{workspace_id}/billing/checkout", post(billing::checkout))
}
