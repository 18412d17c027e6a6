pub mod auth;
pub mod health;
pub mod project;
pub mod workspace;

use axum::routing::post;
use axum::Router;

use crate::handlers::{cron, webhook};
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                                   register (public)
/// /auth/login                                      login (public)
/// /auth/refresh                                    refresh (public)
/// /auth/logout                                     logout (requires auth)
/// /auth/me                                         current user (requires auth)
///
/// /workspaces                                      list, create
/// /workspaces/{workspace_id}                       get, update, delete
/// /workspaces/{workspace_id}/members[/{user_id}]   membership management
/// /workspaces/{workspace_id}/clients[/{id}]        client CRUD
/// /workspaces/{workspace_id}/projects[/{id}]       project CRUD
///   .../projects/{project_id}/keywords             keyword batch, rank check
///   .../projects/{project_id}/audits               run and read SEO audits
///   .../projects/{project_id}/briefs               briefs and LLM generation
/// /workspaces/{workspace_id}/documents[/{id}]      document CRUD
/// /workspaces/{workspace_id}/integrations          BYOK credentials
/// /workspaces/{workspace_id}/usage                 daily usage snapshots
/// /workspaces/{workspace_id}/audit-log             admin audit log
/// /workspaces/{workspace_id}/subscription          plan and subscription
/// /workspaces/{workspace_id}/billing/checkout      start checkout
///
/// /webhooks/payments                               payment events (signed)
/// /cron/usage-snapshots                            daily rollup (CRON_SECRET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/workspaces", workspace::router())
        .route("/webhooks/payments", post(webhook::payments))
        .route("/cron/usage-snapshots", post(cron::usage_snapshots))
}
