//! Route definitions for `/workspaces/{workspace_id}/projects`.
//!
//! Also nests keywords, audits and briefs under `/{project_id}/...`.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{audit, brief, keyword, project};
use crate::state::AppState;

/// Routes mounted at `/workspaces/{workspace_id}/projects`.
///
/// ```text
/// GET    /                                   -> list
/// POST   /                                   -> create
/// GET    /{project_id}                       -> get_by_id
/// PUT    /{project_id}                       -> update
/// DELETE /{project_id}                       -> delete
///
/// GET    /{project_id}/keywords              -> list
/// POST   /{project_id}/keywords              -> create_batch
/// POST   /{project_id}/keywords/check        -> check
/// PUT    /{project_id}/keywords/{id}         -> update
/// DELETE /{project_id}/keywords/{id}         -> delete
///
/// GET    /{project_id}/audits                -> list
/// POST   /{project_id}/audits                -> run
/// GET    /{project_id}/audits/{id}           -> get_by_id
/// DELETE /{project_id}/audits/{id}           -> delete
///
/// GET    /{project_id}/briefs                -> list
/// POST   /{project_id}/briefs                -> create
/// GET    /{project_id}/briefs/{id}           -> get_by_id
/// PUT    /{project_id}/briefs/{id}           -> update
/// DELETE /{project_id}/briefs/{id}           -> delete
/// POST   /{project_id}/briefs/{id}/generate  -> generate
/// ```
pub fn router() -> Router<AppState> {
    let keyword_routes = Router::new()
        .route("/", get(keyword::list).post(keyword::create_batch))
        .route("/check", post(keyword::check))
        .route("/{id}", put(keyword::update).delete(keyword::delete));

    let audit_routes = Router::new()
        .route("/", get(audit::list).post(audit::run))
        .route("/{id}", get(audit::get_by_id).delete(audit::delete));

    let brief_routes = Router::new()
        .route("/", get(brief::list).post(brief::create))
        .route(
            "/{id}",
            get(brief::get_by_id)
                .put(brief::update)
                .delete(brief::delete),
        )
        .route("/{id}/generate", post(brief::generate));

    Router::new()
        .route("/", get(project::list).post(project::create))
        .route(
            "/{project_id}",
            get(project::get_by_id)
                .put(project::update)
                .delete(project::delete),
        )
        .nest("/{project_id}/keywords", keyword_routes)
        .nest("/{project_id}/audits", audit_routes)
        .nest("/{project_id}/briefs", brief_routes)
}
