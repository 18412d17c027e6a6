//! Handlers for `/workspaces/{workspace_id}/projects`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use rankforge_core::error::CoreError;
use rankforge_core::keywords::normalize_domain;
use rankforge_core::plans::ensure_within_limit;
use rankforge_core::types::DbId;
use rankforge_db::models::project::{CreateProject, Project, UpdateProject};
use rankforge_db::repositories::ProjectRepo;
use validator::Validate;

use super::client::ensure_client;
use crate::error::{AppError, AppResult};
use crate::middleware::workspace::{WsMember, WsViewer};
use crate::response::DataResponse;
use crate::services::plan::{load_workspace, plan_of};
use crate::state::AppState;

/// Load a project, requiring it to belong to the workspace.
///
/// Every project-scoped handler goes through this before touching children.
pub(crate) async fn find_project(
    state: &AppState,
    workspace_id: DbId,
    project_id: DbId,
) -> AppResult<Project> {
    ProjectRepo::find_by_id(&state.pool, workspace_id, project_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id: project_id,
        }))
}

/// Normalize an optional user-supplied domain. Blank means no domain.
fn clean_domain(domain: Option<&str>) -> AppResult<Option<String>> {
    match domain.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => normalize_domain(raw).map(Some).ok_or_else(|| {
            AppError::Core(CoreError::Validation(format!("'{raw}' is not a valid domain")))
        }),
    }
}

/// POST /api/v1/workspaces/{workspace_id}/projects
pub async fn create(
    State(state): State<AppState>,
    WsMember(access): WsMember,
    Json(mut input): Json<CreateProject>,
) -> AppResult<(StatusCode, Json<Project>)> {
    input.validate()?;
    input.domain = clean_domain(input.domain.as_deref())?;
    ensure_client(&state, access.workspace_id, input.client_id).await?;

    let workspace = load_workspace(&state.pool, access.workspace_id).await?;
    let current = ProjectRepo::count_for_workspace(&state.pool, access.workspace_id).await?;
    ensure_within_limit("projects", plan_of(&workspace).limits().max_projects, current, 1)?;

    let project = ProjectRepo::create(&state.pool, access.workspace_id, &input).await?;
    tracing::info!(workspace_id = access.workspace_id, project_id = project.id, "Project created");
    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /api/v1/workspaces/{workspace_id}/projects
pub async fn list(
    State(state): State<AppState>,
    WsViewer(access): WsViewer,
) -> AppResult<Json<DataResponse<Vec<Project>>>> {
    let projects = ProjectRepo::list(&state.pool, access.workspace_id).await?;
    Ok(Json(DataResponse { data: projects }))
}

/// GET /api/v1/workspaces/{workspace_id}/projects/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    WsViewer(access): WsViewer,
    Path((_workspace_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<Project>> {
    let project = find_project(&state, access.workspace_id, id).await?;
    Ok(Json(project))
}

/// PUT /api/v1/workspaces/{workspace_id}/projects/{id}
pub async fn update(
    State(state): State<AppState>,
    WsMember(access): WsMember,
    Path((_workspace_id, id)): Path<(DbId, DbId)>,
    Json(mut input): Json<UpdateProject>,
) -> AppResult<Json<Project>> {
    input.validate()?;
    if input.domain.is_some() {
        input.domain = clean_domain(input.domain.as_deref())?;
    }
    ensure_client(&state, access.workspace_id, input.client_id).await?;

    let project = ProjectRepo::update(&state.pool, access.workspace_id, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;
    Ok(Json(project))
}

/// DELETE /api/v1/workspaces/{workspace_id}/projects/{id}
pub async fn delete(
    State(state): State<AppState>,
    WsMember(access): WsMember,
    Path((_workspace_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    if ProjectRepo::delete(&state.pool, access.workspace_id, id).await? {
        tracing::info!(workspace_id = access.workspace_id, project_id = id, "Project deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn domains_are_normalized_and_blank_clears() {
        assert_eq!(clean_domain(Some("https://www.Example.com/")).unwrap(), Some("example.com".into()));
        assert_eq!(clean_domain(Some("  ")).unwrap(), None);
        assert_eq!(clean_domain(None).unwrap(), None);
        assert_matches!(clean_domain(Some("not a domain")), Err(AppError::Core(CoreError::Validation(_))));
    }
}
