//! Handlers for the `/workspaces` resource and its members.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use rankforge_core::audit_log::actions;
use rankforge_core::error::CoreError;
use rankforge_core::llm::LlmProvider;
use rankforge_core::roles::WorkspaceRole;
use rankforge_core::types::DbId;
use rankforge_core::workspace::unique_slug;
use rankforge_db::models::workspace::{
    AddMember, CreateWorkspace, MemberWithUser, UpdateMemberRole, UpdateWorkspace, Workspace,
    WorkspaceMember, WorkspaceWithRole,
};
use rankforge_db::repositories::{UserRepo, WorkspaceRepo};
use serde_json::json;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::workspace::{WsAdmin, WsOwner, WsViewer};
use crate::response::DataResponse;
use crate::services::audit::{self, AuditEntry};
use crate::services::plan::load_workspace;
use crate::state::AppState;

fn check_llm_provider(value: Option<&str>) -> AppResult<()> {
    match value {
        Some(v) if LlmProvider::parse(v).is_none() => Err(AppError::Core(CoreError::Validation(
            format!("Unknown LLM provider '{v}'"),
        ))),
        _ => Ok(()),
    }
}

fn parse_assignable_role(value: &str) -> AppResult<WorkspaceRole> {
    WorkspaceRole::parse(value)
        .filter(|r| r.is_assignable())
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(format!(
                "Role must be one of admin, member, viewer (got '{value}')"
            )))
        })
}

/// GET /api/v1/workspaces
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<WorkspaceWithRole>>>> {
    let workspaces = WorkspaceRepo::list_for_user(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse { data: workspaces }))
}

/// POST /api/v1/workspaces
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<CreateWorkspace>,
) -> AppResult<(StatusCode, Json<Workspace>)> {
    input.validate()?;
    check_llm_provider(input.preferred_llm_provider.as_deref())?;

    let name = input.name.trim();
    let workspace = WorkspaceRepo::create_with_owner(
        &state.pool,
        name,
        &unique_slug(name),
        user.user_id,
        input.preferred_llm_provider.as_deref(),
    )
    .await?;

    tracing::info!(workspace_id = workspace.id, user_id = user.user_id, "Workspace created");
    audit::record(
        &state.pool,
        AuditEntry::new(workspace.id, Some(user.user_id), actions::WORKSPACE_CREATE)
            .entity("workspace", workspace.id)
            .details(json!({ "name": workspace.name })),
    )
    .await;

    Ok((StatusCode::CREATED, Json(workspace)))
}

/// GET /api/v1/workspaces/{workspace_id}
pub async fn get_by_id(
    State(state): State<AppState>,
    WsViewer(access): WsViewer,
) -> AppResult<Json<Workspace>> {
    let workspace = load_workspace(&state.pool, access.workspace_id).await?;
    Ok(Json(workspace))
}

/// PUT /api/v1/workspaces/{workspace_id}
pub async fn update(
    State(state): State<AppState>,
    WsAdmin(access): WsAdmin,
    Json(input): Json<UpdateWorkspace>,
) -> AppResult<Json<Workspace>> {
    input.validate()?;
    check_llm_provider(input.preferred_llm_provider.as_deref())?;

    let workspace = WorkspaceRepo::update(&state.pool, access.workspace_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Workspace",
            id: access.workspace_id,
        }))?;

    audit::record(
        &state.pool,
        AuditEntry::new(workspace.id, Some(access.user_id()), actions::WORKSPACE_UPDATE)
            .entity("workspace", workspace.id)
            .details(json!({
                "name": input.name,
                "preferred_llm_provider": input.preferred_llm_provider,
            })),
    )
    .await;

    Ok(Json(workspace))
}

/// DELETE /api/v1/workspaces/{workspace_id}
///
/// Cascades to every project, keyword, audit, brief, document and config.
pub async fn delete(
    State(state): State<AppState>,
    WsOwner(access): WsOwner,
) -> AppResult<StatusCode> {
    let deleted = WorkspaceRepo::delete(&state.pool, access.workspace_id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Workspace",
            id: access.workspace_id,
        }));
    }

    tracing::info!(workspace_id = access.workspace_id, user_id = access.user_id(), "Workspace deleted");
    // The workspace row is gone, so the entry is kept without a workspace link.
    audit::record(
        &state.pool,
        AuditEntry {
            workspace_id: None,
            actor_user_id: Some(access.user_id()),
            action: actions::WORKSPACE_DELETE,
            entity_type: Some("workspace"),
            entity_id: Some(access.workspace_id),
            details: None,
        },
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Members
// ---------------------------------------------------------------------------

/// GET /api/v1/workspaces/{workspace_id}/members
pub async fn list_members(
    State(state): State<AppState>,
    WsViewer(access): WsViewer,
) -> AppResult<Json<DataResponse<Vec<MemberWithUser>>>> {
    let members = WorkspaceRepo::list_members(&state.pool, access.workspace_id).await?;
    Ok(Json(DataResponse { data: members }))
}

/// POST /api/v1/workspaces/{workspace_id}/members
pub async fn add_member(
    State(state): State<AppState>,
    WsAdmin(access): WsAdmin,
    Json(input): Json<AddMember>,
) -> AppResult<(StatusCode, Json<WorkspaceMember>)> {
    input.validate()?;
    let role = parse_assignable_role(&input.role)?;

    let user = UserRepo::find_by_email(&state.pool, input.email.trim())
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(
                "No account exists for that email".into(),
            ))
        })?;

    let member =
        WorkspaceRepo::add_member(&state.pool, access.workspace_id, user.id, role.as_str()).await?;

    audit::record(
        &state.pool,
        AuditEntry::new(access.workspace_id, Some(access.user_id()), actions::MEMBER_ADD)
            .entity("user", user.id)
            .details(json!({ "role": role.as_str() })),
    )
    .await;

    Ok((StatusCode::CREATED, Json(member)))
}

/// PUT /api/v1/workspaces/{workspace_id}/members/{user_id}
pub async fn update_member_role(
    State(state): State<AppState>,
    WsAdmin(access): WsAdmin,
    Path((_workspace_id, user_id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateMemberRole>,
) -> AppResult<Json<WorkspaceMember>> {
    let role = parse_assignable_role(&input.role)?;
    ensure_not_owner(&state, access.workspace_id, user_id).await?;

    let member =
        WorkspaceRepo::update_member_role(&state.pool, access.workspace_id, user_id, role.as_str())
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Member",
                id: user_id,
            }))?;

    audit::record(
        &state.pool,
        AuditEntry::new(access.workspace_id, Some(access.user_id()), actions::MEMBER_ROLE_CHANGE)
            .entity("user", user_id)
            .details(json!({ "role": role.as_str() })),
    )
    .await;

    Ok(Json(member))
}

/// DELETE /api/v1/workspaces/{workspace_id}/members/{user_id}
pub async fn remove_member(
    State(state): State<AppState>,
    WsAdmin(access): WsAdmin,
    Path((_workspace_id, user_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    ensure_not_owner(&state, access.workspace_id, user_id).await?;

    let removed = WorkspaceRepo::remove_member(&state.pool, access.workspace_id, user_id).await?;
    if !removed {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Member",
            id: user_id,
        }));
    }

    audit::record(
        &state.pool,
        AuditEntry::new(access.workspace_id, Some(access.user_id()), actions::MEMBER_REMOVE)
            .entity("user", user_id),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}

/// The owner membership is fixed for the lifetime of the workspace.
async fn ensure_not_owner(state: &AppState, workspace_id: DbId, user_id: DbId) -> AppResult<()> {
    let role = WorkspaceRepo::find_member_role(&state.pool, workspace_id, user_id).await?;
    if role.as_deref() == Some(WorkspaceRole::Owner.as_str()) {
        return Err(AppError::Core(CoreError::Forbidden(
            "The workspace owner cannot be changed or removed".into(),
        )));
    }
    Ok(())
}
