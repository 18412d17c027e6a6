//! Handlers for `/workspaces/{workspace_id}/clients`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use rankforge_core::error::CoreError;
use rankforge_core::types::DbId;
use rankforge_db::models::client::{Client, CreateClient, UpdateClient};
use rankforge_db::repositories::ClientRepo;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::workspace::{WsMember, WsViewer};
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Client",
        id,
    })
}

/// Fail with 404 unless `client_id` belongs to the workspace.
pub(crate) async fn ensure_client(
    state: &AppState,
    workspace_id: DbId,
    client_id: Option<DbId>,
) -> AppResult<()> {
    if let Some(id) = client_id {
        ClientRepo::find_by_id(&state.pool, workspace_id, id)
            .await?
            .ok_or_else(|| not_found(id))?;
    }
    Ok(())
}

/// POST /api/v1/workspaces/{workspace_id}/clients
pub async fn create(
    State(state): State<AppState>,
    WsMember(access): WsMember,
    Json(input): Json<CreateClient>,
) -> AppResult<(StatusCode, Json<Client>)> {
    input.validate()?;
    let client = ClientRepo::create(&state.pool, access.workspace_id, &input).await?;
    tracing::info!(workspace_id = access.workspace_id, client_id = client.id, "Client created");
    Ok((StatusCode::CREATED, Json(client)))
}

/// GET /api/v1/workspaces/{workspace_id}/clients
pub async fn list(
    State(state): State<AppState>,
    WsViewer(access): WsViewer,
) -> AppResult<Json<DataResponse<Vec<Client>>>> {
    let clients = ClientRepo::list(&state.pool, access.workspace_id).await?;
    Ok(Json(DataResponse { data: clients }))
}

/// GET /api/v1/workspaces/{workspace_id}/clients/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    WsViewer(access): WsViewer,
    Path((_workspace_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<Client>> {
    let client = ClientRepo::find_by_id(&state.pool, access.workspace_id, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(client))
}

/// PUT /api/v1/workspaces/{workspace_id}/clients/{id}
pub async fn update(
    State(state): State<AppState>,
    WsMember(access): WsMember,
    Path((_workspace_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateClient>,
) -> AppResult<Json<Client>> {
    input.validate()?;
    let client = ClientRepo::update(&state.pool, access.workspace_id, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(client))
}

/// DELETE /api/v1/workspaces/{workspace_id}/clients/{id}
///
/// Projects attached to the client are kept and detached.
pub async fn delete(
    State(state): State<AppState>,
    WsMember(access): WsMember,
    Path((_workspace_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    if ClientRepo::delete(&state.pool, access.workspace_id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}
