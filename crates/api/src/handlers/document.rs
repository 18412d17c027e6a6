//! Handlers for `/workspaces/{workspace_id}/documents`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use rankforge_core::content::{is_valid_document_status, word_count};
use rankforge_core::error::CoreError;
use rankforge_core::types::DbId;
use rankforge_core::usage::event_types;
use rankforge_db::models::document::{CreateDocument, Document, DocumentFilter, UpdateDocument};
use rankforge_db::repositories::{ContentBriefRepo, DocumentRepo};
use serde_json::json;
use validator::Validate;

use super::project::find_project;
use crate::error::{AppError, AppResult};
use crate::middleware::workspace::{WsMember, WsViewer};
use crate::response::DataResponse;
use crate::services::usage;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Document",
        id,
    })
}

fn check_status(status: Option<&str>) -> AppResult<()> {
    match status {
        Some(s) if !is_valid_document_status(s) => Err(AppError::Core(CoreError::Validation(
            format!("Status must be one of draft, in_review, published (got '{s}')"),
        ))),
        _ => Ok(()),
    }
}

/// POST /api/v1/workspaces/{workspace_id}/documents
pub async fn create(
    State(state): State<AppState>,
    WsMember(access): WsMember,
    Json(input): Json<CreateDocument>,
) -> AppResult<(StatusCode, Json<Document>)> {
    input.validate()?;
    check_status(input.status.as_deref())?;

    if let Some(project_id) = input.project_id {
        find_project(&state, access.workspace_id, project_id).await?;
    }
    if let Some(brief_id) = input.brief_id {
        ContentBriefRepo::find_in_workspace(&state.pool, access.workspace_id, brief_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "ContentBrief",
                id: brief_id,
            }))?;
    }

    let words = input.content.as_deref().map(word_count).unwrap_or(0);
    let document = DocumentRepo::create(
        &state.pool,
        access.workspace_id,
        &input,
        words,
        Some(access.user_id()),
    )
    .await?;

    usage::record(
        &state.pool,
        access.workspace_id,
        Some(access.user_id()),
        event_types::DOCUMENT_CREATED,
        Some(json!({ "document_id": document.id, "word_count": words })),
    )
    .await;

    Ok((StatusCode::CREATED, Json(document)))
}

/// GET /api/v1/workspaces/{workspace_id}/documents
pub async fn list(
    State(state): State<AppState>,
    WsViewer(access): WsViewer,
    Query(filter): Query<DocumentFilter>,
) -> AppResult<Json<DataResponse<Vec<Document>>>> {
    let documents = DocumentRepo::list(&state.pool, access.workspace_id, &filter).await?;
    Ok(Json(DataResponse { data: documents }))
}

/// GET /api/v1/workspaces/{workspace_id}/documents/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    WsViewer(access): WsViewer,
    Path((_workspace_id, id)): Path<(DbId, DbId)>,
) -> AppResult<Json<Document>> {
    let document = DocumentRepo::find_by_id(&state.pool, access.workspace_id, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(document))
}

/// PUT /api/v1/workspaces/{workspace_id}/documents/{id}
///
/// The word count follows the content whenever the content changes.
pub async fn update(
    State(state): State<AppState>,
    WsMember(access): WsMember,
    Path((_workspace_id, id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateDocument>,
) -> AppResult<Json<Document>> {
    input.validate()?;
    check_status(input.status.as_deref())?;
    if let Some(project_id) = input.project_id {
        find_project(&state, access.workspace_id, project_id).await?;
    }

    let words = input.content.as_deref().map(word_count);
    let document = DocumentRepo::update(&state.pool, access.workspace_id, id, &input, words)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(document))
}

/// DELETE /api/v1/workspaces/{workspace_id}/documents/{id}
pub async fn delete(
    State(state): State<AppState>,
    WsMember(access): WsMember,
    Path((_workspace_id, id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    if DocumentRepo::delete(&state.pool, access.workspace_id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}
