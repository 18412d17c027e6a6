//! Handler for `/workspaces/{workspace_id}/audit-log`.

use axum::extract::{Query, State};
use axum::Json;
use rankforge_db::models::audit_log::{AdminAuditLog, AuditLogQuery};
use rankforge_db::repositories::AdminAuditLogRepo;

use crate::error::AppResult;
use crate::middleware::workspace::WsAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/workspaces/{workspace_id}/audit-log?action=&limit=&offset=
pub async fn list(
    State(state): State<AppState>,
    WsAdmin(access): WsAdmin,
    Query(params): Query<AuditLogQuery>,
) -> AppResult<Json<DataResponse<Vec<AdminAuditLog>>>> {
    let entries = AdminAuditLogRepo::list(&state.pool, access.workspace_id, &params).await?;
    Ok(Json(DataResponse { data: entries }))
}
