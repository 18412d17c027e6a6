//! Handler for `/workspaces/{workspace_id}/usage`.

use axum::extract::{Query, State};
use axum::Json;
use rankforge_db::models::usage::{UsageQuery, UsageSnapshot};
use rankforge_db::repositories::UsageRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::workspace::WsViewer;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/workspaces/{workspace_id}/usage?from=YYYY-MM-DD&to=YYYY-MM-DD
pub async fn list_snapshots(
    State(state): State<AppState>,
    WsViewer(access): WsViewer,
    Query(filter): Query<UsageQuery>,
) -> AppResult<Json<DataResponse<Vec<UsageSnapshot>>>> {
    if let (Some(from), Some(to)) = (filter.from, filter.to) {
        if from > to {
            return Err(AppError::BadRequest("`from` must not be after `to`".into()));
        }
    }
    let snapshots = UsageRepo::list_snapshots(&state.pool, access.workspace_id, &filter).await?;
    Ok(Json(DataResponse { data: snapshots }))
}
