//! Plan lookup for quota checks.

use rankforge_core::error::CoreError;
use rankforge_core::plans::Plan;
use rankforge_core::types::DbId;
use rankforge_db::models::workspace::Workspace;
use rankforge_db::repositories::WorkspaceRepo;
use rankforge_db::DbPool;

use crate::error::{AppError, AppResult};

pub async fn load_workspace(pool: &DbPool, workspace_id: DbId) -> AppResult<Workspace> {
    WorkspaceRepo::find_by_id(pool, workspace_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Workspace",
            id: workspace_id,
        }))
}

/// The workspace's current plan. Unknown stored values count as `free`.
pub fn plan_of(workspace: &Workspace) -> Plan {
    Plan::parse(&workspace.plan).unwrap_or(Plan::Free)
}
