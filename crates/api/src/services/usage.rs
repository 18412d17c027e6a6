//! Usage-event recording. Failures are logged, never surfaced to the caller.

use rankforge_core::types::DbId;
use rankforge_db::models::usage::CreateUsageEvent;
use rankforge_db::repositories::UsageRepo;
use rankforge_db::DbPool;

pub async fn record(
    pool: &DbPool,
    workspace_id: DbId,
    user_id: Option<DbId>,
    event_type: &'static str,
    metadata: Option<serde_json::Value>,
) {
    let input = CreateUsageEvent {
        workspace_id,
        user_id,
        event_type,
        metadata,
    };
    if let Err(e) = UsageRepo::record(pool, &input).await {
        tracing::warn!(workspace_id, event_type, error = %e, "Failed to record usage event");
    }
}
