//! Admin audit log model. Rows are append-only (no `updated_at`).

use rankforge_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AdminAuditLog {
    pub id: DbId,
    pub workspace_id: Option<DbId>,
    pub actor_user_id: Option<DbId>,
    pub action: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<DbId>,
    pub details: Option<serde_json::Value>,
    pub ip_address: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for inserting an entry. `details` must already be redacted.
#[derive(Debug, Clone)]
pub struct CreateAdminAuditLog {
    pub workspace_id: Option<DbId>,
    pub actor_user_id: Option<DbId>,
    pub action: &'static str,
    pub entity_type: Option<&'static str>,
    pub entity_id: Option<DbId>,
    pub details: Option<serde_json::Value>,
    pub ip_address: Option<String>,
}

/// Filters for the audit-log listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditLogQuery {
    pub action: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
