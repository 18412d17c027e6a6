//! Admin audit-log writer.
//!
//! Details are redacted before they are stored. A failed write is logged at
//! `error` and does not undo the action that was audited.

use rankforge_core::audit_log::redact_sensitive_fields;
use rankforge_core::types::DbId;
use rankforge_db::models::audit_log::CreateAdminAuditLog;
use rankforge_db::repositories::AdminAuditLogRepo;
use rankforge_db::DbPool;

/// One audit entry, before redaction.
#[derive(Debug)]
pub struct AuditEntry {
    pub workspace_id: Option<DbId>,
    pub actor_user_id: Option<DbId>,
    pub action: &'static str,
    pub entity_type: Option<&'static str>,
    pub entity_id: Option<DbId>,
    pub details: Option<serde_json::Value>,
}

impl AuditEntry {
    pub fn new(workspace_id: DbId, actor_user_id: Option<DbId>, action: &'static str) -> Self {
        Self {
            workspace_id: Some(workspace_id),
            actor_user_id,
            action,
            entity_type: None,
            entity_id: None,
            details: None,
        }
    }

    pub fn entity(mut self, entity_type: &'static str, entity_id: DbId) -> Self {
        self.entity_type = Some(entity_type);
        self.entity_id = Some(entity_id);
        self
    }

    pub fn details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

pub async fn record(pool: &DbPool, entry: AuditEntry) {
    let input = CreateAdminAuditLog {
        workspace_id: entry.workspace_id,
        actor_user_id: entry.actor_user_id,
        action: entry.action,
        entity_type: entry.entity_type,
        entity_id: entry.entity_id,
        details: entry.details.as_ref().map(redact_sensitive_fields),
        ip_address: None,
    };
    if let Err(e) = AdminAuditLogRepo::create(pool, &input).await {
        tracing::error!(action = entry.action, error = %e, "Failed to write admin audit log");
    }
}
