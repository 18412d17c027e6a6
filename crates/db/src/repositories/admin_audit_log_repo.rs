//! Repository for the append-only `admin_audit_logs` table.

use rankforge_core::types::DbId;
use sqlx::PgPool;

use crate::models::audit_log::{AdminAuditLog, AuditLogQuery, CreateAdminAuditLog};

const COLUMNS: &str = "id, workspace_id, actor_user_id, action, entity_type, entity_id, \
                       details, ip_address, created_at";

/// Default page size for listings.
const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 200;

pub struct AdminAuditLogRepo;

impl AdminAuditLogRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateAdminAuditLog,
    ) -> Result<AdminAuditLog, sqlx::Error> {
        let query = format!(
            "INSERT INTO admin_audit_logs
                (workspace_id, actor_user_id, action, entity_type, entity_id, details, ip_address)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AdminAuditLog>(&query)
            .bind(input.workspace_id)
            .bind(input.actor_user_id)
            .bind(input.action)
            .bind(input.entity_type)
            .bind(input.entity_id)
            .bind(&input.details)
            .bind(&input.ip_address)
            .fetch_one(pool)
            .await
    }

    /// A workspace's entries, newest first, optionally filtered by action.
    pub async fn list(
        pool: &PgPool,
        workspace_id: DbId,
        params: &AuditLogQuery,
    ) -> Result<Vec<AdminAuditLog>, sqlx::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let offset = params.offset.unwrap_or(0).max(0);
        let query = format!(
            "SELECT {COLUMNS} FROM admin_audit_logs
             WHERE workspace_id = $1 AND ($2::text IS NULL OR action = $2)
             ORDER BY created_at DESC, id DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, AdminAuditLog>(&query)
            .bind(workspace_id)
            .bind(&params.action)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }
}
