//! Repository for the `seo_audits` table.

use rankforge_core::seo_analyzer::audit_status;
use rankforge_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::seo_audit::{CompleteSeoAudit, SeoAudit};

const COLUMNS: &str = "id, project_id, url, status, score, issues, metrics, performance_score, \
                       error_message, created_by, completed_at, created_at, updated_at";

pub struct SeoAuditRepo;

impl SeoAuditRepo {
    /// Insert a `pending` audit for `url`.
    pub async fn create_pending(
        pool: &PgPool,
        project_id: DbId,
        url: &str,
        created_by: Option<DbId>,
    ) -> Result<SeoAudit, sqlx::Error> {
        let query = format!(
            "INSERT INTO seo_audits (project_id, url, status, created_by)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SeoAudit>(&query)
            .bind(project_id)
            .bind(url)
            .bind(audit_status::PENDING)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    /// Mark an audit `completed` with the analyzer results.
    pub async fn complete(
        pool: &PgPool,
        id: DbId,
        input: &CompleteSeoAudit,
    ) -> Result<SeoAudit, sqlx::Error> {
        let query = format!(
            "UPDATE seo_audits SET
                status = $2,
                score = $3,
                issues = $4,
                metrics = $5,
                performance_score = $6,
                completed_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SeoAudit>(&query)
            .bind(id)
            .bind(audit_status::COMPLETED)
            .bind(input.score)
            .bind(&input.issues)
            .bind(&input.metrics)
            .bind(input.performance_score)
            .fetch_one(pool)
            .await
    }

    /// Mark an audit `failed` with the reason.
    pub async fn fail(pool: &PgPool, id: DbId, error_message: &str) -> Result<SeoAudit, sqlx::Error> {
        let query = format!(
            "UPDATE seo_audits SET status = $2, error_message = $3, completed_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SeoAudit>(&query)
            .bind(id)
            .bind(audit_status::FAILED)
            .bind(error_message)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
    ) -> Result<Option<SeoAudit>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM seo_audits WHERE id = $1 AND project_id = $2");
        sqlx::query_as::<_, SeoAudit>(&query)
            .bind(id)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }

    /// List a project's audits, newest first.
    pub async fn list(
        pool: &PgPool,
        project_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<SeoAudit>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM seo_audits
             WHERE project_id = $1
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, SeoAudit>(&query)
            .bind(project_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Audits started across all of a workspace's projects since `since`.
    pub async fn count_for_workspace_since(
        pool: &PgPool,
        workspace_id: DbId,
        since: Timestamp,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM seo_audits a
             JOIN projects p ON p.id = a.project_id
             WHERE p.workspace_id = $1 AND a.created_at >= $2",
        )
        .bind(workspace_id)
        .bind(since)
        .fetch_one(pool)
        .await
    }

    pub async fn delete(pool: &PgPool, project_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM seo_audits WHERE id = $1 AND project_id = $2")
            .bind(id)
            .bind(project_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
