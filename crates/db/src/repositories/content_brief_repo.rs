//! Repository for the `content_briefs` table.

use rankforge_core::content::brief_status;
use rankforge_core::types::DbId;
use sqlx::PgPool;

use crate::models::content_brief::{ContentBrief, CreateContentBrief, UpdateContentBrief};

const COLUMNS: &str = "id, project_id, keyword_id, target_keyword, title, status, content, \
                       llm_provider, created_by, created_at, updated_at";

pub struct ContentBriefRepo;

impl ContentBriefRepo {
    /// Insert a `draft` brief. A missing title falls back to the target keyword.
    pub async fn create(
        pool: &PgPool,
        project_id: DbId,
        input: &CreateContentBrief,
        created_by: Option<DbId>,
    ) -> Result<ContentBrief, sqlx::Error> {
        let query = format!(
            "INSERT INTO content_briefs (project_id, keyword_id, target_keyword, title, created_by)
             VALUES ($1, $2, $3, COALESCE($4, $3), $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ContentBrief>(&query)
            .bind(project_id)
            .bind(input.keyword_id)
            .bind(&input.target_keyword)
            .bind(&input.title)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
    ) -> Result<Option<ContentBrief>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM content_briefs WHERE id = $1 AND project_id = $2");
        sqlx::query_as::<_, ContentBrief>(&query)
            .bind(id)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }

    /// Find a brief by id as long as its project belongs to `workspace_id`.
    pub async fn find_in_workspace(
        pool: &PgPool,
        workspace_id: DbId,
        id: DbId,
    ) -> Result<Option<ContentBrief>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM content_briefs
             WHERE id = $1
               AND project_id IN (SELECT id FROM projects WHERE workspace_id = $2)"
        );
        sqlx::query_as::<_, ContentBrief>(&query)
            .bind(id)
            .bind(workspace_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool, project_id: DbId) -> Result<Vec<ContentBrief>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM content_briefs WHERE project_id = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, ContentBrief>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
        input: &UpdateContentBrief,
    ) -> Result<Option<ContentBrief>, sqlx::Error> {
        let query = format!(
            "UPDATE content_briefs SET
                target_keyword = COALESCE($3, target_keyword),
                title = COALESCE($4, title),
                content = COALESCE($5, content)
             WHERE id = $1 AND project_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ContentBrief>(&query)
            .bind(id)
            .bind(project_id)
            .bind(&input.target_keyword)
            .bind(&input.title)
            .bind(&input.content)
            .fetch_optional(pool)
            .await
    }

    /// Flip a brief to `generating` unless a generation is already running.
    ///
    /// Returns `None` when the brief is already `generating`, unless its last
    /// update is older than `stale_after_secs` (an abandoned generation).
    pub async fn start_generation(
        pool: &PgPool,
        id: DbId,
        stale_after_secs: i64,
    ) -> Result<Option<ContentBrief>, sqlx::Error> {
        let query = format!(
            "UPDATE content_briefs SET status = $2
             WHERE id = $1
               AND (status <> $2 OR updated_at < NOW() - make_interval(secs => $3))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ContentBrief>(&query)
            .bind(id)
            .bind(brief_status::GENERATING)
            .bind(stale_after_secs as f64)
            .fetch_optional(pool)
            .await
    }

    /// Store generated content and mark the brief `ready`.
    pub async fn finish_generation(
        pool: &PgPool,
        id: DbId,
        content: &str,
        llm_provider: &str,
    ) -> Result<ContentBrief, sqlx::Error> {
        let query = format!(
            "UPDATE content_briefs SET status = $2, content = $3, llm_provider = $4
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ContentBrief>(&query)
            .bind(id)
            .bind(brief_status::READY)
            .bind(content)
            .bind(llm_provider)
            .fetch_one(pool)
            .await
    }

    /// Mark a generation as failed, keeping any previous content.
    pub async fn fail_generation(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE content_briefs SET status = $2 WHERE id = $1")
            .bind(id)
            .bind(brief_status::FAILED)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn delete(pool: &PgPool, project_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM content_briefs WHERE id = $1 AND project_id = $2")
            .bind(id)
            .bind(project_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
