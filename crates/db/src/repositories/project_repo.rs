//! Repository for the `projects` table.

use rankforge_core::types::DbId;
use sqlx::PgPool;

use crate::models::project::{CreateProject, Project, UpdateProject};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, workspace_id, client_id, name, domain, description, keyword_count, \
                       created_at, updated_at";

/// Provides CRUD operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project, returning the created row.
    ///
    /// `input.domain` is stored as given; callers normalize it first.
    pub async fn create(
        pool: &PgPool,
        workspace_id: DbId,
        input: &CreateProject,
    ) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects (workspace_id, client_id, name, domain, description)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(workspace_id)
            .bind(input.client_id)
            .bind(&input.name)
            .bind(&input.domain)
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    /// Find a project by ID within a workspace.
    pub async fn find_by_id(
        pool: &PgPool,
        workspace_id: DbId,
        id: DbId,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = $1 AND workspace_id = $2");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(workspace_id)
            .fetch_optional(pool)
            .await
    }

    /// List a workspace's projects, most recently created first.
    pub async fn list(pool: &PgPool, workspace_id: DbId) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects WHERE workspace_id = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(workspace_id)
            .fetch_all(pool)
            .await
    }

    pub async fn count_for_workspace(pool: &PgPool, workspace_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM projects WHERE workspace_id = $1")
            .bind(workspace_id)
            .fetch_one(pool)
            .await
    }

    /// Update a project. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists in the workspace.
    pub async fn update(
        pool: &PgPool,
        workspace_id: DbId,
        id: DbId,
        input: &UpdateProject,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                name = COALESCE($3, name),
                domain = COALESCE($4, domain),
                description = COALESCE($5, description),
                client_id = COALESCE($6, client_id)
             WHERE id = $1 AND workspace_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(workspace_id)
            .bind(&input.name)
            .bind(&input.domain)
            .bind(&input.description)
            .bind(input.client_id)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete a project (keywords, audits and briefs cascade).
    pub async fn delete(pool: &PgPool, workspace_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1 AND workspace_id = $2")
            .bind(id)
            .bind(workspace_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
