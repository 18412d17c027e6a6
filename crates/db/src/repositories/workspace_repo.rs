//! Repository for the `workspaces` and `workspace_members` tables.

use rankforge_core::roles::WorkspaceRole;
use rankforge_core::types::DbId;
use sqlx::PgPool;

use crate::models::workspace::{
    MemberWithUser, UpdateWorkspace, Workspace, WorkspaceMember, WorkspaceWithRole,
};

pub(crate) const COLUMNS: &str =
    "id, name, slug, owner_id, plan, preferred_llm_provider, created_at, updated_at";

const MEMBER_COLUMNS: &str = "id, workspace_id, user_id, role, created_at, updated_at";

pub struct WorkspaceRepo;

impl WorkspaceRepo {
    /// Create a workspace and its owner membership in one transaction.
    pub async fn create_with_owner(
        pool: &PgPool,
        name: &str,
        slug: &str,
        owner_id: DbId,
        preferred_llm_provider: Option<&str>,
    ) -> Result<Workspace, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO workspaces (name, slug, owner_id, preferred_llm_provider)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let workspace = sqlx::query_as::<_, Workspace>(&query)
            .bind(name)
            .bind(slug)
            .bind(owner_id)
            .bind(preferred_llm_provider)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO workspace_members (workspace_id, user_id, role) VALUES ($1, $2, $3)",
        )
        .bind(workspace.id)
        .bind(owner_id)
        .bind(WorkspaceRole::Owner.as_str())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(workspace)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Workspace>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM workspaces WHERE id = $1");
        sqlx::query_as::<_, Workspace>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Workspaces the user belongs to, with their role, oldest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<WorkspaceWithRole>, sqlx::Error> {
        sqlx::query_as::<_, WorkspaceWithRole>(
            "SELECT w.id, w.name, w.slug, w.owner_id, w.plan, w.preferred_llm_provider,
                    m.role, w.created_at, w.updated_at
             FROM workspaces w
             JOIN workspace_members m ON m.workspace_id = w.id
             WHERE m.user_id = $1
             ORDER BY w.created_at ASC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Update a workspace. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateWorkspace,
    ) -> Result<Option<Workspace>, sqlx::Error> {
        let query = format!(
            "UPDATE workspaces SET
                name = COALESCE($2, name),
                preferred_llm_provider = COALESCE($3, preferred_llm_provider)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Workspace>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.preferred_llm_provider)
            .fetch_optional(pool)
            .await
    }

    /// Set the workspace's plan. Returns `true` if the row was updated.
    pub async fn set_plan(pool: &PgPool, id: DbId, plan: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE workspaces SET plan = $2 WHERE id = $1")
            .bind(id)
            .bind(plan)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a workspace and, through cascades, everything it owns.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM workspaces WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Members
    // -----------------------------------------------------------------------

    /// The user's role in the workspace, or `None` if they are not a member.
    pub async fn find_member_role(
        pool: &PgPool,
        workspace_id: DbId,
        user_id: DbId,
    ) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT role FROM workspace_members WHERE workspace_id = $1 AND user_id = $2",
        )
        .bind(workspace_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn list_members(
        pool: &PgPool,
        workspace_id: DbId,
    ) -> Result<Vec<MemberWithUser>, sqlx::Error> {
        sqlx::query_as::<_, MemberWithUser>(
            "SELECT m.user_id, u.email, u.name, m.role, m.created_at
             FROM workspace_members m
             JOIN users u ON u.id = m.user_id
             WHERE m.workspace_id = $1
             ORDER BY m.created_at ASC",
        )
        .bind(workspace_id)
        .fetch_all(pool)
        .await
    }

    /// Add a member. Fails with a unique violation if they already belong.
    pub async fn add_member(
        pool: &PgPool,
        workspace_id: DbId,
        user_id: DbId,
        role: &str,
    ) -> Result<WorkspaceMember, sqlx::Error> {
        let query = format!(
            "INSERT INTO workspace_members (workspace_id, user_id, role)
             VALUES ($1, $2, $3)
             RETURNING {MEMBER_COLUMNS}"
        );
        sqlx::query_as::<_, WorkspaceMember>(&query)
            .bind(workspace_id)
            .bind(user_id)
            .bind(role)
            .fetch_one(pool)
            .await
    }

    pub async fn update_member_role(
        pool: &PgPool,
        workspace_id: DbId,
        user_id: DbId,
        role: &str,
    ) -> Result<Option<WorkspaceMember>, sqlx::Error> {
        let query = format!(
            "UPDATE workspace_members SET role = $3
             WHERE workspace_id = $1 AND user_id = $2
             RETURNING {MEMBER_COLUMNS}"
        );
        sqlx::query_as::<_, WorkspaceMember>(&query)
            .bind(workspace_id)
            .bind(user_id)
            .bind(role)
            .fetch_optional(pool)
            .await
    }

    pub async fn remove_member(
        pool: &PgPool,
        workspace_id: DbId,
        user_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM workspace_members WHERE workspace_id = $1 AND user_id = $2")
                .bind(workspace_id)
                .bind(user_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
