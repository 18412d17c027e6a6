//! Repository for the `clients` table.

use rankforge_core::types::DbId;
use sqlx::PgPool;

use crate::models::client::{Client, CreateClient, UpdateClient};

const COLUMNS: &str =
    "id, workspace_id, name, contact_email, website, notes, created_at, updated_at";

/// Provides CRUD operations for clients, always scoped to a workspace.
pub struct ClientRepo;

impl ClientRepo {
    pub async fn create(
        pool: &PgPool,
        workspace_id: DbId,
        input: &CreateClient,
    ) -> Result<Client, sqlx::Error> {
        let query = format!(
            "INSERT INTO clients (workspace_id, name, contact_email, website, notes)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Client>(&query)
            .bind(workspace_id)
            .bind(&input.name)
            .bind(&input.contact_email)
            .bind(&input.website)
            .bind(&input.notes)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        workspace_id: DbId,
        id: DbId,
    ) -> Result<Option<Client>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM clients WHERE id = $1 AND workspace_id = $2");
        sqlx::query_as::<_, Client>(&query)
            .bind(id)
            .bind(workspace_id)
            .fetch_optional(pool)
            .await
    }

    /// List a workspace's clients alphabetically.
    pub async fn list(pool: &PgPool, workspace_id: DbId) -> Result<Vec<Client>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM clients WHERE workspace_id = $1 ORDER BY name ASC");
        sqlx::query_as::<_, Client>(&query)
            .bind(workspace_id)
            .fetch_all(pool)
            .await
    }

    /// Update a client. Only non-`None` fields in `input` are applied.
    pub async fn update(
        pool: &PgPool,
        workspace_id: DbId,
        id: DbId,
        input: &UpdateClient,
    ) -> Result<Option<Client>, sqlx::Error> {
        let query = format!(
            "UPDATE clients SET
                name = COALESCE($3, name),
                contact_email = COALESCE($4, contact_email),
                website = COALESCE($5, website),
                notes = COALESCE($6, notes)
             WHERE id = $1 AND workspace_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Client>(&query)
            .bind(id)
            .bind(workspace_id)
            .bind(&input.name)
            .bind(&input.contact_email)
            .bind(&input.website)
            .bind(&input.notes)
            .fetch_optional(pool)
            .await
    }

    /// Delete a client. Its projects keep existing with `client_id = NULL`.
    pub async fn delete(pool: &PgPool, workspace_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1 AND workspace_id = $2")
            .bind(id)
            .bind(workspace_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
