//! Repository for the `documents` table.

use rankforge_core::content::document_status;
use rankforge_core::types::DbId;
use sqlx::PgPool;

use crate::models::document::{CreateDocument, Document, DocumentFilter, UpdateDocument};

const COLUMNS: &str = "id, workspace_id, project_id, brief_id, title, content, word_count, \
                       status, created_by, created_at, updated_at";

pub struct DocumentRepo;

impl DocumentRepo {
    /// Insert a document. `word_count` is computed by the caller from the content.
    pub async fn create(
        pool: &PgPool,
        workspace_id: DbId,
        input: &CreateDocument,
        word_count: i32,
        created_by: Option<DbId>,
    ) -> Result<Document, sqlx::Error> {
        let query = format!(
            "INSERT INTO documents
                (workspace_id, project_id, brief_id, title, content, word_count, status, created_by)
             VALUES ($1, $2, $3, $4, COALESCE($5, ''), $6, COALESCE($7, $8), $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(workspace_id)
            .bind(input.project_id)
            .bind(input.brief_id)
            .bind(&input.title)
            .bind(&input.content)
            .bind(word_count)
            .bind(&input.status)
            .bind(document_status::DRAFT)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        workspace_id: DbId,
        id: DbId,
    ) -> Result<Option<Document>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM documents WHERE id = $1 AND workspace_id = $2");
        sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .bind(workspace_id)
            .fetch_optional(pool)
            .await
    }

    /// List documents, most recently updated first, with optional filters.
    pub async fn list(
        pool: &PgPool,
        workspace_id: DbId,
        filter: &DocumentFilter,
    ) -> Result<Vec<Document>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM documents
             WHERE workspace_id = $1
               AND ($2::text IS NULL OR status = $2)
               AND ($3::bigint IS NULL OR project_id = $3)
             ORDER BY updated_at DESC"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(workspace_id)
            .bind(&filter.status)
            .bind(filter.project_id)
            .fetch_all(pool)
            .await
    }

    /// Update a document. `word_count` is recomputed by the caller whenever
    /// `content` changes.
    pub async fn update(
        pool: &PgPool,
        workspace_id: DbId,
        id: DbId,
        input: &UpdateDocument,
        word_count: Option<i32>,
    ) -> Result<Option<Document>, sqlx::Error> {
        let query = format!(
            "UPDATE documents SET
                title = COALESCE($3, title),
                content = COALESCE($4, content),
                word_count = COALESCE($5, word_count),
                status = COALESCE($6, status),
                project_id = COALESCE($7, project_id)
             WHERE id = $1 AND workspace_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .bind(workspace_id)
            .bind(&input.title)
            .bind(&input.content)
            .bind(word_count)
            .bind(&input.status)
            .bind(input.project_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, workspace_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1 AND workspace_id = $2")
            .bind(id)
            .bind(workspace_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
