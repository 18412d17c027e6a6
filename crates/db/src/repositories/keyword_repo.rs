//! Repository for the `keywords` table.
//!
//! Inserts and deletes also adjust `projects.keyword_count` inside the same
//! transaction so the counter always matches the row count.

use rankforge_core::keywords::RankUpdate;
use rankforge_core::types::DbId;
use sqlx::PgPool;

use crate::models::keyword::{Keyword, UpdateKeyword};

const COLUMNS: &str = "id, project_id, term, search_volume, difficulty, current_position, \
                       previous_position, best_position, last_checked_at, created_at, updated_at";

pub struct KeywordRepo;

impl KeywordRepo {
    /// Insert already-normalized terms, skipping ones the project already
    /// tracks. Returns only the rows that were created.
    pub async fn create_batch(
        pool: &PgPool,
        project_id: DbId,
        terms: &[String],
    ) -> Result<Vec<Keyword>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO keywords (project_id, term)
             SELECT $1, t FROM UNNEST($2::text[]) AS t
             ON CONFLICT (project_id, term) DO NOTHING
             RETURNING {COLUMNS}"
        );
        let created = sqlx::query_as::<_, Keyword>(&query)
            .bind(project_id)
            .bind(terms)
            .fetch_all(&mut *tx)
            .await?;

        if !created.is_empty() {
            sqlx::query("UPDATE projects SET keyword_count = keyword_count + $2 WHERE id = $1")
                .bind(project_id)
                .bind(created.len() as i32)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(created)
    }

    pub async fn find_by_id(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
    ) -> Result<Option<Keyword>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM keywords WHERE id = $1 AND project_id = $2");
        sqlx::query_as::<_, Keyword>(&query)
            .bind(id)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }

    /// List a project's keywords alphabetically.
    pub async fn list(pool: &PgPool, project_id: DbId) -> Result<Vec<Keyword>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM keywords WHERE project_id = $1 ORDER BY term ASC");
        sqlx::query_as::<_, Keyword>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Keywords of the project whose id is in `ids`. Unknown ids are ignored.
    pub async fn list_by_ids(
        pool: &PgPool,
        project_id: DbId,
        ids: &[DbId],
    ) -> Result<Vec<Keyword>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM keywords
             WHERE project_id = $1 AND id = ANY($2)
             ORDER BY term ASC"
        );
        sqlx::query_as::<_, Keyword>(&query)
            .bind(project_id)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        project_id: DbId,
        id: DbId,
        input: &UpdateKeyword,
    ) -> Result<Option<Keyword>, sqlx::Error> {
        let query = format!(
            "UPDATE keywords SET
                search_volume = COALESCE($3, search_volume),
                difficulty = COALESCE($4, difficulty)
             WHERE id = $1 AND project_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Keyword>(&query)
            .bind(id)
            .bind(project_id)
            .bind(input.search_volume)
            .bind(input.difficulty)
            .fetch_optional(pool)
            .await
    }

    /// Store the result of a rank check and stamp `last_checked_at`.
    pub async fn record_rank(
        pool: &PgPool,
        id: DbId,
        update: &RankUpdate,
    ) -> Result<Option<Keyword>, sqlx::Error> {
        let query = format!(
            "UPDATE keywords SET
                current_position = $2,
                previous_position = $3,
                best_position = $4,
                last_checked_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Keyword>(&query)
            .bind(id)
            .bind(update.current_position)
            .bind(update.previous_position)
            .bind(update.best_position)
            .fetch_optional(pool)
            .await
    }

    /// Delete a keyword and decrement the project's counter.
    pub async fn delete(pool: &PgPool, project_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let result = sqlx::query("DELETE FROM keywords WHERE id = $1 AND project_id = $2")
            .bind(id)
            .bind(project_id)
            .execute(&mut *tx)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            sqlx::query("UPDATE projects SET keyword_count = keyword_count - 1 WHERE id = $1")
                .bind(project_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(deleted)
    }
}
