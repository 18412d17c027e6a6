//! Repository for the `integration_configs` table.

use rankforge_core::types::DbId;
use sqlx::PgPool;

use crate::models::integration_config::{IntegrationConfig, UpsertIntegrationConfig};

const COLUMNS: &str = "id, workspace_id, provider, encrypted_credentials, credential_hint, \
                       is_enabled, created_at, updated_at";

pub struct IntegrationConfigRepo;

impl IntegrationConfigRepo {
    /// Insert or replace the workspace's credentials for a provider.
    pub async fn upsert(
        pool: &PgPool,
        input: &UpsertIntegrationConfig,
    ) -> Result<IntegrationConfig, sqlx::Error> {
        let query = format!(
            "INSERT INTO integration_configs
                (workspace_id, provider, encrypted_credentials, credential_hint, is_enabled)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (workspace_id, provider) DO UPDATE SET
                encrypted_credentials = EXCLUDED.encrypted_credentials,
                credential_hint = EXCLUDED.credential_hint,
                is_enabled = EXCLUDED.is_enabled
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, IntegrationConfig>(&query)
            .bind(input.workspace_id)
            .bind(&input.provider)
            .bind(&input.encrypted_credentials)
            .bind(&input.credential_hint)
            .bind(input.is_enabled)
            .fetch_one(pool)
            .await
    }

    pub async fn list(
        pool: &PgPool,
        workspace_id: DbId,
    ) -> Result<Vec<IntegrationConfig>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM integration_configs WHERE workspace_id = $1 ORDER BY provider"
        );
        sqlx::query_as::<_, IntegrationConfig>(&query)
            .bind(workspace_id)
            .fetch_all(pool)
            .await
    }

    /// The workspace's config for `provider`, only if it is enabled.
    pub async fn find_enabled(
        pool: &PgPool,
        workspace_id: DbId,
        provider: &str,
    ) -> Result<Option<IntegrationConfig>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM integration_configs
             WHERE workspace_id = $1 AND provider = $2 AND is_enabled = true"
        );
        sqlx::query_as::<_, IntegrationConfig>(&query)
            .bind(workspace_id)
            .bind(provider)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(
        pool: &PgPool,
        workspace_id: DbId,
        provider: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM integration_configs WHERE workspace_id = $1 AND provider = $2",
        )
        .bind(workspace_id)
        .bind(provider)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
