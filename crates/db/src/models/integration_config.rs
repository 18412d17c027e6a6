//! Per-workspace integration credentials.
//!
//! Credentials are only ever stored encrypted; the API exposes
//! [`IntegrationConfigResponse`], which carries a hint instead.

use rankforge_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct IntegrationConfig {
    pub id: DbId,
    pub workspace_id: DbId,
    pub provider: String,
    pub encrypted_credentials: String,
    pub credential_hint: Option<String>,
    pub is_enabled: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Serialize)]
pub struct IntegrationConfigResponse {
    pub provider: String,
    pub credential_hint: Option<String>,
    pub is_enabled: bool,
    pub updated_at: Timestamp,
}

impl From<&IntegrationConfig> for IntegrationConfigResponse {
    fn from(config: &IntegrationConfig) -> Self {
        Self {
            provider: config.provider.clone(),
            credential_hint: config.credential_hint.clone(),
            is_enabled: config.is_enabled,
            updated_at: config.updated_at,
        }
    }
}

/// Request body for `PUT /integrations/{provider}`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertIntegrationRequest {
    /// Provider-specific credential object, e.g. `{"api_key": "..."}`.
    pub credentials: serde_json::Value,
    pub is_enabled: Option<bool>,
}

/// Values written by [`IntegrationConfigRepo::upsert`](crate::repositories::IntegrationConfigRepo::upsert).
#[derive(Debug, Clone)]
pub struct UpsertIntegrationConfig {
    pub workspace_id: DbId,
    pub provider: String,
    pub encrypted_credentials: String,
    pub credential_hint: Option<String>,
    pub is_enabled: bool,
}
