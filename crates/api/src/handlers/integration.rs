//! Handlers for `/workspaces/{workspace_id}/integrations`.
//!
//! Credentials are encrypted before they reach the database and are never
//! returned; responses carry a masked hint of the key instead.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use rankforge_core::audit_log::actions;
use rankforge_core::error::CoreError;
use rankforge_core::integrations::{api_key_from_credentials, credential_hint, IntegrationProvider};
use rankforge_core::types::DbId;
use rankforge_db::models::integration_config::{
    IntegrationConfigResponse, UpsertIntegrationConfig, UpsertIntegrationRequest,
};
use rankforge_db::repositories::IntegrationConfigRepo;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::middleware::workspace::{WsAdmin, WsViewer};
use crate::response::DataResponse;
use crate::services::audit::{self, AuditEntry};
use crate::state::AppState;

fn parse_provider(value: &str) -> AppResult<IntegrationProvider> {
    IntegrationProvider::parse(value).ok_or_else(|| {
        let known: Vec<&str> = IntegrationProvider::ALL.iter().map(|p| p.as_str()).collect();
        AppError::Core(CoreError::Validation(format!(
            "Unknown provider '{value}'. Expected one of: {}",
            known.join(", ")
        )))
    })
}

/// GET /api/v1/workspaces/{workspace_id}/integrations
pub async fn list(
    State(state): State<AppState>,
    WsViewer(access): WsViewer,
) -> AppResult<Json<DataResponse<Vec<IntegrationConfigResponse>>>> {
    let configs = IntegrationConfigRepo::list(&state.pool, access.workspace_id).await?;
    let data = configs.iter().map(IntegrationConfigResponse::from).collect();
    Ok(Json(DataResponse { data }))
}

/// PUT /api/v1/workspaces/{workspace_id}/integrations/{provider}
pub async fn upsert(
    State(state): State<AppState>,
    WsAdmin(access): WsAdmin,
    Path((_workspace_id, provider)): Path<(DbId, String)>,
    Json(input): Json<UpsertIntegrationRequest>,
) -> AppResult<Json<IntegrationConfigResponse>> {
    let provider = parse_provider(&provider)?;
    if api_key_from_credentials(&input.credentials).is_none() {
        return Err(AppError::Core(CoreError::Validation(
            "credentials.api_key is required".into(),
        )));
    }

    let encrypted = state.cipher.encrypt(&input.credentials)?;
    let config = IntegrationConfigRepo::upsert(
        &state.pool,
        &UpsertIntegrationConfig {
            workspace_id: access.workspace_id,
            provider: provider.as_str().to_string(),
            encrypted_credentials: encrypted,
            credential_hint: credential_hint(&input.credentials),
            is_enabled: input.is_enabled.unwrap_or(true),
        },
    )
    .await?;

    tracing::info!(
        workspace_id = access.workspace_id,
        provider = %provider,
        enabled = config.is_enabled,
        "Integration credentials saved"
    );
    // `credentials` is stored as a redaction placeholder.
    audit::record(
        &state.pool,
        AuditEntry::new(access.workspace_id, Some(access.user_id()), actions::INTEGRATION_UPSERT)
            .entity("integration_config", config.id)
            .details(json!({
                "provider": provider.as_str(),
                "is_enabled": config.is_enabled,
                "credentials": input.credentials,
            })),
    )
    .await;

    Ok(Json(IntegrationConfigResponse::from(&config)))
}

/// DELETE /api/v1/workspaces/{workspace_id}/integrations/{provider}
pub async fn delete(
    State(state): State<AppState>,
    WsAdmin(access): WsAdmin,
    Path((_workspace_id, provider)): Path<(DbId, String)>,
) -> AppResult<StatusCode> {
    let provider = parse_provider(&provider)?;
    let removed =
        IntegrationConfigRepo::delete(&state.pool, access.workspace_id, provider.as_str()).await?;
    if !removed {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "IntegrationConfig",
            id: access.workspace_id,
        }));
    }

    audit::record(
        &state.pool,
        AuditEntry::new(access.workspace_id, Some(access.user_id()), actions::INTEGRATION_DELETE)
            .details(json!({ "provider": provider.as_str() })),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}
