//! Bring-your-own-key resolution.
//!
//! A workspace's enabled, decryptable integration config wins; otherwise the
//! platform key from the environment; otherwise the integration is not
//! configured.

use rankforge_core::error::CoreError;
use rankforge_core::integrations::{resolve_api_key, IntegrationProvider, ResolvedKey};
use rankforge_core::llm::{select_provider, LlmProvider, PROVIDER_ORDER};
use rankforge_core::types::DbId;
use rankforge_db::repositories::IntegrationConfigRepo;

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Resolve the key for `provider` in `workspace_id`, or `None`.
///
/// A stored config that fails to decrypt is logged and skipped.
pub async fn resolve_key(
    state: &AppState,
    workspace_id: DbId,
    provider: IntegrationProvider,
) -> AppResult<Option<ResolvedKey>> {
    let config =
        IntegrationConfigRepo::find_enabled(&state.pool, workspace_id, provider.as_str()).await?;

    let credentials = config.and_then(|c| {
        match state.cipher.decrypt::<serde_json::Value>(&c.encrypted_credentials) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(
                    workspace_id,
                    provider = %provider,
                    error = %e,
                    "Stored credentials could not be decrypted, using platform key"
                );
                None
            }
        }
    });

    Ok(resolve_api_key(
        credentials.as_ref(),
        state.config.platform_keys.get(provider),
    ))
}

/// Like [`resolve_key`] but fails with "integration not configured".
pub async fn require_key(
    state: &AppState,
    workspace_id: DbId,
    provider: IntegrationProvider,
) -> AppResult<ResolvedKey> {
    resolve_key(state, workspace_id, provider)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotConfigured(format!(
                "No {provider} API key is configured for this workspace"
            )))
        })
}

/// Pick the LLM provider for a workspace and resolve its key.
///
/// The stored preference comes first, then the fixed provider order.
pub async fn select_llm(
    state: &AppState,
    workspace_id: DbId,
    preferred: Option<&str>,
) -> AppResult<(LlmProvider, ResolvedKey)> {
    let mut resolved: Vec<(LlmProvider, ResolvedKey)> = Vec::new();
    for provider in PROVIDER_ORDER {
        if let Some(key) = resolve_key(state, workspace_id, provider.integration()).await? {
            resolved.push((provider, key));
        }
    }

    let available: Vec<LlmProvider> = resolved.iter().map(|(p, _)| *p).collect();
    let chosen = select_provider(preferred.and_then(LlmProvider::parse), &available)
        .ok_or_else(|| {
            AppError::Core(CoreError::NotConfigured(
                "No AI provider is configured for this workspace".into(),
            ))
        })?;

    resolved
        .into_iter()
        .find(|(p, _)| *p == chosen)
        .ok_or_else(|| AppError::InternalError("Selected provider has no key".into()))
}
