//! Handlers for `/workspaces/{workspace_id}/projects/{project_id}/briefs`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use rankforge_core::error::CoreError;
use rankforge_core::integrations::{IntegrationProvider, ResolvedKey};
use rankforge_core::llm::{
    build_brief_prompt, CompetitorPage, LlmProvider, BRIEF_MAX_COMPETITORS, BRIEF_MAX_TOKENS,
};
use rankforge_core::types::DbId;
use rankforge_core::usage::event_types;
use rankforge_db::models::content_brief::{ContentBrief, CreateContentBrief, UpdateContentBrief};
use rankforge_db::repositories::{ContentBriefRepo, KeywordRepo};
use rankforge_integrations::llm::generator_for;
use rankforge_integrations::serp::SerpClient;
use serde_json::json;
use validator::Validate;

use super::project::find_project;
use crate::error::{AppError, AppResult};
use crate::middleware::workspace::{WsMember, WsViewer};
use crate::response::DataResponse;
use crate::services::keys::{resolve_key, select_llm};
use crate::services::plan::load_workspace;
use crate::services::usage;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "ContentBrief",
        id,
    })
}

/// POST /api/v1/workspaces/{workspace_id}/projects/{project_id}/briefs
pub async fn create(
    State(state): State<AppState>,
    WsMember(access): WsMember,
    Path((_workspace_id, project_id)): Path<(DbId, DbId)>,
    Json(input): Json<CreateContentBrief>,
) -> AppResult<(StatusCode, Json<ContentBrief>)> {
    input.validate()?;
    let project = find_project(&state, access.workspace_id, project_id).await?;

    if let Some(keyword_id) = input.keyword_id {
        KeywordRepo::find_by_id(&state.pool, project.id, keyword_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Keyword",
                id: keyword_id,
            }))?;
    }

    let brief =
        ContentBriefRepo::create(&state.pool, project.id, &input, Some(access.user_id())).await?;
    Ok((StatusCode::CREATED, Json(brief)))
}

/// GET /api/v1/workspaces/{workspace_id}/projects/{project_id}/briefs
pub async fn list(
    State(state): State<AppState>,
    WsViewer(access): WsViewer,
    Path((_workspace_id, project_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<Vec<ContentBrief>>>> {
    let project = find_project(&state, access.workspace_id, project_id).await?;
    let briefs = ContentBriefRepo::list(&state.pool, project.id).await?;
    Ok(Json(DataResponse { data: briefs }))
}

/// GET /api/v1/workspaces/{workspace_id}/projects/{project_id}/briefs/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    WsViewer(access): WsViewer,
    Path((_workspace_id, project_id, id)): Path<(DbId, DbId, DbId)>,
) -> AppResult<Json<ContentBrief>> {
    let project = find_project(&state, access.workspace_id, project_id).await?;
    let brief = ContentBriefRepo::find_by_id(&state.pool, project.id, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(brief))
}

/// PUT /api/v1/workspaces/{workspace_id}/projects/{project_id}/briefs/{id}
pub async fn update(
    State(state): State<AppState>,
    WsMember(access): WsMember,
    Path((_workspace_id, project_id, id)): Path<(DbId, DbId, DbId)>,
    Json(input): Json<UpdateContentBrief>,
) -> AppResult<Json<ContentBrief>> {
    input.validate()?;
    let project = find_project(&state, access.workspace_id, project_id).await?;
    let brief = ContentBriefRepo::update(&state.pool, project.id, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(brief))
}

/// DELETE /api/v1/workspaces/{workspace_id}/projects/{project_id}/briefs/{id}
pub async fn delete(
    State(state): State<AppState>,
    WsMember(access): WsMember,
    Path((_workspace_id, project_id, id)): Path<(DbId, DbId, DbId)>,
) -> AppResult<StatusCode> {
    let project = find_project(&state, access.workspace_id, project_id).await?;
    if ContentBriefRepo::delete(&state.pool, project.id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

/// POST /api/v1/workspaces/{workspace_id}/projects/{project_id}/briefs/{id}/generate
///
/// Generates the brief body with the workspace's LLM provider, using the
/// current top search results as competitor context when a SERP key exists.
pub async fn generate(
    State(state): State<AppState>,
    WsMember(access): WsMember,
    Path((_workspace_id, project_id, id)): Path<(DbId, DbId, DbId)>,
) -> AppResult<Json<ContentBrief>> {
    let project = find_project(&state, access.workspace_id, project_id).await?;
    let brief = ContentBriefRepo::find_by_id(&state.pool, project.id, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let workspace = load_workspace(&state.pool, access.workspace_id).await?;
    let (provider, key) =
        select_llm(&state, access.workspace_id, workspace.preferred_llm_provider.as_deref())
            .await?;

    ContentBriefRepo::start_generation(&state.pool, brief.id, generation_stale_after(&state))
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict(
                "This brief is already being generated".into(),
            ))
        })?;

    // Detached so the brief leaves `generating` even if this request is dropped.
    let job = GenerationJob {
        workspace_id: access.workspace_id,
        user_id: access.user_id(),
        provider,
        key,
        project_domain: project.domain.clone(),
        brief,
    };
    tokio::spawn(settle_generation(state, job))
        .await
        .map_err(|e| AppError::InternalError(format!("Brief generation task failed: {e}")))?
        .map(Json)
}

/// Seconds after which a `generating` brief is considered abandoned: the
/// SERP lookup and the LLM call may each use the full outbound timeout.
fn generation_stale_after(state: &AppState) -> i64 {
    let outbound = state.config.outbound_timeout_secs as i64;
    2 * outbound + state.config.request_timeout_secs as i64
}

struct GenerationJob {
    workspace_id: DbId,
    user_id: DbId,
    provider: LlmProvider,
    key: ResolvedKey,
    project_domain: Option<String>,
    brief: ContentBrief,
}

async fn settle_generation(state: AppState, job: GenerationJob) -> AppResult<ContentBrief> {
    let GenerationJob {
        workspace_id,
        user_id,
        provider,
        key,
        project_domain,
        brief,
    } = job;

    let competitors = competitor_pages(&state, workspace_id, &brief.target_keyword).await;
    let prompt = build_brief_prompt(
        &brief.target_keyword,
        &brief.title,
        project_domain.as_deref(),
        &competitors,
    );

    let generator = generator_for(provider, state.http.clone(), &state.config.endpoints.llm, &key.key);
    let content = match generator.generate(&prompt, BRIEF_MAX_TOKENS).await {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(brief_id = brief.id, provider = provider.as_str(), error = %e, "Brief generation failed");
            ContentBriefRepo::fail_generation(&state.pool, brief.id).await?;
            return Err(AppError::Integration(e));
        }
    };

    let generated =
        match ContentBriefRepo::finish_generation(&state.pool, brief.id, &content, provider.as_str())
            .await
        {
            Ok(generated) => generated,
            Err(e) => {
                if let Err(fail_err) = ContentBriefRepo::fail_generation(&state.pool, brief.id).await {
                    tracing::error!(brief_id = brief.id, error = %fail_err, "Could not mark brief failed");
                }
                return Err(e.into());
            }
        };

    usage::record(
        &state.pool,
        workspace_id,
        Some(user_id),
        event_types::BRIEF_GENERATED,
        Some(json!({
            "brief_id": brief.id,
            "provider": provider.as_str(),
            "key_source": key.source,
        })),
    )
    .await;

    tracing::info!(
        brief_id = brief.id,
        provider = provider.as_str(),
        competitors = competitors.len(),
        "Brief generated"
    );
    Ok(generated)
}

/// Top search results for the target keyword; empty when SERP is unavailable.
async fn competitor_pages(state: &AppState, workspace_id: DbId, keyword: &str) -> Vec<CompetitorPage> {
    let key = match resolve_key(state, workspace_id, IntegrationProvider::Serp).await {
        Ok(Some(key)) => key,
        Ok(None) => return Vec::new(),
        Err(e) => {
            tracing::warn!(workspace_id, error = %e, "Could not resolve SERP key for brief");
            return Vec::new();
        }
    };

    let serp = SerpClient::new(state.http.clone(), &state.config.endpoints.serp, key.key.as_str());
    match serp.search(keyword, BRIEF_MAX_COMPETITORS).await {
        Ok(results) => results
            .into_iter()
            .map(|r| CompetitorPage {
                position: r.position,
                title: r.title,
                url: r.url,
            })
            .collect(),
        Err(e) => {
            tracing::warn!(workspace_id, error = %e, "SERP lookup for brief failed");
            Vec::new()
        }
    }
}
