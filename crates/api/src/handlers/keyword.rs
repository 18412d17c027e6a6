//! Handlers for `/workspaces/{workspace_id}/projects/{project_id}/keywords`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use futures::stream::{self, StreamExt};
use rankforge_core::error::CoreError;
use rankforge_core::integrations::{IntegrationProvider, KeySource};
use rankforge_core::keywords::{
    apply_rank_observation, find_domain_position, normalize_batch, RANK_CHECK_DEPTH,
};
use rankforge_core::plans::ensure_within_limit;
use rankforge_core::types::DbId;
use rankforge_core::usage::event_types;
use rankforge_db::models::keyword::{
    CheckKeywords, CreateKeywords, Keyword, KeywordBatchResult, UpdateKeyword,
};
use rankforge_db::repositories::KeywordRepo;
use rankforge_integrations::serp::SerpClient;
use rankforge_integrations::IntegrationError;
use serde::Serialize;
use serde_json::json;
use validator::Validate;

use super::project::find_project;
use crate::error::{AppError, AppResult};
use crate::middleware::workspace::{WsMember, WsViewer};
use crate::response::DataResponse;
use crate::services::keys::require_key;
use crate::services::plan::{load_workspace, plan_of};
use crate::services::usage;
use crate::state::AppState;

/// SERP requests in flight at once during a bulk check.
const CHECK_CONCURRENCY: usize = 4;

#[derive(Debug, Serialize)]
pub struct CheckFailure {
    pub keyword_id: DbId,
    pub term: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct KeywordCheckResponse {
    pub checked: Vec<Keyword>,
    pub failed: Vec<CheckFailure>,
    pub key_source: KeySource,
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Keyword",
        id,
    })
}

/// POST /api/v1/workspaces/{workspace_id}/projects/{project_id}/keywords
///
/// Adds a batch of terms. Terms already tracked are reported as skipped.
pub async fn create_batch(
    State(state): State<AppState>,
    WsMember(access): WsMember,
    Path((_workspace_id, project_id)): Path<(DbId, DbId)>,
    Json(input): Json<CreateKeywords>,
) -> AppResult<(StatusCode, Json<KeywordBatchResult>)> {
    input.validate()?;
    let project = find_project(&state, access.workspace_id, project_id).await?;
    let terms = normalize_batch(&input.terms)?;

    let workspace = load_workspace(&state.pool, access.workspace_id).await?;
    ensure_within_limit(
        "keywords per project",
        plan_of(&workspace).limits().max_keywords_per_project,
        i64::from(project.keyword_count),
        terms.len() as i64,
    )?;

    let created = KeywordRepo::create_batch(&state.pool, project.id, &terms).await?;
    let skipped: Vec<String> = terms
        .into_iter()
        .filter(|t| !created.iter().any(|k| &k.term == t))
        .collect();

    tracing::info!(
        project_id = project.id,
        created = created.len(),
        skipped = skipped.len(),
        "Keywords added"
    );
    Ok((StatusCode::CREATED, Json(KeywordBatchResult { created, skipped })))
}

/// GET /api/v1/workspaces/{workspace_id}/projects/{project_id}/keywords
pub async fn list(
    State(state): State<AppState>,
    WsViewer(access): WsViewer,
    Path((_workspace_id, project_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<DataResponse<Vec<Keyword>>>> {
    let project = find_project(&state, access.workspace_id, project_id).await?;
    let keywords = KeywordRepo::list(&state.pool, project.id).await?;
    Ok(Json(DataResponse { data: keywords }))
}

/// PUT /api/v1/workspaces/{workspace_id}/projects/{project_id}/keywords/{id}
pub async fn update(
    State(state): State<AppState>,
    WsMember(access): WsMember,
    Path((_workspace_id, project_id, id)): Path<(DbId, DbId, DbId)>,
    Json(input): Json<UpdateKeyword>,
) -> AppResult<Json<Keyword>> {
    input.validate()?;
    let project = find_project(&state, access.workspace_id, project_id).await?;
    let keyword = KeywordRepo::update(&state.pool, project.id, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(keyword))
}

/// DELETE /api/v1/workspaces/{workspace_id}/projects/{project_id}/keywords/{id}
pub async fn delete(
    State(state): State<AppState>,
    WsMember(access): WsMember,
    Path((_workspace_id, project_id, id)): Path<(DbId, DbId, DbId)>,
) -> AppResult<StatusCode> {
    let project = find_project(&state, access.workspace_id, project_id).await?;
    if KeywordRepo::delete(&state.pool, project.id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

/// POST /api/v1/workspaces/{workspace_id}/projects/{project_id}/keywords/check
///
/// Looks up each keyword in the search results and records where the
/// project's domain ranks. Individual SERP failures are reported per keyword.
pub async fn check(
    State(state): State<AppState>,
    WsMember(access): WsMember,
    Path((_workspace_id, project_id)): Path<(DbId, DbId)>,
    body: Option<Json<CheckKeywords>>,
) -> AppResult<Json<KeywordCheckResponse>> {
    let project = find_project(&state, access.workspace_id, project_id).await?;
    let domain = project.domain.clone().ok_or_else(|| {
        AppError::Core(CoreError::Validation(
            "Set a domain on the project before checking rankings".into(),
        ))
    })?;

    let input = body.map(|Json(b)| b).unwrap_or_default();
    let keywords = match input.keyword_ids.as_deref() {
        Some(ids) => KeywordRepo::list_by_ids(&state.pool, project.id, ids).await?,
        None => KeywordRepo::list(&state.pool, project.id).await?,
    };

    let key = require_key(&state, access.workspace_id, IntegrationProvider::Serp).await?;
    let serp = SerpClient::new(
        state.http.clone(),
        &state.config.endpoints.serp,
        key.key.as_str(),
    );

    let outcomes: Vec<(Keyword, Result<Option<i32>, IntegrationError>)> =
        stream::iter(keywords)
            .map(|keyword| {
                let serp = &serp;
                let domain = domain.as_str();
                async move {
                    let observed = serp
                        .search(&keyword.term, RANK_CHECK_DEPTH)
                        .await
                        .map(|results| {
                            find_domain_position(
                                results.iter().map(|r| (r.position, r.url.as_str())),
                                domain,
                            )
                        });
                    (keyword, observed)
                }
            })
            .buffer_unordered(CHECK_CONCURRENCY)
            .collect()
            .await;

    let mut checked = Vec::with_capacity(outcomes.len());
    let mut failed = Vec::new();
    for (keyword, observed) in outcomes {
        match observed {
            Ok(position) => {
                let update =
                    apply_rank_observation(keyword.current_position, keyword.best_position, position);
                if let Some(updated) = KeywordRepo::record_rank(&state.pool, keyword.id, &update).await? {
                    checked.push(updated);
                }
            }
            Err(e) => {
                tracing::warn!(keyword_id = keyword.id, error = %e, "Rank check failed");
                failed.push(CheckFailure {
                    keyword_id: keyword.id,
                    term: keyword.term,
                    error: e.to_string(),
                });
            }
        }
    }
    checked.sort_by(|a, b| a.term.cmp(&b.term));

    usage::record(
        &state.pool,
        access.workspace_id,
        Some(access.user_id()),
        event_types::KEYWORD_CHECK,
        Some(json!({ "project_id": project.id, "checked": checked.len(), "failed": failed.len() })),
    )
    .await;

    Ok(Json(KeywordCheckResponse {
        checked,
        failed,
        key_source: key.source,
    }))
}
