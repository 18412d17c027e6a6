//! Handlers for `/workspaces/{workspace_id}/projects/{project_id}/audits`.
//!
//! Running an audit: the URL must pass the fetcher's destination check, a
//! `pending` row is written, and a spawned task fetches and analyzes the
//! page, consults the page-performance API when a key is available and
//! completes the row. A failed fetch leaves the row `failed` with the error
//! message and that row is returned. The task outlives a dropped request, so
//! no row stays `pending`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{Datelike, TimeZone, Utc};
use rankforge_core::error::CoreError;
use rankforge_core::integrations::IntegrationProvider;
use rankforge_core::plans::ensure_within_limit;
use rankforge_core::seo_analyzer::{analyze_html, AnalysisReport};
use rankforge_core::types::{DbId, Timestamp};
use rankforge_core::usage::event_types;
use rankforge_db::models::seo_audit::{CompleteSeoAudit, CreateSeoAudit, SeoAudit};
use rankforge_db::repositories::SeoAuditRepo;
use rankforge_integrations::pagespeed::PageSpeedClient;
use serde_json::json;
use validator::Validate;

use super::project::find_project;
use crate::error::{AppError, AppResult};
use crate::middleware::workspace::{WsMember, WsViewer};
use crate::query::PaginationParams;
use crate::response::PageResponse;
use crate::services::keys::resolve_key;
use crate::services::plan::{load_workspace, plan_of};
use crate::services::usage;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "SeoAudit",
        id,
    })
}

/// 00:00 UTC on the first day of the month containing `now`.
pub fn month_start(now: Timestamp) -> Timestamp {
    let first = now.date_naive().with_day(1).unwrap_or(now.date_naive());
    Utc.from_utc_datetime(&first.and_time(chrono::NaiveTime::MIN))
}

/// POST /api/v1/workspaces/{workspace_id}/projects/{project_id}/audits
pub async fn run(
    State(state): State<AppState>,
    WsMember(access): WsMember,
    Path((_workspace_id, project_id)): Path<(DbId, DbId)>,
    body: Option<Json<CreateSeoAudit>>,
) -> AppResult<(StatusCode, Json<SeoAudit>)> {
    let input = body.map(|Json(b)| b).unwrap_or_default();
    input.validate()?;
    let project = find_project(&state, access.workspace_id, project_id).await?;

    let url = match (input.url, project.domain.as_deref()) {
        (Some(url), _) => url,
        (None, Some(domain)) => format!("https://{domain}/"),
        (None, None) => {
            return Err(AppError::Core(CoreError::Validation(
                "Provide a URL or set a domain on the project".into(),
            )))
        }
    };
    state.fetcher.check_destination(&url).await?;

    let workspace = load_workspace(&state.pool, access.workspace_id).await?;
    let this_month =
        SeoAuditRepo::count_for_workspace_since(&state.pool, access.workspace_id, month_start(Utc::now()))
            .await?;
    ensure_within_limit(
        "audits per month",
        plan_of(&workspace).limits().audits_per_month,
        this_month,
        1,
    )?;

    let audit =
        SeoAuditRepo::create_pending(&state.pool, project.id, &url, Some(access.user_id())).await?;

    usage::record(
        &state.pool,
        access.workspace_id,
        Some(access.user_id()),
        event_types::AUDIT_RUN,
        Some(json!({ "project_id": project.id, "audit_id": audit.id })),
    )
    .await;

    // Detached so the row is settled even if this request is dropped.
    let task = tokio::spawn(settle_audit(state, access.workspace_id, audit.id, url));
    let settled = task
        .await
        .map_err(|e| AppError::InternalError(format!("Audit task failed: {e}")))??;

    tracing::info!(
        audit_id = settled.id,
        project_id = project.id,
        status = %settled.status,
        score = ?settled.score,
        "Audit finished"
    );
    Ok((StatusCode::CREATED, Json(settled)))
}

/// Run the audit and leave the row `completed` or `failed`.
async fn settle_audit(
    state: AppState,
    workspace_id: DbId,
    audit_id: DbId,
    url: String,
) -> AppResult<SeoAudit> {
    match execute_audit(&state, workspace_id, audit_id, &url).await {
        Ok(audit) => Ok(audit),
        Err(AuditFailure::Page(message)) => {
            Ok(SeoAuditRepo::fail(&state.pool, audit_id, &message).await?)
        }
        Err(AuditFailure::Internal(e)) => {
            tracing::error!(audit_id, error = %e, "Audit aborted");
            if let Err(fail_err) =
                SeoAuditRepo::fail(&state.pool, audit_id, "Internal error while auditing").await
            {
                tracing::error!(audit_id, error = %fail_err, "Could not mark audit failed");
            }
            Err(e)
        }
    }
}

enum AuditFailure {
    /// The page could not be fetched; reported on the audit row.
    Page(String),
    Internal(AppError),
}

impl From<AppError> for AuditFailure {
    fn from(err: AppError) -> Self {
        AuditFailure::Internal(err)
    }
}

impl From<sqlx::Error> for AuditFailure {
    fn from(err: sqlx::Error) -> Self {
        AuditFailure::Internal(AppError::Database(err))
    }
}

async fn execute_audit(
    state: &AppState,
    workspace_id: DbId,
    audit_id: DbId,
    url: &str,
) -> Result<SeoAudit, AuditFailure> {
    let page = state.fetcher.fetch(url).await.map_err(|e| {
        tracing::warn!(audit_id, url, error = %e, "Audit page fetch failed");
        AuditFailure::Page(e.to_string())
    })?;

    let report: AnalysisReport = tokio::task::spawn_blocking(move || analyze_html(&page.html))
        .await
        .map_err(|e| AppError::InternalError(format!("Analyzer task failed: {e}")))?;

    let performance_score = performance_score(state, workspace_id, url).await;

    let completed = SeoAuditRepo::complete(
        &state.pool,
        audit_id,
        &CompleteSeoAudit {
            score: report.score,
            issues: serde_json::to_value(&report.issues)
                .map_err(|e| AppError::InternalError(e.to_string()))?,
            metrics: serde_json::to_value(&report.metrics)
                .map_err(|e| AppError::InternalError(e.to_string()))?,
            performance_score,
        },
    )
    .await?;
    Ok(completed)
}

/// Best effort: `None` when no key is configured or the API call fails.
async fn performance_score(state: &AppState, workspace_id: DbId, url: &str) -> Option<i32> {
    let key = match resolve_key(state, workspace_id, IntegrationProvider::Pagespeed).await {
        Ok(Some(key)) => key,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!(workspace_id, error = %e, "Could not resolve page-performance key");
            return None;
        }
    };

    let client = PageSpeedClient::new(
        state.http.clone(),
        &state.config.endpoints.pagespeed,
        key.key.as_str(),
    );
    match client.performance_score(url).await {
        Ok(score) => Some(score),
        Err(e) => {
            tracing::warn!(workspace_id, url, error = %e, "Page-performance lookup failed");
            None
        }
    }
}

/// GET /api/v1/workspaces/{workspace_id}/projects/{project_id}/audits
pub async fn list(
    State(state): State<AppState>,
    WsViewer(access): WsViewer,
    Path((_workspace_id, project_id)): Path<(DbId, DbId)>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<PageResponse<SeoAudit>>> {
    let project = find_project(&state, access.workspace_id, project_id).await?;
    let audits =
        SeoAuditRepo::list(&state.pool, project.id, params.limit(), params.offset()).await?;
    Ok(Json(PageResponse::new(audits, &params)))
}

/// GET /api/v1/workspaces/{workspace_id}/projects/{project_id}/audits/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    WsViewer(access): WsViewer,
    Path((_workspace_id, project_id, id)): Path<(DbId, DbId, DbId)>,
) -> AppResult<Json<SeoAudit>> {
    let project = find_project(&state, access.workspace_id, project_id).await?;
    let audit = SeoAuditRepo::find_by_id(&state.pool, project.id, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(audit))
}

/// DELETE /api/v1/workspaces/{workspace_id}/projects/{project_id}/audits/{id}
pub async fn delete(
    State(state): State<AppState>,
    WsMember(access): WsMember,
    Path((_workspace_id, project_id, id)): Path<(DbId, DbId, DbId)>,
) -> AppResult<StatusCode> {
    let project = find_project(&state, access.workspace_id, project_id).await?;
    if SeoAuditRepo::delete(&state.pool, project.id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}
