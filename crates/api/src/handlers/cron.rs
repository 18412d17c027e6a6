//! Cron-triggered maintenance endpoints, authenticated with `CRON_SECRET`.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::{NaiveDate, Utc};
use rankforge_core::error::CoreError;
use rankforge_core::usage::{aggregate, DayWindow, EventCount};
use rankforge_db::repositories::UsageRepo;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::bearer_token;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SnapshotRunResponse {
    pub date: NaiveDate,
    /// Workspaces that had events on `date`.
    pub workspaces: usize,
}

/// Rejects the request unless it carries `Authorization: Bearer <CRON_SECRET>`.
/// With no secret configured every request is rejected.
fn authorize(state: &AppState, headers: &HeaderMap) -> AppResult<()> {
    let expected = state.config.cron_secret.as_deref();
    match (expected, bearer_token(headers)) {
        (Some(expected), Some(given)) if expected == given => Ok(()),
        _ => Err(AppError::Core(CoreError::Unauthorized(
            "Invalid cron credentials".into(),
        ))),
    }
}

/// POST /api/v1/cron/usage-snapshots
///
/// Rolls yesterday's usage events (UTC) into one snapshot per workspace.
/// Running it again for the same day overwrites the snapshots.
pub async fn usage_snapshots(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<SnapshotRunResponse>> {
    authorize(&state, &headers)?;

    let window = DayWindow::previous_day(Utc::now());
    let rows = UsageRepo::count_events(&state.pool, window.start, window.end).await?;
    let counts: Vec<EventCount> = rows.into_iter().map(EventCount::from).collect();
    let usage = aggregate(&counts);

    for day in &usage {
        UsageRepo::upsert_snapshot(&state.pool, window.date, day).await?;
    }

    tracing::info!(date = %window.date, workspaces = usage.len(), "Usage snapshots written");
    Ok(Json(SnapshotRunResponse {
        date: window.date,
        workspaces: usage.len(),
    }))
}
