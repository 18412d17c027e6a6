//! Usage event and daily snapshot models.

use chrono::NaiveDate;
use rankforge_core::types::{DbId, Timestamp};
use rankforge_core::usage::EventCount;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UsageEvent {
    pub id: DbId,
    pub workspace_id: DbId,
    pub user_id: Option<DbId>,
    pub event_type: String,
    pub metadata: Option<serde_json::Value>,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct CreateUsageEvent {
    pub workspace_id: DbId,
    pub user_id: Option<DbId>,
    pub event_type: &'static str,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UsageSnapshot {
    pub id: DbId,
    pub workspace_id: DbId,
    pub snapshot_date: NaiveDate,
    pub audits_run: i64,
    pub briefs_generated: i64,
    pub keyword_checks: i64,
    pub documents_created: i64,
    pub total_events: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Grouped row from the per-day event count query.
#[derive(Debug, Clone, FromRow)]
pub struct EventCountRow {
    pub workspace_id: DbId,
    pub event_type: String,
    pub count: i64,
}

impl From<EventCountRow> for EventCount {
    fn from(row: EventCountRow) -> Self {
        Self {
            workspace_id: row.workspace_id,
            event_type: row.event_type,
            count: row.count,
        }
    }
}

/// Date range filter for listing snapshots (inclusive).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UsageQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}
