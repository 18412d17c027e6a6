//! Repository for `usage_events` and `usage_snapshots`.

use chrono::NaiveDate;
use rankforge_core::types::{DbId, Timestamp};
use rankforge_core::usage::DailyUsage;
use sqlx::PgPool;

use crate::models::usage::{
    CreateUsageEvent, EventCountRow, UsageEvent, UsageQuery, UsageSnapshot,
};

const EVENT_COLUMNS: &str = "id, workspace_id, user_id, event_type, metadata, created_at";

const SNAPSHOT_COLUMNS: &str = "id, workspace_id, snapshot_date, audits_run, briefs_generated, \
                                keyword_checks, documents_created, total_events, created_at, updated_at";

pub struct UsageRepo;

impl UsageRepo {
    /// Append a usage event.
    pub async fn record(
        pool: &PgPool,
        input: &CreateUsageEvent,
    ) -> Result<UsageEvent, sqlx::Error> {
        let query = format!(
            "INSERT INTO usage_events (workspace_id, user_id, event_type, metadata)
             VALUES ($1, $2, $3, $4)
             RETURNING {EVENT_COLUMNS}"
        );
        sqlx::query_as::<_, UsageEvent>(&query)
            .bind(input.workspace_id)
            .bind(input.user_id)
            .bind(input.event_type)
            .bind(&input.metadata)
            .fetch_one(pool)
            .await
    }

    /// Event counts grouped by workspace and type over `[start, end)`.
    pub async fn count_events(
        pool: &PgPool,
        start: Timestamp,
        end: Timestamp,
    ) -> Result<Vec<EventCountRow>, sqlx::Error> {
        sqlx::query_as::<_, EventCountRow>(
            "SELECT workspace_id, event_type, COUNT(*) AS count
             FROM usage_events
             WHERE created_at >= $1 AND created_at < $2
             GROUP BY workspace_id, event_type
             ORDER BY workspace_id, event_type",
        )
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await
    }

    /// Insert or overwrite the snapshot for `(workspace, date)`.
    pub async fn upsert_snapshot(
        pool: &PgPool,
        date: NaiveDate,
        usage: &DailyUsage,
    ) -> Result<UsageSnapshot, sqlx::Error> {
        let query = format!(
            "INSERT INTO usage_snapshots
                (workspace_id, snapshot_date, audits_run, briefs_generated,
                 keyword_checks, documents_created, total_events)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             ON CONFLICT (workspace_id, snapshot_date) DO UPDATE SET
                audits_run = EXCLUDED.audits_run,
                briefs_generated = EXCLUDED.briefs_generated,
                keyword_checks = EXCLUDED.keyword_checks,
                documents_created = EXCLUDED.documents_created,
                total_events = EXCLUDED.total_events
             RETURNING {SNAPSHOT_COLUMNS}"
        );
        sqlx::query_as::<_, UsageSnapshot>(&query)
            .bind(usage.workspace_id)
            .bind(date)
            .bind(usage.audits_run)
            .bind(usage.briefs_generated)
            .bind(usage.keyword_checks)
            .bind(usage.documents_created)
            .bind(usage.total_events)
            .fetch_one(pool)
            .await
    }

    /// A workspace's snapshots in the optional inclusive date range, newest first.
    pub async fn list_snapshots(
        pool: &PgPool,
        workspace_id: DbId,
        filter: &UsageQuery,
    ) -> Result<Vec<UsageSnapshot>, sqlx::Error> {
        let query = format!(
            "SELECT {SNAPSHOT_COLUMNS} FROM usage_snapshots
             WHERE workspace_id = $1
               AND ($2::date IS NULL OR snapshot_date >= $2)
               AND ($3::date IS NULL OR snapshot_date <= $3)
             ORDER BY snapshot_date DESC"
        );
        sqlx::query_as::<_, UsageSnapshot>(&query)
            .bind(workspace_id)
            .bind(filter.from)
            .bind(filter.to)
            .fetch_all(pool)
            .await
    }
}
