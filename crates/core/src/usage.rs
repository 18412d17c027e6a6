//! Usage event types and daily snapshot aggregation.
//!
//! Handlers append rows to `usage_events`; a cron-triggered endpoint rolls the
//! previous UTC day up into one `usage_snapshots` row per workspace.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use serde::Serialize;

use crate::types::{DbId, Timestamp};

/// Known event types.
pub mod event_types {
    pub const AUDIT_RUN: &str = "audit_run";
    pub const BRIEF_GENERATED: &str = "brief_generated";
    pub const KEYWORD_CHECK: &str = "keyword_check";
    pub const DOCUMENT_CREATED: &str = "document_created";
}

/// Half-open UTC interval `[start, end)` covering one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub date: NaiveDate,
    pub start: Timestamp,
    pub end: Timestamp,
}

impl DayWindow {
    pub fn for_date(date: NaiveDate) -> Self {
        let start = Utc.from_utc_datetime(&date.and_time(chrono::NaiveTime::MIN));
        Self {
            date,
            start,
            end: start + Duration::days(1),
        }
    }

    /// The full UTC day before the one containing `now`.
    pub fn previous_day(now: Timestamp) -> Self {
        Self::for_date(now.date_naive() - Duration::days(1))
    }
}

/// One `(workspace, event_type, count)` row from the grouped event query.
#[derive(Debug, Clone)]
pub struct EventCount {
    pub workspace_id: DbId,
    pub event_type: String,
    pub count: i64,
}

/// Aggregated counters for one workspace on one day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DailyUsage {
    pub workspace_id: DbId,
    pub audits_run: i64,
    pub briefs_generated: i64,
    pub keyword_checks: i64,
    pub documents_created: i64,
    /// All events, including types without a dedicated counter.
    pub total_events: i64,
}

/// Fold grouped event counts into one [`DailyUsage`] per workspace, ordered
/// by workspace id.
pub fn aggregate(counts: &[EventCount]) -> Vec<DailyUsage> {
    let mut by_workspace: BTreeMap<DbId, DailyUsage> = BTreeMap::new();

    for row in counts {
        let usage = by_workspace
            .entry(row.workspace_id)
            .or_insert_with(|| DailyUsage {
                workspace_id: row.workspace_id,
                ..DailyUsage::default()
            });

        match row.event_type.as_str() {
            event_types::AUDIT_RUN => usage.audits_run += row.count,
            event_types::BRIEF_GENERATED => usage.briefs_generated += row.count,
            event_types::KEYWORD_CHECK => usage.keyword_checks += row.count,
            event_types::DOCUMENT_CREATED => usage.documents_created += row.count,
            _ => {}
        }
        usage.total_events += row.count;
    }

    by_workspace.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(workspace_id: DbId, event_type: &str, count: i64) -> EventCount {
        EventCount {
            workspace_id,
            event_type: event_type.to_string(),
            count,
        }
    }

    #[test]
    fn previous_day_window_is_midnight_to_midnight() {
        let now = Utc.with_ymd_and_hms(2026, 3, 15, 0, 5, 0).unwrap();
        let window = DayWindow::previous_day(now);
        assert_eq!(window.date, NaiveDate::from_ymd_opt(2026, 3, 14).unwrap());
        assert_eq!(window.start, Utc.with_ymd_and_hms(2026, 3, 14, 0, 0, 0).unwrap());
        assert_eq!(window.end, Utc.with_ymd_and_hms(2026, 3, 15, 0, 0, 0).unwrap());
    }

    #[test]
    fn previous_day_crosses_month_boundary() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 23, 59, 59).unwrap();
        let window = DayWindow::previous_day(now);
        assert_eq!(window.date, NaiveDate::from_ymd_opt(2026, 2, 28).unwrap());
    }

    #[test]
    fn aggregate_groups_by_workspace() {
        let usage = aggregate(&[
            row(2, event_types::AUDIT_RUN, 3),
            row(1, event_types::BRIEF_GENERATED, 1),
            row(2, event_types::KEYWORD_CHECK, 10),
            row(1, event_types::DOCUMENT_CREATED, 2),
        ]);
        assert_eq!(usage.len(), 2);
        assert_eq!(usage[0].workspace_id, 1);
        assert_eq!(usage[0].briefs_generated, 1);
        assert_eq!(usage[0].documents_created, 2);
        assert_eq!(usage[0].total_events, 3);
        assert_eq!(usage[1].audits_run, 3);
        assert_eq!(usage[1].keyword_checks, 10);
        assert_eq!(usage[1].total_events, 13);
    }

    #[test]
    fn unknown_event_types_only_count_towards_total() {
        let usage = aggregate(&[row(5, "export", 4)]);
        assert_eq!(usage[0].total_events, 4);
        assert_eq!(usage[0].audits_run, 0);
    }

    #[test]
    fn no_events_produce_no_snapshots() {
        assert!(aggregate(&[]).is_empty());
    }
}
