//! Tracked keyword model and DTOs.

use rankforge_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A keyword row. Positions are 1-based; `None` means not ranking.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Keyword {
    pub id: DbId,
    pub project_id: DbId,
    pub term: String,
    pub search_volume: Option<i32>,
    pub difficulty: Option<i16>,
    pub current_position: Option<i32>,
    pub previous_position: Option<i32>,
    pub best_position: Option<i32>,
    pub last_checked_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Batch create request. Terms are normalized and de-duplicated before insert.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateKeywords {
    #[validate(length(min = 1, max = 100))]
    pub terms: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateKeyword {
    #[validate(range(min = 0))]
    pub search_volume: Option<i32>,
    #[validate(range(min = 0, max = 100))]
    pub difficulty: Option<i16>,
}

/// Rank check request. An absent list checks every keyword of the project.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckKeywords {
    pub keyword_ids: Option<Vec<DbId>>,
}

/// Outcome of batch keyword creation.
#[derive(Debug, Clone, Serialize)]
pub struct KeywordBatchResult {
    pub created: Vec<Keyword>,
    /// Terms that already existed in the project.
    pub skipped: Vec<String>,
}
