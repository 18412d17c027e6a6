//! Content brief model and DTOs.

use rankforge_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ContentBrief {
    pub id: DbId,
    pub project_id: DbId,
    pub keyword_id: Option<DbId>,
    pub target_keyword: String,
    pub title: String,
    pub status: String,
    /// Generated markdown; empty until a generation succeeds.
    pub content: Option<String>,
    pub llm_provider: Option<String>,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a brief. `title` defaults to the target keyword.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateContentBrief {
    #[validate(length(min = 1, max = 200))]
    pub target_keyword: String,
    #[validate(length(min = 1, max = 300))]
    pub title: Option<String>,
    pub keyword_id: Option<DbId>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateContentBrief {
    #[validate(length(min = 1, max = 200))]
    pub target_keyword: Option<String>,
    #[validate(length(min = 1, max = 300))]
    pub title: Option<String>,
    pub content: Option<String>,
}
