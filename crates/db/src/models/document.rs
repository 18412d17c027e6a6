//! Document model and DTOs.

use rankforge_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Document {
    pub id: DbId,
    pub workspace_id: DbId,
    pub project_id: Option<DbId>,
    pub brief_id: Option<DbId>,
    pub title: String,
    pub content: String,
    pub word_count: i32,
    pub status: String,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateDocument {
    #[validate(length(min = 1, max = 300))]
    pub title: String,
    pub content: Option<String>,
    pub project_id: Option<DbId>,
    pub brief_id: Option<DbId>,
    /// Defaults to `draft`.
    pub status: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateDocument {
    #[validate(length(min = 1, max = 300))]
    pub title: Option<String>,
    pub content: Option<String>,
    pub status: Option<String>,
    pub project_id: Option<DbId>,
}

/// Optional filters for listing documents.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DocumentFilter {
    pub status: Option<String>,
    pub project_id: Option<DbId>,
}
