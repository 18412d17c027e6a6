//! Project entity model and DTOs.

use rankforge_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A project row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub workspace_id: DbId,
    pub client_id: Option<DbId>,
    pub name: String,
    /// Bare lowercase host, e.g. `example.com`. Optional until the first audit.
    pub domain: Option<String>,
    pub description: Option<String>,
    /// Number of keyword rows; maintained alongside keyword insert/delete.
    pub keyword_count: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new project.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProject {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(max = 253))]
    pub domain: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub client_id: Option<DbId>,
}

/// DTO for updating an existing project. All fields are optional.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateProject {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(max = 253))]
    pub domain: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub client_id: Option<DbId>,
}
