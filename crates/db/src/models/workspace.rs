//! Workspace and membership models.

use rankforge_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A workspace row. Every tenant-owned entity hangs off one of these.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Workspace {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub owner_id: DbId,
    pub plan: String,
    pub preferred_llm_provider: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A workspace together with the caller's role in it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WorkspaceWithRole {
    pub id: DbId,
    pub name: String,
    pub slug: String,
    pub owner_id: DbId,
    pub plan: String,
    pub preferred_llm_provider: Option<String>,
    pub role: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateWorkspace {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub preferred_llm_provider: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateWorkspace {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    pub preferred_llm_provider: Option<String>,
}

/// A `workspace_members` row.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WorkspaceMember {
    pub id: DbId,
    pub workspace_id: DbId,
    pub user_id: DbId,
    pub role: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Member listing row joined with the user's public fields.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MemberWithUser {
    pub user_id: DbId,
    pub email: String,
    pub name: String,
    pub role: String,
    pub created_at: Timestamp,
}

/// Add an existing user to a workspace by email.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddMember {
    #[validate(email)]
    pub email: String,
    pub role: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateMemberRole {
    pub role: String,
}
