//! Workspace-scoped role checks.
//!
//! Every route under `/workspaces/{workspace_id}` takes one of the
//! extractors below. They authenticate the caller, read the workspace id from
//! the path and resolve the caller's membership role. Platform admins without
//! a membership are treated as workspace admins.

use axum::extract::{FromRequestParts, RawPathParams};
use axum::http::request::Parts;
use rankforge_core::error::CoreError;
use rankforge_core::roles::WorkspaceRole;
use rankforge_core::types::DbId;
use rankforge_db::repositories::WorkspaceRepo;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Name of the workspace path parameter.
pub const WORKSPACE_PARAM: &str = "workspace_id";

/// The caller, the workspace in the path and the caller's role there.
#[derive(Debug, Clone)]
pub struct WorkspaceAccess {
    pub user: AuthUser,
    pub workspace_id: DbId,
    pub role: WorkspaceRole,
}

impl WorkspaceAccess {
    /// Fail with 403 unless the caller's role is at least `required`.
    pub fn require(&self, required: WorkspaceRole) -> Result<(), AppError> {
        if self.role.satisfies(required) {
            Ok(())
        } else {
            Err(AppError::Core(CoreError::Forbidden(format!(
                "Requires the {required} role in this workspace"
            ))))
        }
    }

    pub fn user_id(&self) -> DbId {
        self.user.user_id
    }
}

/// Parse the workspace id from the matched path parameters.
pub fn workspace_id_from_params(params: &RawPathParams) -> Option<DbId> {
    params
        .iter()
        .find(|(name, _)| *name == WORKSPACE_PARAM)
        .and_then(|(_, value)| value.parse().ok())
}

impl FromRequestParts<AppState> for WorkspaceAccess {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;

        let params = RawPathParams::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        let workspace_id = workspace_id_from_params(&params)
            .ok_or_else(|| AppError::BadRequest("Invalid workspace id".into()))?;

        let stored = WorkspaceRepo::find_member_role(&state.pool, workspace_id, user.user_id)
            .await?
            .and_then(|r| WorkspaceRole::parse(&r));

        let role = match stored {
            Some(role) => role,
            None if user.is_platform_admin() => WorkspaceRole::Admin,
            None => {
                return Err(AppError::Core(CoreError::Forbidden(
                    "Not a member of this workspace".into(),
                )))
            }
        };

        Ok(WorkspaceAccess {
            user,
            workspace_id,
            role,
        })
    }
}

macro_rules! role_extractor {
    ($(#[$doc:meta])* $name:ident, $role:expr) => {
        $(#[$doc])*
        pub struct $name(pub WorkspaceAccess);

        impl FromRequestParts<AppState> for $name {
            type Rejection = AppError;

            async fn from_request_parts(
                parts: &mut Parts,
                state: &AppState,
            ) -> Result<Self, Self::Rejection> {
                let access = WorkspaceAccess::from_request_parts(parts, state).await?;
                access.require($role)?;
                Ok($name(access))
            }
        }
    };
}

role_extractor!(
    /// Any member of the workspace, read-only access.
    WsViewer,
    WorkspaceRole::Viewer
);
role_extractor!(
    /// Members who may create and edit content.
    WsMember,
    WorkspaceRole::Member
);
role_extractor!(
    /// Admins manage members, integrations and settings.
    WsAdmin,
    WorkspaceRole::Admin
);
role_extractor!(WsOwner, WorkspaceRole::Owner);
