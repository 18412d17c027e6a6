//! Workspace membership roles.
//!
//! These must match the CHECK constraint on `workspace_members.role`.

use serde::{Deserialize, Serialize};

pub const ROLE_OWNER: &str = "owner";
pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_MEMBER: &str = "member";
pub const ROLE_VIEWER: &str = "viewer";

/// Platform-level role carried in access tokens for `users.is_platform_admin`.
pub const PLATFORM_ADMIN: &str = "platform_admin";
/// Platform-level role for everyone else.
pub const PLATFORM_USER: &str = "user";

/// Platform role name for a user row.
pub fn platform_role(is_platform_admin: bool) -> &'static str {
    if is_platform_admin {
        PLATFORM_ADMIN
    } else {
        PLATFORM_USER
    }
}

/// A member's role within one workspace, ordered from least to most privileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkspaceRole {
    Viewer,
    Member,
    Admin,
    Owner,
}

impl WorkspaceRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Viewer => ROLE_VIEWER,
            Self::Member => ROLE_MEMBER,
            Self::Admin => ROLE_ADMIN,
            Self::Owner => ROLE_OWNER,
        }
    }

    /// Parse a stored role name. Returns `None` for unknown values.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            ROLE_VIEWER => Some(Self::Viewer),
            ROLE_MEMBER => Some(Self::Member),
            ROLE_ADMIN => Some(Self::Admin),
            ROLE_OWNER => Some(Self::Owner),
            _ => None,
        }
    }

    /// Whether this role grants at least the privileges of `required`.
    pub fn satisfies(self, required: WorkspaceRole) -> bool {
        self >= required
    }

    /// Roles that may be granted through the members API. Ownership is only
    /// assigned when a workspace is created.
    pub fn is_assignable(self) -> bool {
        self != Self::Owner
    }
}

impl std::fmt::Display for WorkspaceRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_are_ordered_by_privilege() {
        assert!(WorkspaceRole::Owner > WorkspaceRole::Admin);
        assert!(WorkspaceRole::Admin > WorkspaceRole::Member);
        assert!(WorkspaceRole::Member > WorkspaceRole::Viewer);
    }

    #[test]
    fn satisfies_is_inclusive() {
        assert!(WorkspaceRole::Admin.satisfies(WorkspaceRole::Admin));
        assert!(WorkspaceRole::Owner.satisfies(WorkspaceRole::Viewer));
        assert!(!WorkspaceRole::Viewer.satisfies(WorkspaceRole::Member));
    }

    #[test]
    fn parse_round_trips_known_names() {
        for role in [
            WorkspaceRole::Viewer,
            WorkspaceRole::Member,
            WorkspaceRole::Admin,
            WorkspaceRole::Owner,
        ] {
            assert_eq!(WorkspaceRole::parse(role.as_str()), Some(role));
        }
        assert_eq!(WorkspaceRole::parse("superuser"), None);
    }

    #[test]
    fn owner_is_not_assignable() {
        assert!(!WorkspaceRole::Owner.is_assignable());
        assert!(WorkspaceRole::Admin.is_assignable());
    }

    #[test]
    fn serde_uses_lowercase_names() {
        let json = serde_json::to_string(&WorkspaceRole::Member).unwrap();
        assert_eq!(json, "\"member\"");
        let parsed: WorkspaceRole = serde_json::from_str("\"viewer\"").unwrap();
        assert_eq!(parsed, WorkspaceRole::Viewer);
    }
}
