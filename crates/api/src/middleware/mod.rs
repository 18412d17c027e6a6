//! Request authentication, authorization and throttling.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`workspace::WorkspaceAccess`] -- Resolves the caller's role in the
//!   `{workspace_id}` of the path; [`workspace::WsViewer`] and friends
//!   require a minimum role.
//! - [`rate_limit::enforce`] -- Database-backed sliding-window rate limiter.

pub mod auth;
pub mod rate_limit;
pub mod workspace;
