//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument. Tenant-owned rows are always
//! looked up together with their owning workspace or project id.

pub mod admin_audit_log_repo;
pub mod client_repo;
pub mod content_brief_repo;
pub mod document_repo;
pub mod integration_config_repo;
pub mod keyword_repo;
pub mod project_repo;
pub mod rate_limit_repo;
pub mod seo_audit_repo;
pub mod session_repo;
pub mod subscription_repo;
pub mod usage_repo;
pub mod user_repo;
pub mod workspace_repo;

pub use admin_audit_log_repo::AdminAuditLogRepo;
pub use client_repo::ClientRepo;
pub use content_brief_repo::ContentBriefRepo;
pub use document_repo::DocumentRepo;
pub use integration_config_repo::IntegrationConfigRepo;
pub use keyword_repo::KeywordRepo;
pub use project_repo::ProjectRepo;
pub use rate_limit_repo::RateLimitRepo;
pub use seo_audit_repo::SeoAuditRepo;
pub use session_repo::SessionRepo;
pub use subscription_repo::SubscriptionRepo;
pub use usage_repo::UsageRepo;
pub use user_repo::UserRepo;
pub use workspace_repo::WorkspaceRepo;
