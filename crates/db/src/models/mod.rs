//! Row models and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - A `Deserialize` + `Validate` create DTO for request bodies
//! - An update DTO (all `Option` fields) applied with `COALESCE`

pub mod audit_log;
pub mod client;
pub mod content_brief;
pub mod document;
pub mod integration_config;
pub mod keyword;
pub mod project;
pub mod seo_audit;
pub mod session;
pub mod subscription;
pub mod usage;
pub mod user;
pub mod workspace;
