//! Domain logic for the Rankforge SEO platform.
//!
//! Zero internal dependencies: everything here is pure and usable from the
//! repository layer, the HTTP layer and tests alike.

pub mod audit_log;
pub mod content;
pub mod credentials;
pub mod error;
pub mod hashing;
pub mod integrations;
pub mod keywords;
pub mod llm;
pub mod plans;
pub mod rate_limit;
pub mod roles;
pub mod seo_analyzer;
pub mod types;
pub mod usage;
pub mod webhook_signature;
pub mod workspace;
