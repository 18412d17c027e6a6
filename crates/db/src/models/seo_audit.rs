//! On-page SEO audit model and DTOs.

use rankforge_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

/// An `seo_audits` row. `issues` and `metrics` hold the analyzer report.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SeoAudit {
    pub id: DbId,
    pub project_id: DbId,
    pub url: String,
    pub status: String,
    pub score: Option<i32>,
    pub issues: serde_json::Value,
    pub metrics: Option<serde_json::Value>,
    pub performance_score: Option<i32>,
    pub error_message: Option<String>,
    pub created_by: Option<DbId>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Run request. Without a `url` the project's domain root is audited.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateSeoAudit {
    #[validate(url, custom(function = "http_scheme"))]
    pub url: Option<String>,
}

/// Only `http` and `https` pages can be audited.
fn http_scheme(url: &str) -> Result<(), ValidationError> {
    let scheme = url.split_once("://").map(|(s, _)| s.to_ascii_lowercase());
    match scheme.as_deref() {
        Some("http" | "https") => Ok(()),
        _ => Err(ValidationError::new("http_scheme")
            .with_message("URL must use http or https".into())),
    }
}


/// Results written when an audit completes.
#[derive(Debug, Clone)]
pub struct CompleteSeoAudit {
    pub score: i32,
    pub issues: serde_json::Value,
    pub metrics: serde_json::Value,
    pub performance_score: Option<i32>,
}
