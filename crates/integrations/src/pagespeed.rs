//! Page-performance API client (PageSpeed Insights v5).

use crate::error::{json_body, parse_error, IntegrationError};

pub const DEFAULT_BASE_URL: &str = "https://www.googleapis.com";

const SERVICE: &str = "pagespeed";

pub struct PageSpeedClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl PageSpeedClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Mobile performance score for `url`, 0-100.
    pub async fn performance_score(&self, url: &str) -> Result<i32, IntegrationError> {
        let response = self
            .client
            .get(format!(
                "{}/pagespeedonline/v5/runPagespeed",
                self.base_url.trim_end_matches('/')
            ))
            .query(&[
                ("url", url),
                ("strategy", "mobile"),
                ("category", "performance"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let body = json_body(SERVICE, response).await?;
        parse_performance_score(&body)
    }
}

/// Read `lighthouseResult.categories.performance.score` (a 0-1 fraction) and
/// scale it to 0-100.
pub fn parse_performance_score(body: &serde_json::Value) -> Result<i32, IntegrationError> {
    let score = body
        .pointer("/lighthouseResult/categories/performance/score")
        .and_then(|s| s.as_f64())
        .ok_or_else(|| parse_error(SERVICE, "missing performance score"))?;
    Ok((score.clamp(0.0, 1.0) * 100.0).round() as i32)
}
