//! Search-results (SERP) API client.
//!
//! Talks to a SerpApi-compatible endpoint: `GET /search.json` returning an
//! `organic_results` array of `{position, title, link}` objects.

use serde::Serialize;

use crate::error::{json_body, parse_error, IntegrationError};

pub const DEFAULT_BASE_URL: &str = "https://serpapi.com";

const SERVICE: &str = "serp";

/// One organic search result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SerpResult {
    /// 1-based rank.
    pub position: i32,
    pub title: String,
    pub url: String,
}

pub struct SerpClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SerpClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Organic results for `query`, up to `depth` of them, in rank order.
    pub async fn search(&self, query: &str, depth: usize) -> Result<Vec<SerpResult>, IntegrationError> {
        let num = depth.to_string();
        let response = self
            .client
            .get(format!("{}/search.json", self.base_url.trim_end_matches('/')))
            .query(&[
                ("engine", "google"),
                ("q", query),
                ("num", num.as_str()),
                ("api_key", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let body = json_body(SERVICE, response).await?;
        let mut results = parse_organic_results(&body)?;
        results.truncate(depth);
        Ok(results)
    }
}

/// Extract organic results from a SERP response body.
///
/// Entries without a link are skipped. A missing `position` falls back to
/// the entry's 1-based index.
pub fn parse_organic_results(body: &serde_json::Value) -> Result<Vec<SerpResult>, IntegrationError> {
    if let Some(err) = body.get("error").and_then(|e| e.as_str()) {
        return Err(parse_error(SERVICE, err));
    }

    let Some(entries) = body.get("organic_results") else {
        // No organic results at all (e.g. an empty result page).
        return Ok(Vec::new());
    };
    let entries = entries
        .as_array()
        .ok_or_else(|| parse_error(SERVICE, "organic_results is not an array"))?;

    let mut results: Vec<SerpResult> = entries
        .iter()
        .enumerate()
        .filter_map(|(idx, entry)| {
            let url = entry.get("link")?.as_str()?.to_string();
            let position = entry
                .get("position")
                .and_then(|p| p.as_i64())
                .and_then(|p| i32::try_from(p).ok())
                .unwrap_or(idx as i32 + 1);
            let title = entry
                .get("title")
                .and_then(|t| t.as_str())
                .unwrap_or_default()
                .to_string();
            Some(SerpResult {
                position,
                title,
                url,
            })
        })
        .collect();

    results.sort_by_key(|r| r.position);
    Ok(results)
}
