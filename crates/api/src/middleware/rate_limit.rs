//! Database-backed rate limiting middleware.
//!
//! Mounted with `axum::middleware::from_fn_with_state` as a route layer on
//! the `/api/v1` router so that only matched routes are counted. Each request
//! maps to a bucket (workspace, user, client IP, route template, method) and
//! a static rule from [`rankforge_core::rate_limit::rule_for`].

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, MatchedPath, Request, State};
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use rankforge_core::rate_limit::{rule_for, BucketKey, Decision};
use rankforge_core::types::DbId;
use rankforge_db::repositories::RateLimitRepo;

use super::auth::bearer_token;
use crate::auth::jwt::validate_token;
use crate::error::{AppError, RATE_LIMIT_LIMIT, RATE_LIMIT_REMAINING};
use crate::state::AppState;

/// Check and record the request, rejecting it with 429 when its bucket is full.
///
/// Storage failures are logged and the request is let through.
pub async fn enforce(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if !state.config.rate_limit_enabled {
        return next.run(request).await;
    }

    let bucket = bucket_for(&state, &request);
    let rule = rule_for(&bucket.method, &bucket.route);

    let decision = match RateLimitRepo::check_and_record(&state.pool, &bucket, &rule).await {
        Ok(decision) => decision,
        Err(e) => {
            tracing::warn!(error = %e, rule = rule.name, "Rate limiter unavailable, failing open");
            Decision::fail_open(&rule)
        }
    };

    if !decision.allowed {
        tracing::info!(
            rule = rule.name,
            route = %bucket.route,
            user_id = ?bucket.user_id,
            "Rate limit exceeded"
        );
        return AppError::TooManyRequests {
            limit: decision.limit,
            retry_after_secs: decision.retry_after_secs.unwrap_or(rule.window_secs),
        }
        .into_response();
    }

    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(RATE_LIMIT_LIMIT, HeaderValue::from(decision.limit));
    headers.insert(RATE_LIMIT_REMAINING, HeaderValue::from(decision.remaining));
    response
}

fn bucket_for(state: &AppState, request: &Request) -> BucketKey {
    let path = request.uri().path();
    let route = request
        .extensions()
        .get::<MatchedPath>()
        .map_or(path, MatchedPath::as_str)
        .to_string();

    let user_id = bearer_token(request.headers())
        .and_then(|token| validate_token(token, &state.config.jwt).ok())
        .map(|claims| claims.sub);

    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string());

    BucketKey {
        workspace_id: workspace_id_from_path(path),
        user_id,
        ip_address: client_ip(request.headers(), peer, state.config.trust_proxy_headers),
        route,
        method: request.method().as_str().to_string(),
    }
}

/// The first `X-Forwarded-For` hop, if present and non-empty.
pub fn forwarded_for(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// The client address used for rate-limit buckets.
///
/// `X-Forwarded-For` is only consulted when `trust_proxy` is set.
pub fn client_ip(headers: &HeaderMap, peer: Option<String>, trust_proxy: bool) -> String {
    trust_proxy
        .then(|| forwarded_for(headers))
        .flatten()
        .or(peer)
        .unwrap_or_else(|| "unknown".to_string())
}

/// The id following a `workspaces` segment in a request path.
pub fn workspace_id_from_path(path: &str) -> Option<DbId> {
    let mut segments = path.split('/');
    segments.find(|s| *s == "workspaces")?;
    segments.next()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workspace_id_is_read_from_nested_paths() {
        assert_eq!(
            workspace_id_from_path("/api/v1/workspaces/42/projects/7/audits"),
            Some(42)
        );
        assert_eq!(workspace_id_from_path("/api/v1/workspaces"), None);
        assert_eq!(workspace_id_from_path("/api/v1/workspaces/abc"), None);
        assert_eq!(workspace_id_from_path("/api/v1/auth/login"), None);
    }

    fn forwarded(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn forwarded_header_wins_behind_trusted_proxy() {
        let headers = forwarded("203.0.113.9, 10.0.0.1");
        assert_eq!(client_ip(&headers, Some("10.0.0.2".into()), true), "203.0.113.9");
        assert_eq!(client_ip(&HeaderMap::new(), Some("10.0.0.2".into()), true), "10.0.0.2");
        assert_eq!(client_ip(&HeaderMap::new(), None, true), "unknown");
    }

    #[test]
    fn forwarded_header_is_ignored_without_trusted_proxy() {
        let headers = forwarded("203.0.113.9");
        assert_eq!(client_ip(&headers, Some("10.0.0.2".into()), false), "10.0.0.2");
        assert_eq!(client_ip(&headers, None, false), "unknown");
    }

    #[test]
    fn blank_forwarded_header_is_skipped() {
        assert_eq!(forwarded_for(&forwarded(" , 10.0.0.1")), None);
    }
}
