//! Sliding-window rate limit policy.
//!
//! The policy is static: each request maps to one [`RateLimitRule`] by HTTP
//! method and matched route template. Counting happens in the database (see
//! `RateLimitRepo`); this module only decides.

use serde::Serialize;

use crate::types::{DbId, Timestamp};

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;

/// Longest window of any rule. Log rows older than this can be pruned.
pub const MAX_WINDOW_SECS: i64 = HOUR;

/// Authentication endpoints (login, register).
pub const AUTH_RULE: RateLimitRule = RateLimitRule::new("auth", 10, 15 * MINUTE);
/// On-page analyzer runs (each one fetches a remote page).
pub const AUDIT_RUN_RULE: RateLimitRule = RateLimitRule::new("audit_run", 10, MINUTE);
/// LLM content-brief generation.
pub const BRIEF_GENERATE_RULE: RateLimitRule = RateLimitRule::new("brief_generate", 20, HOUR);
/// Bulk SERP rank checks.
pub const KEYWORD_CHECK_RULE: RateLimitRule = RateLimitRule::new("keyword_check", 5, MINUTE);
pub const DEFAULT_WRITE_RULE: RateLimitRule = RateLimitRule::new("write", 60, MINUTE);
pub const DEFAULT_READ_RULE: RateLimitRule = RateLimitRule::new("read", 300, MINUTE);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimitRule {
    pub name: &'static str,
    pub max_requests: i64,
    pub window_secs: i64,
}

impl RateLimitRule {
    pub const fn new(name: &'static str, max_requests: i64, window_secs: i64) -> Self {
        Self {
            name,
            max_requests,
            window_secs,
        }
    }

    pub fn window(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.window_secs)
    }
}

/// Select the rule for a request.
///
/// `route` is the matched route template (e.g.
/// `/api/v1/workspaces/{workspace_id}/projects/{project_id}/audits`) or, when
/// no route matched, the raw path.
pub fn rule_for(method: &str, route: &str) -> RateLimitRule {
    let route = route.trim_end_matches('/');
    let is_post = method.eq_ignore_ascii_case("POST");

    if is_post && (route.ends_with("/auth/login") || route.ends_with("/auth/register")) {
        return AUTH_RULE;
    }
    if is_post && route.ends_with("/audits") {
        return AUDIT_RUN_RULE;
    }
    if is_post && route.contains("/briefs/") && route.ends_with("/generate") {
        return BRIEF_GENERATE_RULE;
    }
    if is_post && route.ends_with("/keywords/check") {
        return KEYWORD_CHECK_RULE;
    }

    match method.to_ascii_uppercase().as_str() {
        "GET" | "HEAD" | "OPTIONS" => DEFAULT_READ_RULE,
        _ => DEFAULT_WRITE_RULE,
    }
}

/// Identity of one rate-limit bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketKey {
    pub workspace_id: Option<DbId>,
    pub user_id: Option<DbId>,
    pub ip_address: String,
    pub route: String,
    pub method: String,
}

impl BucketKey {
    /// Canonical string form, used both as the stored key and as the advisory
    /// lock input.
    pub fn as_key(&self) -> String {
        fn id(v: Option<DbId>) -> String {
            v.map_or_else(|| "-".to_string(), |v| v.to_string())
        }
        format!(
            "ws:{}|u:{}|ip:{}|{} {}",
            id(self.workspace_id),
            id(self.user_id),
            self.ip_address,
            self.method.to_ascii_uppercase(),
            self.route
        )
    }
}

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub allowed: bool,
    pub limit: i64,
    /// Requests left in the window after this one (0 when rejected).
    pub remaining: i64,
    /// Seconds until a slot frees up; only set when rejected.
    pub retry_after_secs: Option<i64>,
}

impl Decision {
    /// Decision used when the limiter itself is unavailable.
    pub fn fail_open(rule: &RateLimitRule) -> Self {
        Self {
            allowed: true,
            limit: rule.max_requests,
            remaining: rule.max_requests,
            retry_after_secs: None,
        }
    }
}

/// Decide given how many requests are already logged inside the window and
/// when the oldest of them happened.
pub fn decide(
    rule: &RateLimitRule,
    count_in_window: i64,
    oldest_in_window: Option<Timestamp>,
    now: Timestamp,
) -> Decision {
    if count_in_window < rule.max_requests {
        return Decision {
            allowed: true,
            limit: rule.max_requests,
            remaining: rule.max_requests - count_in_window - 1,
            retry_after_secs: None,
        };
    }

    let retry_after = oldest_in_window
        .map(|oldest| (oldest + rule.window() - now).num_seconds())
        .unwrap_or(rule.window_secs)
        .max(1);

    Decision {
        allowed: false,
        limit: rule.max_requests,
        remaining: 0,
        retry_after_secs: Some(retry_after),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;

    #[test]
    fn login_and_register_use_auth_rule() {
        assert_eq!(rule_for("POST", "/api/v1/auth/login"), AUTH_RULE);
        assert_eq!(rule_for("post", "/api/v1/auth/register/"), AUTH_RULE);
        assert_eq!(rule_for("POST", "/api/v1/auth/refresh"), DEFAULT_WRITE_RULE);
    }

    #[test]
    fn expensive_routes_have_dedicated_rules() {
        let base = "/api/v1/workspaces/{workspace_id}/projects/{project_id}";
        assert_eq!(rule_for("POST", &format!("{base}/audits")), AUDIT_RUN_RULE);
        assert_eq!(
            rule_for("POST", &format!("{base}/briefs/{{id}}/generate")),
            BRIEF_GENERATE_RULE
        );
        assert_eq!(
            rule_for("POST", &format!("{base}/keywords/check")),
            KEYWORD_CHECK_RULE
        );
        // Listing audits is an ordinary read.
        assert_eq!(rule_for("GET", &format!("{base}/audits")), DEFAULT_READ_RULE);
    }

    #[test]
    fn other_methods_fall_back_to_read_or_write() {
        assert_eq!(rule_for("GET", "/api/v1/workspaces"), DEFAULT_READ_RULE);
        assert_eq!(rule_for("DELETE", "/api/v1/workspaces/{id}"), DEFAULT_WRITE_RULE);
        assert_eq!(rule_for("PATCH", "/x"), DEFAULT_WRITE_RULE);
    }

    #[test]
    fn bucket_key_includes_every_component() {
        let key = BucketKey {
            workspace_id: Some(7),
            user_id: None,
            ip_address: "10.0.0.1".into(),
            route: "/api/v1/workspaces/{workspace_id}".into(),
            method: "get".into(),
        };
        assert_eq!(
            key.as_key(),
            "ws:7|u:-|ip:10.0.0.1|GET /api/v1/workspaces/{workspace_id}"
        );
    }

    #[test]
    fn allows_until_limit_is_reached() {
        let rule = RateLimitRule::new("t", 3, 60);
        let now = Utc::now();

        let first = decide(&rule, 0, None, now);
        assert!(first.allowed);
        assert_eq!(first.remaining, 2);

        let last = decide(&rule, 2, Some(now), now);
        assert!(last.allowed);
        assert_eq!(last.remaining, 0);

        let over = decide(&rule, 3, Some(now), now);
        assert!(!over.allowed);
        assert_eq!(over.remaining, 0);
    }

    #[test]
    fn retry_after_counts_down_from_oldest_entry() {
        let rule = RateLimitRule::new("t", 1, 60);
        let now = Utc::now();
        let decision = decide(&rule, 1, Some(now - Duration::seconds(45)), now);
        assert_eq!(decision.retry_after_secs, Some(15));
    }

    #[test]
    fn retry_after_is_at_least_one_second() {
        let rule = RateLimitRule::new("t", 1, 60);
        let now = Utc::now();
        let decision = decide(&rule, 1, Some(now - Duration::seconds(120)), now);
        assert_eq!(decision.retry_after_secs, Some(1));
    }

    #[test]
    fn max_window_covers_every_rule() {
        for rule in [
            AUTH_RULE,
            AUDIT_RUN_RULE,
            BRIEF_GENERATE_RULE,
            KEYWORD_CHECK_RULE,
            DEFAULT_WRITE_RULE,
            DEFAULT_READ_RULE,
        ] {
            assert!(rule.window_secs <= MAX_WINDOW_SECS, "{}", rule.name);
        }
    }
}
