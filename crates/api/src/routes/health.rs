//! Root-level `/health`, outside `/api/v1` and its rate limiter.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the database is unreachable.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Which platform-wide fallbacks are configured. Never includes the keys.
    pub platform_integrations: PlatformIntegrations,
}

#[derive(Serialize)]
pub struct PlatformIntegrations {
    pub serp: bool,
    pub openai: bool,
    pub anthropic: bool,
    pub pagespeed: bool,
    pub billing: bool,
}

/// GET /health. Answers 503 while the database is down so load balancers
/// stop routing here.
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let db_healthy = match rankforge_db::health_check(&state.pool).await {
        Ok(()) => true,
        Err(e) => {
            tracing::error!(error = %e, "Health check could not reach the database");
            false
        }
    };

    let keys = &state.config.platform_keys;
    let body = HealthResponse {
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        platform_integrations: PlatformIntegrations {
            serp: keys.serp.is_some(),
            openai: keys.openai.is_some(),
            anthropic: keys.anthropic.is_some(),
            pagespeed: keys.pagespeed.is_some(),
            billing: state.config.payments.api_key.is_some(),
        },
    };

    let status = if db_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
