//! Handlers for the workspace subscription and checkout.

use axum::extract::State;
use axum::Json;
use rankforge_core::audit_log::actions;
use rankforge_core::error::CoreError;
use rankforge_core::plans::{Plan, PlanLimits};
use rankforge_db::models::subscription::Subscription;
use rankforge_db::repositories::{SubscriptionRepo, UserRepo};
use rankforge_integrations::payments::{CheckoutRequest, PaymentsClient};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::middleware::workspace::{WsOwner, WsViewer};
use crate::services::audit::{self, AuditEntry};
use crate::services::plan::{load_workspace, plan_of};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SubscriptionResponse {
    pub plan: Plan,
    pub limits: PlanLimits,
    /// `None` for workspaces that never went through checkout.
    pub subscription: Option<Subscription>,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutBody {
    pub plan: String,
}

#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    pub session_id: String,
    pub checkout_url: Option<String>,
}

/// GET /api/v1/workspaces/{workspace_id}/subscription
pub async fn get_subscription(
    State(state): State<AppState>,
    WsViewer(access): WsViewer,
) -> AppResult<Json<SubscriptionResponse>> {
    let workspace = load_workspace(&state.pool, access.workspace_id).await?;
    let plan = plan_of(&workspace);
    let subscription = SubscriptionRepo::find_by_workspace(&state.pool, workspace.id).await?;

    Ok(Json(SubscriptionResponse {
        plan,
        limits: plan.limits(),
        subscription,
    }))
}

/// POST /api/v1/workspaces/{workspace_id}/billing/checkout
///
/// Starts a hosted checkout for a paid plan. The plan is applied later, when
/// the processor reports the completed session through the webhook.
pub async fn checkout(
    State(state): State<AppState>,
    WsOwner(access): WsOwner,
    Json(input): Json<CheckoutBody>,
) -> AppResult<Json<CheckoutResponse>> {
    let plan = Plan::parse(input.plan.trim())
        .filter(|p| p.is_purchasable())
        .ok_or_else(|| {
            AppError::Core(CoreError::Validation(
                "Plan must be one of pro, agency".into(),
            ))
        })?;

    let payments = &state.config.payments;
    let api_key = payments.api_key.as_deref().ok_or_else(|| {
        AppError::Core(CoreError::NotConfigured("Billing is not configured".into()))
    })?;
    let price_id = payments.price_for(plan).ok_or_else(|| {
        AppError::Core(CoreError::NotConfigured(format!(
            "No price is configured for the {} plan",
            plan.as_str()
        )))
    })?;

    let customer_email = UserRepo::find_by_id(&state.pool, access.user_id())
        .await?
        .map(|u| u.email);

    let app_url = state.config.app_url.trim_end_matches('/');
    let request = CheckoutRequest {
        price_id: price_id.to_string(),
        plan: plan.as_str().to_string(),
        workspace_id: access.workspace_id,
        customer_email,
        success_url: format!("{app_url}/workspaces/{}/billing?checkout=success", access.workspace_id),
        cancel_url: format!("{app_url}/workspaces/{}/billing?checkout=cancel", access.workspace_id),
    };

    let client = PaymentsClient::new(state.http.clone(), &state.config.endpoints.payments, api_key);
    let session = client.create_checkout_session(&request).await?;

    tracing::info!(
        workspace_id = access.workspace_id,
        plan = plan.as_str(),
        session_id = %session.id,
        "Checkout session created"
    );
    audit::record(
        &state.pool,
        AuditEntry::new(access.workspace_id, Some(access.user_id()), actions::CHECKOUT_START)
            .details(json!({ "plan": plan.as_str(), "session_id": session.id })),
    )
    .await;

    Ok(Json(CheckoutResponse {
        session_id: session.id,
        checkout_url: session.url,
    }))
}
