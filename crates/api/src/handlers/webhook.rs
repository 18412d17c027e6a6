//! Payment-processor webhook receiver.
//!
//! The raw body is verified against the `Payment-Signature` header before it
//! is parsed. Subscription state is mirrored into `subscriptions` and the
//! workspace plan follows it: a status that no longer grants the paid plan
//! drops the workspace to `free`.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use rankforge_core::audit_log::actions;
use rankforge_core::error::CoreError;
use rankforge_core::plans::{status_grants_plan, subscription_status, Plan};
use rankforge_core::types::DbId;
use rankforge_core::webhook_signature::{self, DEFAULT_TOLERANCE_SECS, SIGNATURE_HEADER};
use rankforge_db::models::subscription::{Subscription, UpsertSubscription};
use rankforge_db::repositories::{SubscriptionRepo, WorkspaceRepo};
use rankforge_integrations::payments::{
    event_types, CheckoutSessionObject, PaymentEvent, SubscriptionObject,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::services::audit::{self, AuditEntry};
use crate::state::AppState;

/// POST /api/v1/webhooks/payments
pub async fn payments(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<Value>> {
    let secret = state.config.payments.webhook_secret.as_deref().ok_or_else(|| {
        AppError::Core(CoreError::NotConfigured(
            "Payment webhooks are not configured".into(),
        ))
    })?;

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::BadRequest("Missing Payment-Signature header".into()))?;

    webhook_signature::verify(
        secret,
        signature,
        &body,
        Utc::now().timestamp(),
        DEFAULT_TOLERANCE_SECS,
    )
    .map_err(|e| {
        tracing::warn!(error = %e, "Rejected payment webhook");
        AppError::BadRequest(format!("Invalid webhook signature: {e}"))
    })?;

    let event: PaymentEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Malformed webhook payload: {e}")))?;

    tracing::info!(event_id = %event.id, event_type = %event.event_type, "Payment webhook received");

    let synced = match event.event_type.as_str() {
        event_types::CHECKOUT_COMPLETED => {
            checkout_completed(&state, decode_object(&event)?).await?
        }
        event_types::SUBSCRIPTION_UPDATED => {
            subscription_changed(&state, decode_object(&event)?, None).await?
        }
        event_types::SUBSCRIPTION_DELETED => {
            subscription_changed(
                &state,
                decode_object(&event)?,
                Some(subscription_status::CANCELED),
            )
            .await?
        }
        other => {
            tracing::debug!(event_type = other, "Ignoring payment event");
            None
        }
    };

    if let Some(subscription) = synced {
        audit::record(
            &state.pool,
            AuditEntry::new(subscription.workspace_id, None, actions::SUBSCRIPTION_SYNC)
                .entity("subscription", subscription.id)
                .details(json!({
                    "event_id": event.id,
                    "event_type": event.event_type,
                    "plan": subscription.plan,
                    "status": subscription.status,
                })),
        )
        .await;
    }

    Ok(Json(json!({ "received": true })))
}

fn decode_object<T: DeserializeOwned>(event: &PaymentEvent) -> AppResult<T> {
    serde_json::from_value(event.data.object.clone()).map_err(|e| {
        AppError::BadRequest(format!("Malformed {} object: {e}", event.event_type))
    })
}

async fn checkout_completed(
    state: &AppState,
    session: CheckoutSessionObject,
) -> AppResult<Option<Subscription>> {
    let workspace_id = session.workspace_id().ok_or_else(|| {
        AppError::BadRequest("Checkout session carries no workspace id".into())
    })?;
    let plan = session
        .plan()
        .and_then(Plan::parse)
        .filter(|p| p.is_purchasable())
        .ok_or_else(|| AppError::BadRequest("Checkout session carries no paid plan".into()))?;

    if WorkspaceRepo::find_by_id(&state.pool, workspace_id).await?.is_none() {
        tracing::warn!(workspace_id, session_id = %session.id, "Checkout completed for unknown workspace");
        return Ok(None);
    }

    let subscription = SubscriptionRepo::upsert(
        &state.pool,
        &UpsertSubscription {
            workspace_id,
            plan: plan.as_str().to_string(),
            status: subscription_status::ACTIVE.to_string(),
            customer_ref: session.customer,
            subscription_ref: session.subscription,
            current_period_end: None,
        },
    )
    .await?;

    apply_plan(state, workspace_id, plan, &subscription.status).await?;
    Ok(Some(subscription))
}

/// Sync an updated or deleted subscription. `status_override` replaces the
/// status reported in the object.
async fn subscription_changed(
    state: &AppState,
    object: SubscriptionObject,
    status_override: Option<&str>,
) -> AppResult<Option<Subscription>> {
    let status = status_override.unwrap_or(object.status.as_str());
    let existing = SubscriptionRepo::find_by_subscription_ref(&state.pool, &object.id).await?;

    let plan = object
        .price_id()
        .and_then(|price| state.config.payments.plan_for_price(price))
        .or_else(|| object.plan().and_then(Plan::parse))
        .or_else(|| existing.as_ref().and_then(|s| Plan::parse(&s.plan)))
        .unwrap_or(Plan::Free);

    let subscription = match existing {
        Some(_) => SubscriptionRepo::update_by_subscription_ref(
            &state.pool,
            &object.id,
            plan.as_str(),
            status,
            object.period_end(),
        )
        .await?,
        None => match object.workspace_id() {
            Some(workspace_id)
                if WorkspaceRepo::find_by_id(&state.pool, workspace_id).await?.is_some() =>
            {
                Some(
                    SubscriptionRepo::upsert(
                        &state.pool,
                        &UpsertSubscription {
                            workspace_id,
                            plan: plan.as_str().to_string(),
                            status: status.to_string(),
                            customer_ref: object.customer.clone(),
                            subscription_ref: Some(object.id.clone()),
                            current_period_end: object.period_end(),
                        },
                    )
                    .await?,
                )
            }
            _ => None,
        },
    };

    let Some(subscription) = subscription else {
        tracing::warn!(subscription_ref = %object.id, "Subscription event for unknown workspace");
        return Ok(None);
    };

    apply_plan(state, subscription.workspace_id, plan, status).await?;
    Ok(Some(subscription))
}

async fn apply_plan(state: &AppState, workspace_id: DbId, plan: Plan, status: &str) -> AppResult<()> {
    let effective = if status_grants_plan(status) {
        plan
    } else {
        Plan::Free
    };
    WorkspaceRepo::set_plan(&state.pool, workspace_id, effective.as_str()).await?;
    tracing::info!(workspace_id, plan = effective.as_str(), status, "Workspace plan synced");
    Ok(())
}
