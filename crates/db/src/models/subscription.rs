//! Billing subscription model.

use rankforge_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// One subscription per workspace, mirrored from payment-processor events.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Subscription {
    pub id: DbId,
    pub workspace_id: DbId,
    pub plan: String,
    pub status: String,
    pub customer_ref: Option<String>,
    pub subscription_ref: Option<String>,
    pub current_period_end: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone)]
pub struct UpsertSubscription {
    pub workspace_id: DbId,
    pub plan: String,
    pub status: String,
    pub customer_ref: Option<String>,
    pub subscription_ref: Option<String>,
    pub current_period_end: Option<Timestamp>,
}
