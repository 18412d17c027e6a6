//! Repository for the `subscriptions` table.

use rankforge_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::subscription::{Subscription, UpsertSubscription};

const COLUMNS: &str = "id, workspace_id, plan, status, customer_ref, subscription_ref, \
                       current_period_end, created_at, updated_at";

pub struct SubscriptionRepo;

impl SubscriptionRepo {
    pub async fn find_by_workspace(
        pool: &PgPool,
        workspace_id: DbId,
    ) -> Result<Option<Subscription>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM subscriptions WHERE workspace_id = $1");
        sqlx::query_as::<_, Subscription>(&query)
            .bind(workspace_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_subscription_ref(
        pool: &PgPool,
        subscription_ref: &str,
    ) -> Result<Option<Subscription>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM subscriptions WHERE subscription_ref = $1");
        sqlx::query_as::<_, Subscription>(&query)
            .bind(subscription_ref)
            .fetch_optional(pool)
            .await
    }

    /// Create or overwrite the workspace's subscription. Processor references
    /// already on file are kept when the new values are `None`.
    pub async fn upsert(
        pool: &PgPool,
        input: &UpsertSubscription,
    ) -> Result<Subscription, sqlx::Error> {
        let query = format!(
            "INSERT INTO subscriptions
                (workspace_id, plan, status, customer_ref, subscription_ref, current_period_end)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (workspace_id) DO UPDATE SET
                plan = EXCLUDED.plan,
                status = EXCLUDED.status,
                customer_ref = COALESCE(EXCLUDED.customer_ref, subscriptions.customer_ref),
                subscription_ref = COALESCE(EXCLUDED.subscription_ref, subscriptions.subscription_ref),
                current_period_end = COALESCE(EXCLUDED.current_period_end, subscriptions.current_period_end)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Subscription>(&query)
            .bind(input.workspace_id)
            .bind(&input.plan)
            .bind(&input.status)
            .bind(&input.customer_ref)
            .bind(&input.subscription_ref)
            .bind(input.current_period_end)
            .fetch_one(pool)
            .await
    }

    /// Sync status, plan and period from a processor event.
    pub async fn update_by_subscription_ref(
        pool: &PgPool,
        subscription_ref: &str,
        plan: &str,
        status: &str,
        current_period_end: Option<Timestamp>,
    ) -> Result<Option<Subscription>, sqlx::Error> {
        let query = format!(
            "UPDATE subscriptions SET
                plan = $2,
                status = $3,
                current_period_end = COALESCE($4, current_period_end)
             WHERE subscription_ref = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Subscription>(&query)
            .bind(subscription_ref)
            .bind(plan)
            .bind(status)
            .bind(current_period_end)
            .fetch_optional(pool)
            .await
    }
}
