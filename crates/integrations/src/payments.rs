//! Payment processor client (Stripe-compatible API) and webhook event types.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::{ensure_success, IntegrationError};

pub const DEFAULT_BASE_URL: &str = "https://api.stripe.com";

const SERVICE: &str = "payments";

/// Webhook event types this platform reacts to.
pub mod event_types {
    pub const CHECKOUT_COMPLETED: &str = "checkout.session.completed";
    pub const SUBSCRIPTION_UPDATED: &str = "customer.subscription.updated";
    pub const SUBSCRIPTION_DELETED: &str = "customer.subscription.deleted";
}

/// Metadata key carrying the workspace id on checkout sessions and subscriptions.
pub const WORKSPACE_METADATA_KEY: &str = "workspace_id";

/// Metadata key carrying the purchased plan name.
pub const PLAN_METADATA_KEY: &str = "plan";

/// Inputs for a subscription checkout session.
#[derive(Debug, Clone)]
pub struct CheckoutRequest {
    pub price_id: String,
    pub plan: String,
    pub workspace_id: i64,
    pub customer_email: Option<String>,
    pub success_url: String,
    pub cancel_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    /// Hosted checkout page to redirect the user to.
    pub url: Option<String>,
}

pub struct PaymentsClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl PaymentsClient {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Create a hosted checkout session for a subscription.
    pub async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, IntegrationError> {
        let workspace_id = request.workspace_id.to_string();
        let mut form: Vec<(&str, &str)> = vec![
            ("mode", "subscription"),
            ("line_items[0][price]", request.price_id.as_str()),
            ("line_items[0][quantity]", "1"),
            ("success_url", request.success_url.as_str()),
            ("cancel_url", request.cancel_url.as_str()),
            ("client_reference_id", workspace_id.as_str()),
            ("metadata[workspace_id]", workspace_id.as_str()),
            ("subscription_data[metadata][workspace_id]", workspace_id.as_str()),
            ("metadata[plan]", request.plan.as_str()),
            ("subscription_data[metadata][plan]", request.plan.as_str()),
        ];
        if let Some(email) = &request.customer_email {
            form.push(("customer_email", email.as_str()));
        }

        let response = self
            .client
            .post(format!("{}/v1/checkout/sessions", self.base_url.trim_end_matches('/')))
            .bearer_auth(&self.api_key)
            .form(&form)
            .send()
            .await?;

        let response = ensure_success(SERVICE, response).await?;
        Ok(response.json::<CheckoutSession>().await?)
    }
}

// ---------------------------------------------------------------------------
// Webhook payloads
// ---------------------------------------------------------------------------

/// Envelope of every webhook event. `data.object` is decoded per event type.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventData {
    pub object: serde_json::Value,
}

/// `data.object` of `checkout.session.completed`.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSessionObject {
    pub id: String,
    pub customer: Option<String>,
    pub subscription: Option<String>,
    pub client_reference_id: Option<String>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl CheckoutSessionObject {
    /// Workspace the session was created for, from metadata or the client
    /// reference id.
    pub fn workspace_id(&self) -> Option<i64> {
        self.metadata
            .get(WORKSPACE_METADATA_KEY)
            .or(self.client_reference_id.as_ref())
            .and_then(|v| v.parse().ok())
    }

    pub fn plan(&self) -> Option<&str> {
        self.metadata.get(PLAN_METADATA_KEY).map(String::as_str)
    }
}

/// `data.object` of `customer.subscription.*` events.
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionObject {
    pub id: String,
    pub customer: Option<String>,
    pub status: String,
    /// Unix seconds.
    pub current_period_end: Option<i64>,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    pub items: Option<SubscriptionItems>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionItems {
    pub data: Vec<SubscriptionItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionItem {
    pub price: Price,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Price {
    pub id: String,
}

impl SubscriptionObject {
    /// Price of the first subscription item.
    pub fn price_id(&self) -> Option<&str> {
        self.items
            .as_ref()
            .and_then(|items| items.data.first())
            .map(|item| item.price.id.as_str())
    }

    pub fn workspace_id(&self) -> Option<i64> {
        self.metadata
            .get(WORKSPACE_METADATA_KEY)
            .and_then(|v| v.parse().ok())
    }

    pub fn plan(&self) -> Option<&str> {
        self.metadata.get(PLAN_METADATA_KEY).map(String::as_str)
    }

    pub fn period_end(&self) -> Option<DateTime<Utc>> {
        self.current_period_end
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn checkout_event_yields_workspace() {
        let event: PaymentEvent = serde_json::from_value(json!({
            "id": "evt_1",
            "type": "checkout.session.completed",
            "data": {"object": {
                "id": "cs_1",
                "customer": "cus_1",
                "subscription": "sub_1",
                "metadata": {"workspace_id": "42", "plan": "pro"}
            }}
        }))
        .unwrap();
        assert_eq!(event.event_type, event_types::CHECKOUT_COMPLETED);

        let session: CheckoutSessionObject = serde_json::from_value(event.data.object).unwrap();
        assert_eq!(session.workspace_id(), Some(42));
        assert_eq!(session.subscription.as_deref(), Some("sub_1"));
        assert_eq!(session.plan(), Some("pro"));
    }

    #[test]
    fn client_reference_id_is_a_fallback() {
        let session: CheckoutSessionObject = serde_json::from_value(json!({
            "id": "cs_1",
            "client_reference_id": "7"
        }))
        .unwrap();
        assert_eq!(session.workspace_id(), Some(7));
    }

    #[test]
    fn subscription_object_exposes_price_and_period() {
        let sub: SubscriptionObject = serde_json::from_value(json!({
            "id": "sub_1",
            "status": "active",
            "current_period_end": 1_767_225_600,
            "items": {"data": [{"price": {"id": "price_pro"}}]}
        }))
        .unwrap();
        assert_eq!(sub.price_id(), Some("price_pro"));
        assert_eq!(sub.period_end().unwrap().timestamp(), 1_767_225_600);
        assert_eq!(sub.workspace_id(), None);
    }
}
