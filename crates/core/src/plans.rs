//! Subscription plans and their quotas.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Free,
    Pro,
    Agency,
}

/// Quotas attached to a plan. `None` means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlanLimits {
    pub max_projects: Option<i64>,
    pub max_keywords_per_project: Option<i64>,
    pub audits_per_month: Option<i64>,
}

impl Plan {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Pro => "pro",
            Self::Agency => "agency",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "free" => Some(Self::Free),
            "pro" => Some(Self::Pro),
            "agency" => Some(Self::Agency),
            _ => None,
        }
    }

    pub fn limits(self) -> PlanLimits {
        match self {
            Self::Free => PlanLimits {
                max_projects: Some(3),
                max_keywords_per_project: Some(50),
                audits_per_month: Some(20),
            },
            Self::Pro => PlanLimits {
                max_projects: Some(20),
                max_keywords_per_project: Some(500),
                audits_per_month: Some(500),
            },
            Self::Agency => PlanLimits {
                max_projects: None,
                max_keywords_per_project: None,
                audits_per_month: None,
            },
        }
    }

    /// Plans that can be bought through checkout.
    pub fn is_purchasable(self) -> bool {
        self != Self::Free
    }
}

/// Fail with [`CoreError::PlanLimit`] if adding `adding` items to `current`
/// would exceed `limit`.
pub fn ensure_within_limit(
    what: &str,
    limit: Option<i64>,
    current: i64,
    adding: i64,
) -> Result<(), CoreError> {
    match limit {
        Some(max) if current + adding > max => Err(CoreError::PlanLimit(format!(
            "Your plan allows {max} {what}; {current} already in use"
        ))),
        _ => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Subscription status
// ---------------------------------------------------------------------------

/// Subscription statuses as reported by the payment processor.
pub mod subscription_status {
    pub const ACTIVE: &str = "active";
    pub const TRIALING: &str = "trialing";
    pub const PAST_DUE: &str = "past_due";
    pub const CANCELED: &str = "canceled";
    pub const INCOMPLETE: &str = "incomplete";
}

/// Whether a subscription in this status should keep its paid plan.
pub fn status_grants_plan(status: &str) -> bool {
    matches!(
        status,
        subscription_status::ACTIVE | subscription_status::TRIALING | subscription_status::PAST_DUE
    )
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn plans_round_trip_through_names() {
        for plan in [Plan::Free, Plan::Pro, Plan::Agency] {
            assert_eq!(Plan::parse(plan.as_str()), Some(plan));
        }
        assert_eq!(Plan::parse("enterprise"), None);
    }

    #[test]
    fn higher_plans_have_higher_limits() {
        let free = Plan::Free.limits();
        let pro = Plan::Pro.limits();
        assert!(free.max_projects < pro.max_projects);
        assert_eq!(Plan::Agency.limits().max_projects, None);
    }

    #[test]
    fn limit_check_allows_up_to_the_maximum() {
        assert!(ensure_within_limit("projects", Some(3), 2, 1).is_ok());
        assert_matches!(
            ensure_within_limit("projects", Some(3), 3, 1),
            Err(CoreError::PlanLimit(msg)) if msg.contains("3 projects")
        );
    }

    #[test]
    fn unlimited_plans_never_fail() {
        assert!(ensure_within_limit("keywords", None, 1_000_000, 500).is_ok());
    }

    #[test]
    fn only_paid_plans_are_purchasable() {
        assert!(!Plan::Free.is_purchasable());
        assert!(Plan::Pro.is_purchasable());
    }

    #[test]
    fn canceled_subscriptions_lose_their_plan() {
        assert!(status_grants_plan("active"));
        assert!(status_grants_plan("past_due"));
        assert!(!status_grants_plan("canceled"));
        assert!(!status_grants_plan("incomplete"));
    }
}
