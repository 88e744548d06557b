pub mod signature;
pub mod stripe;

use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Subscription tiers offered on the pricing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Free,
    Pro,
    Enterprise,
}

impl Plan {
    pub const ALL: [Plan; 3] = [Plan::Free, Plan::Pro, Plan::Enterprise];

    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Free => "free",
            Plan::Pro => "pro",
            Plan::Enterprise => "enterprise",
        }
    }

    /// Suffix of the `STRIPE_PRICE_*` variable holding this plan's price id.
    pub fn env_suffix(&self) -> &'static str {
        match self {
            Plan::Free => "FREE",
            Plan::Pro => "PRO",
            Plan::Enterprise => "ENTERPRISE",
        }
    }
}

impl std::fmt::Display for Plan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Plan {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(Plan::Free),
            "pro" => Ok(Plan::Pro),
            "enterprise" => Ok(Plan::Enterprise),
            other => Err(format!("Unknown plan: {other}")),
        }
    }
}

/// Stripe price ids per plan. A plan without a price cannot be purchased.
#[derive(Debug, Clone, Default)]
pub struct PlanPrices {
    pub free: Option<String>,
    pub pro: Option<String>,
    pub enterprise: Option<String>,
}

impl PlanPrices {
    pub fn price_for(&self, plan: Plan) -> Option<&str> {
        match plan {
            Plan::Free => self.free.as_deref(),
            Plan::Pro => self.pro.as_deref(),
            Plan::Enterprise => self.enterprise.as_deref(),
        }
    }

    /// Resolve a caller-supplied plan identifier to its plan and price id.
    pub fn resolve(&self, identifier: &str) -> Option<(Plan, &str)> {
        let plan: Plan = identifier.parse().ok()?;
        self.price_for(plan).map(|price| (plan, price))
    }

    pub fn configured(&self) -> Vec<Plan> {
        Plan::ALL
            .into_iter()
            .filter(|plan| self.price_for(*plan).is_some())
            .collect()
    }
}

/// Everything needed to open a hosted subscription checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckoutRequest {
    pub plan: Plan,
    pub price_id: String,
    pub success_url: String,
    pub cancel_url: String,
    pub idempotency_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug)]
pub enum BillingError {
    NotConfigured(&'static str),
    Request(String),
    Api { status: u16, message: String },
    InvalidResponse(String),
}

impl std::fmt::Display for BillingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BillingError::NotConfigured(var) => write!(f, "{var} not configured"),
            BillingError::Request(msg) => write!(f, "{msg}"),
            BillingError::Api { message, .. } => write!(f, "{message}"),
            BillingError::InvalidResponse(msg) => write!(f, "Invalid response from Stripe: {msg}"),
        }
    }
}

impl std::error::Error for BillingError {}

#[async_trait]
pub trait BillingProvider: Send + Sync {
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, BillingError>;
}
