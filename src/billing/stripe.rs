use async_trait::async_trait;
use serde_json::Value;

use super::{BillingError, BillingProvider, CheckoutRequest, CheckoutSession};
use crate::config::StripeConfig;

/// Minimal Stripe REST client covering checkout session creation.
pub struct StripeClient {
    client: reqwest::Client,
    api_base: String,
    secret_key: Option<String>,
}

impl StripeClient {
    pub fn new(config: &StripeConfig) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| format!("Failed to build Stripe HTTP client: {e}"))?;

        if config.secret_key.is_none() {
            tracing::warn!("STRIPE_SECRET_KEY not set; checkout requests will fail");
        }

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            secret_key: config.secret_key.clone(),
        })
    }
}

#[async_trait]
impl BillingProvider for StripeClient {
    async fn create_checkout_session(
        &self,
        request: &CheckoutRequest,
    ) -> Result<CheckoutSession, BillingError> {
        let secret_key = self
            .secret_key
            .as_deref()
            .ok_or(BillingError::NotConfigured("STRIPE_SECRET_KEY"))?;

        let form = [
            ("mode", "subscription"),
            ("line_items[0][price]", request.price_id.as_str()),
            ("line_items[0][quantity]", "1"),
            ("success_url", request.success_url.as_str()),
            ("cancel_url", request.cancel_url.as_str()),
            ("metadata[plan]", request.plan.as_str()),
        ];

        let resp = self
            .client
            .post(format!("{}/v1/checkout/sessions", self.api_base))
            .bearer_auth(secret_key)
            .header("Idempotency-Key", &request.idempotency_key)
            .form(&form)
            .send()
            .await
            .map_err(|e| BillingError::Request(format!("Stripe request failed: {e}")))?;

        let status = resp.status();
        let body: Value = resp
            .json()
            .await
            .map_err(|e| BillingError::InvalidResponse(e.to_string()))?;

        if !status.is_success() {
            let message = body["error"]["message"]
                .as_str()
                .unwrap_or("Stripe request failed")
                .to_string();
            return Err(BillingError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_value(body).map_err(|e| BillingError::InvalidResponse(e.to_string()))
    }
}
