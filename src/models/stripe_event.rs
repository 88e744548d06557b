use serde::Deserialize;
use serde_json::Value;

/// The subset of a Stripe webhook event this service reads. Everything under
/// `data.object` is passed through untouched.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub data: StripeEventData,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StripeEventData {
    #[serde(default)]
    pub object: Value,
}
