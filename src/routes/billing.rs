use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::state::SharedState;

/// Public billing settings for the pricing page.
pub async fn config(State(state): State<SharedState>) -> Json<Value> {
    let stripe = &state.config.stripe;
    Json(json!({
        "publishableKey": stripe.publishable_key,
        "plans": stripe.prices.configured(),
    }))
}
