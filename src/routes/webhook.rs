use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};

use crate::billing::signature::{self, SIGNATURE_HEADER};
use crate::error::AppError;
use crate::models::{AuditEvent, StripeEvent};
use crate::state::SharedState;

pub async fn receive(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let header = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());
    let stripe = &state.config.stripe;

    let (Some(header), Some(secret)) = (header, stripe.webhook_secret.as_deref()) else {
        return Err(AppError::BadRequest(
            "Missing Stripe webhook configuration.".to_string(),
        ));
    };

    signature::verify(
        &body,
        header,
        secret,
        stripe.webhook_tolerance_secs,
        Utc::now().timestamp(),
    )
    .map_err(|e| {
        tracing::warn!("Webhook signature verification failed: {e}");
        AppError::BadRequest(e.to_string())
    })?;

    let event: StripeEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid webhook payload: {e}")))?;

    if !state.processed_events.claim(&event.id) {
        tracing::info!("Skipping duplicate Stripe event {}", event.id);
        return Ok(Json(json!({ "received": true, "duplicate": true })));
    }

    let entry = AuditEvent::StripeEvent {
        event_id: event.id.clone(),
        event_type: event.event_type.clone(),
        data: event.data.object,
    };

    // Let Stripe redeliver if the event could not be recorded.
    if let Err(e) = state.audit.append(entry).await {
        state.processed_events.release(&event.id);
        return Err(e.into());
    }

    tracing::info!("Recorded Stripe event {} ({})", event.id, event.event_type);
    Ok(Json(json!({ "received": true })))
}
