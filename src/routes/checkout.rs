use axum::extract::State;
use axum::http::{HeaderMap, header};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::billing::{CheckoutRequest, CheckoutSession};
use crate::error::AppError;
use crate::extract::JsonBody;
use crate::middleware::audit;
use crate::models::AuditEvent;
use crate::state::SharedState;

pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutRequest {
    /// Plan identifier (`free`, `pro`, `enterprise`), not a Stripe price id.
    pub price_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl From<CheckoutSession> for CheckoutResponse {
    fn from(session: CheckoutSession) -> Self {
        Self {
            session_id: session.id,
            url: session.url,
        }
    }
}

pub async fn create(
    State(state): State<SharedState>,
    headers: HeaderMap,
    JsonBody(req): JsonBody<CreateCheckoutRequest>,
) -> Result<Json<CheckoutResponse>, AppError> {
    let (plan, price_id) = req
        .price_id
        .as_deref()
        .and_then(|id| state.config.stripe.prices.resolve(id))
        .ok_or_else(|| AppError::BadRequest("Invalid price selection.".to_string()))?;

    let client_key = headers
        .get(IDEMPOTENCY_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string);

    if let Some((cached_plan, session)) = client_key
        .as_deref()
        .and_then(|key| state.checkout_sessions.get(key))
    {
        // Same key with different parameters is a client bug, never a replay.
        if cached_plan != plan {
            return Err(AppError::BadRequest(
                "Idempotency key reused with a different plan.".to_string(),
            ));
        }
        tracing::info!("Replaying checkout session {} for idempotency key", session.id);
        return Ok(Json(session.into()));
    }

    let origin = headers
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(state.config.base_url.as_str())
        .trim_end_matches('/');

    let request = CheckoutRequest {
        plan,
        price_id: price_id.to_string(),
        success_url: format!("{origin}/outpost?checkout=success"),
        cancel_url: format!("{origin}/outpost?checkout=cancel"),
        idempotency_key: client_key
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string()),
    };

    let session = state.billing.create_checkout_session(&request).await?;
    tracing::info!("Created checkout session {} for plan {plan}", session.id);

    if let Some(key) = client_key {
        state.checkout_sessions.insert(key, plan, session.clone());
    }

    // The session already exists at the provider; a failed write is logged, not rolled back.
    audit::record_best_effort(
        &state.audit,
        AuditEvent::CheckoutSessionCreated {
            session_id: session.id.clone(),
            plan,
        },
    )
    .await;

    Ok(Json(session.into()))
}
