use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::billing::Plan;

/// One lifecycle event written to the transaction log.
///
/// The `type` tag and field names match the JSON lines already on disk, so
/// readers that only understand raw JSON keep working.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuditEvent {
    #[serde(rename_all = "camelCase")]
    CheckoutSessionCreated { session_id: String, plan: Plan },
    #[serde(rename_all = "camelCase")]
    StripeEvent {
        event_id: String,
        event_type: String,
        data: Value,
    },
    #[serde(rename_all = "camelCase")]
    JobCreated {
        job_id: String,
        objective: String,
        priority: String,
    },
}

impl AuditEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            AuditEvent::CheckoutSessionCreated { .. } => "checkout_session_created",
            AuditEvent::StripeEvent { .. } => "stripe_event",
            AuditEvent::JobCreated { .. } => "job_created",
        }
    }
}

/// An event as persisted: the event fields plus the time it was written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRecord {
    #[serde(flatten)]
    pub event: AuditEvent,
    #[serde(rename = "loggedAt")]
    pub logged_at: String,
}

impl AuditRecord {
    pub fn now(event: AuditEvent) -> Self {
        Self {
            event,
            logged_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}
