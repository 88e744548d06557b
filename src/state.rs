use std::sync::Arc;

use crate::audit::AuditLog;
use crate::billing::BillingProvider;
use crate::config::Config;
use crate::idempotency::{CheckoutSessions, ProcessedEvents};

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: Config,
    pub audit: AuditLog,
    pub billing: Arc<dyn BillingProvider>,
    pub processed_events: ProcessedEvents,
    pub checkout_sessions: CheckoutSessions,
}
