use std::time::{Duration, Instant};

use dashmap::DashMap;

use crate::billing::{CheckoutSession, Plan};

/// How long idempotency records are remembered. Matches the window Stripe
/// itself keeps idempotency keys for.
pub const IDEMPOTENCY_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Webhook event ids that have already been written to the audit log.
pub struct ProcessedEvents {
    /// event_id -> first seen
    entries: DashMap<String, Instant>,
}

impl ProcessedEvents {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Claim an event id. Returns false if it was already claimed.
    pub fn claim(&self, event_id: &str) -> bool {
        let mut fresh = false;
        self.entries.entry(event_id.to_string()).or_insert_with(|| {
            fresh = true;
            Instant::now()
        });
        fresh
    }

    /// Release a claim so a redelivery of the event is processed again.
    pub fn release(&self, event_id: &str) {
        self.entries.remove(event_id);
    }

    pub fn cleanup(&self, max_age: Duration) {
        let now = Instant::now();
        self.entries.retain(|_, seen| now.duration_since(*seen) < max_age);
    }
}

impl Default for ProcessedEvents {
    fn default() -> Self {
        Self::new()
    }
}

/// Checkout sessions keyed by the client's `Idempotency-Key`.
pub struct CheckoutSessions {
    /// idempotency key -> (plan, session, created)
    entries: DashMap<String, (Plan, CheckoutSession, Instant)>,
}

impl CheckoutSessions {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// The plan and session first created under `key`.
    pub fn get(&self, key: &str) -> Option<(Plan, CheckoutSession)> {
        self.entries.get(key).map(|entry| {
            let (plan, session, _) = entry.value();
            (*plan, session.clone())
        })
    }

    pub fn insert(&self, key: String, plan: Plan, session: CheckoutSession) {
        self.entries.insert(key, (plan, session, Instant::now()));
    }

    pub fn cleanup(&self, max_age: Duration) {
        let now = Instant::now();
        self.entries
            .retain(|_, (_, _, created)| now.duration_since(*created) < max_age);
    }
}

impl Default for CheckoutSessions {
    fn default() -> Self {
        Self::new()
    }
}
