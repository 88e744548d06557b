pub mod audit;
pub mod billing;
pub mod checkout;
pub mod jobs;
pub mod webhook;

use axum::routing::{get, post};
use axum::Router;

use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Billing
        .route("/api/checkout", post(checkout::create))
        .route("/api/webhook", post(webhook::receive))
        .route("/api/billing/config", get(billing::config))
        // Jobs
        .route("/api/jobs", post(jobs::create))
        // Audit
        .route("/api/audit", get(audit::list))
}
